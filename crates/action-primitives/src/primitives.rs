//! Action executor
//!
//! Thin, stateless wrappers over a [`PageSession`] applied to an already
//! resolved handle:
//! 1. scroll_into_view - center the node in the viewport
//! 2. settle - unconditional render/animation delay
//! 3. click - single click, never retried here
//! 4. clear_and_type - focus, clear, settle, paced typing
//!
//! Retrying a different resolution is the locator's job; the executor acts
//! once on whatever it was given.

mod click;
mod scroll;
mod type_text;

use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

use crate::{session::PageSession, types::Tempo};

/// Executes actions against resolved handles on one page session
#[derive(Clone)]
pub struct ActionExecutor {
    /// Page the actions are sent to
    session: Arc<dyn PageSession>,

    /// Settle and pacing delays
    tempo: Tempo,
}

impl ActionExecutor {
    pub fn new(session: Arc<dyn PageSession>, tempo: Tempo) -> Self {
        Self { session, tempo }
    }

    pub fn session(&self) -> &Arc<dyn PageSession> {
        &self.session
    }

    pub fn tempo(&self) -> &Tempo {
        &self.tempo
    }

    /// Unconditional delay; not a poll
    pub async fn settle(&self, delay: Duration) {
        if delay.is_zero() {
            return;
        }
        trace!(delay_ms = delay.as_millis() as u64, "settling");
        tokio::time::sleep(delay).await;
    }
}
