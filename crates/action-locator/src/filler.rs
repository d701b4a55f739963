//! Field filling over ordered selector candidates

use action_primitives::{wait_for_node, ActionError, Selector};
use tracing::{debug, info, warn};

use crate::{
    errors::LocatorError,
    resolver::{bounded, ElementResolver},
    types::{ActionOutcome, StrategyKind},
};

impl ElementResolver {
    /// Fill the first candidate that becomes visible and accepts the value.
    ///
    /// Each candidate gets its own presence and visibility wait. A timeout or
    /// typing failure moves on to the next candidate; text already typed into
    /// a failed candidate is left as is.
    pub async fn fill_field(
        &self,
        candidates: &[String],
        value: &str,
    ) -> Result<ActionOutcome, LocatorError> {
        if candidates.is_empty() {
            return Err(LocatorError::InputFillFailed {
                last_error: "no selector candidates given".to_string(),
            });
        }

        info!(
            candidates = candidates.len(),
            value_length = value.chars().count(),
            "Filling field"
        );

        bounded(self.config().call_timeout(), "fill_field", async {
            let mut last_error = String::new();
            for candidate in candidates {
                match self.fill_candidate(candidate, value).await {
                    Ok(()) => {
                        info!(selector = %candidate, "Field filled");
                        return Ok(ActionOutcome::succeeded(
                            StrategyKind::Selector,
                            candidate.clone(),
                        ));
                    }
                    Err(err) => {
                        warn!(selector = %candidate, error = %err, "Candidate failed, trying next");
                        last_error = format!("{}: {}", candidate, err);
                    }
                }
            }
            Err(LocatorError::InputFillFailed { last_error })
        })
        .await
    }

    async fn fill_candidate(
        &self,
        candidate: &str,
        value: &str,
    ) -> Result<(), ActionError> {
        if candidate.trim().is_empty() {
            return Err(ActionError::InvalidSelector(
                "empty selector candidate".to_string(),
            ));
        }

        let selector = Selector::parse(candidate);
        debug!(selector = %selector, "Waiting for candidate");
        let node = wait_for_node(
            self.executor().session().as_ref(),
            &selector,
            true,
            self.config().fill_timeout(),
            self.executor().tempo().poll_interval(),
        )
        .await?;

        self.executor().clear_and_type(&node.handle, value).await
    }
}
