//! Element resolver with fallback chain orchestration

use action_primitives::ActionExecutor;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{
    errors::LocatorError,
    strategies::{default_chain, LocateContext, Strategy},
    types::{ActionOutcome, ElementDescriptor, LocatorConfig, MatchResult},
};

/// Resolves descriptors against one page and acts on the match
#[derive(Clone)]
pub struct ElementResolver {
    executor: ActionExecutor,
    chain: Vec<Arc<dyn Strategy>>,
    config: LocatorConfig,
}

impl ElementResolver {
    /// Create a resolver running the default chain
    pub fn new(executor: ActionExecutor, config: LocatorConfig) -> Self {
        Self {
            executor,
            chain: default_chain(),
            config,
        }
    }

    /// Replace the strategy chain
    pub fn with_chain(mut self, chain: Vec<Arc<dyn Strategy>>) -> Self {
        self.chain = chain;
        self
    }

    pub fn executor(&self) -> &ActionExecutor {
        &self.executor
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Run the chain and return the first match without acting on it
    pub async fn locate(
        &self,
        descriptor: &ElementDescriptor,
    ) -> Result<Option<MatchResult>, LocatorError> {
        Ok(self.run_chain(descriptor).await?.found)
    }

    async fn run_chain(&self, descriptor: &ElementDescriptor) -> Result<ChainScan, LocatorError> {
        if descriptor.target_text.trim().is_empty() {
            return Err(LocatorError::InvalidDescriptor(
                "target text is empty".to_string(),
            ));
        }

        let ctx = LocateContext {
            page: self.executor.session().as_ref(),
            descriptor,
            poll_interval: self.executor.tempo().poll_interval(),
        };

        let mut last_error = None;
        for strategy in &self.chain {
            let label = strategy.label();
            debug!(target_text = %descriptor.target_text, strategy = %label, "Trying strategy");

            match strategy.locate(&ctx).await {
                Ok(Some(found)) => {
                    info!(
                        target_text = %descriptor.target_text,
                        strategy = %label,
                        selector = %found.selector,
                        "Element located"
                    );
                    return Ok(ChainScan {
                        found: Some(found),
                        last_error,
                    });
                }
                Ok(None) => {
                    debug!(strategy = %label, "Strategy returned no match");
                }
                Err(err) => {
                    warn!(strategy = %label, error = %err, "Strategy failed, treating as no match");
                    last_error = Some(format!("{}: {}", label, err));
                }
            }
        }

        Ok(ChainScan {
            found: None,
            last_error,
        })
    }

    /// Locate the target, then scroll, settle, click and settle.
    ///
    /// A click failure after a successful match is not retried with a later
    /// strategy.
    pub async fn resolve_and_click(
        &self,
        descriptor: &ElementDescriptor,
    ) -> Result<ActionOutcome, LocatorError> {
        info!(
            target_text = %descriptor.target_text,
            types = ?descriptor.element_types,
            timeout_ms = descriptor.timeout.as_millis() as u64,
            "Resolving element to click"
        );

        bounded(self.config.call_timeout(), "resolve_and_click", async {
            let scan = self.run_chain(descriptor).await?;
            let found = scan.found.ok_or_else(|| LocatorError::ElementNotFound {
                target: descriptor.target_text.clone(),
                last_error: scan.last_error,
            })?;

            self.executor
                .scroll_and_click(&found.handle)
                .await
                .map_err(|source| LocatorError::ActionExecutionFailed {
                    target: descriptor.target_text.clone(),
                    source,
                })?;

            Ok(ActionOutcome::from(&found))
        })
        .await
    }
}

/// Result of one pass over the chain
struct ChainScan {
    found: Option<MatchResult>,
    /// Most recent strategy failure, kept for the not-found diagnostic
    last_error: Option<String>,
}

/// Apply an optional caller-level budget to a whole call
pub(crate) async fn bounded<T, F>(
    limit: Option<Duration>,
    what: &str,
    call: F,
) -> Result<T, LocatorError>
where
    F: Future<Output = Result<T, LocatorError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
            LocatorError::Timeout(format!("{} exceeded {}ms", what, limit.as_millis()))
        })?,
        None => call.await,
    }
}
