//! Condition-polling waits bounded by a timeout

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

use crate::{
    errors::ActionError,
    session::PageSession,
    types::{DomNode, Selector},
};

/// Poll `probe` until it yields a value or `timeout` elapses.
///
/// The probe runs at least once, even with a zero timeout. `Ok(None)` and
/// retryable errors keep polling; a non-retryable error (such as a malformed
/// selector) ends the wait immediately. When the final probe before the
/// deadline failed, that error is returned instead of `WaitTimeout`.
pub async fn wait_until<T, F, Fut>(
    what: &str,
    timeout: Duration,
    poll_interval: Duration,
    mut probe: F,
) -> Result<T, ActionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, ActionError>>,
{
    let deadline = Instant::now() + timeout;
    let mut attempts: u32 = 0;
    let mut last_error: Option<ActionError> = None;

    loop {
        attempts += 1;
        match probe().await {
            Ok(Some(value)) => {
                trace!(what, attempts, "wait condition met");
                return Ok(value);
            }
            Ok(None) => last_error = None,
            Err(err) if err.is_retryable() => {
                trace!(what, error = %err, "transient error while waiting");
                last_error = Some(err);
            }
            Err(err) => return Err(err),
        }

        let now = Instant::now();
        if now >= deadline {
            debug!(what, attempts, timeout_ms = timeout.as_millis() as u64, "wait timed out");
            return Err(last_error.unwrap_or_else(|| {
                ActionError::WaitTimeout(format!(
                    "{} not satisfied within {}ms",
                    what,
                    timeout.as_millis()
                ))
            }));
        }
        sleep(poll_interval.min(deadline - now)).await;
    }
}

/// Wait until at least one node matches `selector`, returning the first
/// ordered match. With `require_visible`, only rendered nodes count.
pub async fn wait_for_node(
    page: &dyn PageSession,
    selector: &Selector,
    require_visible: bool,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<DomNode, ActionError> {
    let what = format!("selector '{}'", selector);
    wait_until(&what, timeout, poll_interval, move || async move {
        let nodes = page.query(selector).await?;
        Ok(nodes
            .into_iter()
            .find(|node| !require_visible || node.visible))
    })
    .await
}
