use action_primitives::{wait_until, ActionError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

use super::parse_params;
use crate::{context::ToolContext, definition::ToolDefinition, errors::ToolError, toolbox::Tool};

const NAME: &str = "wait_and_verify";

pub const DEFAULT_WAIT_MS: u64 = 3000;

#[derive(Debug, Deserialize)]
struct Params {
    #[serde(default, alias = "expectedUrl")]
    expected_url: Option<String>,

    #[serde(default = "default_wait", alias = "waitTime")]
    wait_time: u64,
}

fn default_wait() -> u64 {
    DEFAULT_WAIT_MS
}

/// Wait for the page to move on, optionally checking the URL it lands on.
///
/// A URL mismatch is reported, not raised.
pub struct WaitAndVerifyTool {
    definition: ToolDefinition,
}

impl WaitAndVerifyTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::new(
                NAME,
                "Wait for the page to change and optionally verify the URL",
                json!({
                    "type": "object",
                    "properties": {
                        "expected_url": {
                            "type": "string",
                            "description": "Fragment the current URL should contain"
                        },
                        "wait_time": {
                            "type": "integer",
                            "description": "Milliseconds to wait (default 3000)"
                        }
                    }
                }),
            ),
        }
    }
}

impl Default for WaitAndVerifyTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WaitAndVerifyTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, ctx: &ToolContext, params: Value) -> Result<Value, ToolError> {
        let params: Params = parse_params(NAME, params)?;
        let wait = Duration::from_millis(params.wait_time);
        let session = ctx.session().as_ref();

        let Some(expected) = params.expected_url.filter(|u| !u.trim().is_empty()) else {
            ctx.resolver().executor().settle(wait).await;
            let current_url = session.current_url().await?;
            return Ok(json!({ "current_url": current_url, "success": true, "matched": null }));
        };

        let poll = ctx.tempo().poll_interval();
        let landed = wait_until("url match", wait, poll, || {
            let expected = expected.as_str();
            async move {
                let url = session.current_url().await?;
                Ok(url.contains(expected).then_some(url))
            }
        })
        .await;

        let (current_url, matched) = match landed {
            Ok(url) => {
                info!(url = %url, expected = %expected, "URL verified");
                (url, true)
            }
            Err(ActionError::WaitTimeout(_)) => {
                let url = session.current_url().await?;
                warn!(url = %url, expected = %expected, "URL does not match expected");
                (url, false)
            }
            Err(err) => return Err(err.into()),
        };

        Ok(json!({ "current_url": current_url, "success": true, "matched": matched }))
    }
}
