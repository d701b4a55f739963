use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use url::Url;

use super::parse_params;
use crate::{context::ToolContext, definition::ToolDefinition, errors::ToolError, toolbox::Tool};

const NAME: &str = "open_url";

#[derive(Debug, Deserialize)]
struct Params {
    url: String,
}

/// Navigate to a URL, then wait for the page to settle
pub struct OpenUrlTool {
    definition: ToolDefinition,
}

impl OpenUrlTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::new(
                NAME,
                "Open a URL in the browser and wait for it to load",
                json!({
                    "type": "object",
                    "properties": {
                        "url": { "type": "string", "description": "Absolute URL to open" }
                    },
                    "required": ["url"]
                }),
            ),
        }
    }
}

impl Default for OpenUrlTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for OpenUrlTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, ctx: &ToolContext, params: Value) -> Result<Value, ToolError> {
        let params: Params = parse_params(NAME, params)?;
        let url = Url::parse(params.url.trim())
            .map_err(|err| ToolError::invalid(NAME, format!("invalid url '{}': {}", params.url, err)))?;

        info!(url = %url, "Opening page");
        ctx.session().navigate(url.as_str()).await?;
        ctx.resolver()
            .executor()
            .settle(ctx.tempo().navigate_settle())
            .await;

        Ok(json!({ "success": true, "url": url.as_str() }))
    }
}
