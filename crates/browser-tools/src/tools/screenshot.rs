use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{parse_params, to_result};
use crate::{context::ToolContext, definition::ToolDefinition, errors::ToolError, toolbox::Tool};

const NAME: &str = "take_screenshot";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Params {
    /// What the caller wants to look at; recorded, not analysed
    #[serde(alias = "targetElement")]
    target_element: Option<String>,

    /// Also return the PNG inline as base64
    inline: bool,
}

#[derive(Debug, Serialize)]
struct Shot {
    file_path: String,
    bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_base64: Option<String>,
}

/// Capture the viewport to `screenshot-<unix millis>.png`
pub struct ScreenshotTool {
    definition: ToolDefinition,
}

impl ScreenshotTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::new(
                NAME,
                "Take a screenshot of the current page and save it as PNG",
                json!({
                    "type": "object",
                    "properties": {
                        "target_element": {
                            "type": "string",
                            "description": "Element the caller is looking for"
                        },
                        "inline": {
                            "type": "boolean",
                            "description": "Include the image as base64 in the result"
                        }
                    }
                }),
            ),
        }
    }
}

impl Default for ScreenshotTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ScreenshotTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, ctx: &ToolContext, params: Value) -> Result<Value, ToolError> {
        let params: Params = parse_params(NAME, params)?;

        let png = ctx.session().screenshot().await?;
        let dir = ctx.screenshots_dir();
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!(
            "screenshot-{}.png",
            chrono::Utc::now().timestamp_millis()
        ));
        tokio::fs::write(&path, &png).await?;

        info!(path = %path.display(), bytes = png.len(), "Screenshot saved");

        to_result(&Shot {
            file_path: path.display().to_string(),
            bytes: png.len(),
            target_element: params.target_element,
            image_base64: params.inline.then(|| STANDARD.encode(&png)),
        })
    }
}
