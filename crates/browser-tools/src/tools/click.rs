use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::{parse_params, to_result};
use crate::{context::ToolContext, definition::ToolDefinition, errors::ToolError, toolbox::Tool};

const NAME: &str = "find_and_click_element";

#[derive(Debug, Deserialize)]
struct Params {
    #[serde(alias = "targetText")]
    target_text: String,

    #[serde(default, alias = "elementTypes")]
    element_types: Option<Vec<String>>,

    /// Per-strategy wait in milliseconds
    #[serde(default, alias = "waitTime")]
    wait_time: Option<u64>,
}

/// Locate an element by its visible text and click it
pub struct FindAndClickTool {
    definition: ToolDefinition,
}

impl FindAndClickTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::new(
                NAME,
                "Find an element by its text using several strategies and click it",
                json!({
                    "type": "object",
                    "properties": {
                        "target_text": {
                            "type": "string",
                            "description": "Visible text, value or label of the element"
                        },
                        "element_types": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "Tag names to scan first"
                        },
                        "wait_time": {
                            "type": "integer",
                            "description": "Milliseconds each selector strategy may wait"
                        }
                    },
                    "required": ["target_text"]
                }),
            ),
        }
    }
}

impl Default for FindAndClickTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FindAndClickTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, ctx: &ToolContext, params: Value) -> Result<Value, ToolError> {
        let params: Params = parse_params(NAME, params)?;

        let mut descriptor = ctx.resolver().config().descriptor(params.target_text);
        if let Some(types) = params.element_types {
            descriptor = descriptor.with_element_types(types);
        }
        if let Some(ms) = params.wait_time {
            descriptor = descriptor.with_timeout(Duration::from_millis(ms));
        }

        let outcome = ctx.resolver().resolve_and_click(&descriptor).await?;
        to_result(&outcome)
    }
}
