use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_params, to_result};
use crate::{context::ToolContext, definition::ToolDefinition, errors::ToolError, toolbox::Tool};

const NAME: &str = "fill_input";

#[derive(Debug, Deserialize)]
struct Params {
    selectors: Vec<String>,
    value: String,
}

/// Type a value into the first selector candidate that resolves
pub struct FillInputTool {
    definition: ToolDefinition,
}

impl FillInputTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::new(
                NAME,
                "Fill an input field, trying each selector until one works",
                json!({
                    "type": "object",
                    "properties": {
                        "selectors": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "CSS selectors or XPath expressions, in priority order"
                        },
                        "value": { "type": "string", "description": "Text to type" }
                    },
                    "required": ["selectors", "value"]
                }),
            ),
        }
    }
}

impl Default for FillInputTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FillInputTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, ctx: &ToolContext, params: Value) -> Result<Value, ToolError> {
        let params: Params = parse_params(NAME, params)?;
        let outcome = ctx
            .resolver()
            .fill_field(&params.selectors, &params.value)
            .await?;
        to_result(&outcome)
    }
}
