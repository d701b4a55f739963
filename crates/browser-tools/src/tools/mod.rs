//! Built-in browser tools

mod click;
mod fill;
mod open_url;
mod page_structure;
mod screenshot;
mod wait_verify;

pub use click::FindAndClickTool;
pub use fill::FillInputTool;
pub use open_url::OpenUrlTool;
pub use page_structure::{PageStructureTool, StructureEntry};
pub use screenshot::ScreenshotTool;
pub use wait_verify::WaitAndVerifyTool;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::ToolError;

/// Deserialize tool parameters, naming the tool on failure
pub(crate) fn parse_params<T: DeserializeOwned>(tool: &str, params: Value) -> Result<T, ToolError> {
    serde_json::from_value(params).map_err(|err| ToolError::invalid(tool, err.to_string()))
}

/// Serialize a tool result
pub(crate) fn to_result<T: serde::Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|err| ToolError::ExecutionFailed(err.to_string()))
}
