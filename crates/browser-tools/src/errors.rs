use action_locator::LocatorError;
use action_primitives::ActionError;
use thiserror::Error;

/// Tool-level failures
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid parameters for {tool}: {reason}")]
    InvalidParams { tool: String, reason: String },

    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Unknown tool: {0}")]
    NotFound(String),

    #[error(transparent)]
    Locator(#[from] LocatorError),

    #[error(transparent)]
    Page(#[from] ActionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    pub fn invalid(tool: &str, reason: impl Into<String>) -> Self {
        ToolError::InvalidParams {
            tool: tool.to_string(),
            reason: reason.into(),
        }
    }

    /// Stable snake-case classification for reports
    pub fn kind(&self) -> String {
        match self {
            ToolError::InvalidParams { .. } => "invalid_params".to_string(),
            ToolError::ExecutionFailed(_) => "execution_failed".to_string(),
            ToolError::NotFound(_) => "not_found".to_string(),
            ToolError::Locator(err) => serde_json::to_value(err.kind())
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| "locator".to_string()),
            ToolError::Page(_) => "page".to_string(),
            ToolError::Io(_) => "io".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_kind_passes_through() {
        let err: ToolError = LocatorError::ElementNotFound {
            target: "Next".into(),
            last_error: None,
        }
        .into();
        assert_eq!(err.kind(), "element_not_found");
        assert!(err.to_string().contains("Next"));
    }

    #[test]
    fn invalid_params_names_tool() {
        let err = ToolError::invalid("fill_input", "missing field `value`");
        assert_eq!(err.kind(), "invalid_params");
        assert_eq!(
            err.to_string(),
            "Invalid parameters for fill_input: missing field `value`"
        );
    }
}
