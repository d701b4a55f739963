//! Error types for locator system

use action_primitives::ActionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Locator error enumeration
#[derive(Debug, Error, Clone)]
pub enum LocatorError {
    /// Every strategy ran without a match; carries the last strategy failure
    #[error("Element not found: no strategy matched '{target}'{}", last_error_suffix(.last_error))]
    ElementNotFound {
        target: String,
        last_error: Option<String>,
    },

    /// Every selector candidate failed; carries the last diagnostic
    #[error("Input fill failed: {last_error}")]
    InputFillFailed { last_error: String },

    /// A resolved node could not be scrolled, clicked or typed into
    #[error("Action failed on '{target}': {source}")]
    ActionExecutionFailed {
        target: String,
        #[source]
        source: ActionError,
    },

    /// Caller-level time budget exceeded
    #[error("Resolution timeout: {0}")]
    Timeout(String),

    /// Descriptor rejected before the page was contacted
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    match last_error {
        Some(err) => format!(" (last error: {})", err),
        None => String::new(),
    }
}

/// Serializable classification of a [`LocatorError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ElementNotFound,
    InputFillFailed,
    ActionExecutionFailed,
    Timeout,
    InvalidDescriptor,
}

impl LocatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LocatorError::ElementNotFound { .. } => ErrorKind::ElementNotFound,
            LocatorError::InputFillFailed { .. } => ErrorKind::InputFillFailed,
            LocatorError::ActionExecutionFailed { .. } => ErrorKind::ActionExecutionFailed,
            LocatorError::Timeout(_) => ErrorKind::Timeout,
            LocatorError::InvalidDescriptor(_) => ErrorKind::InvalidDescriptor,
        }
    }

    /// Get error severity (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            LocatorError::ActionExecutionFailed { source, .. } => source.severity().max(2),
            LocatorError::Timeout(_) => 2,
            LocatorError::ElementNotFound { .. } | LocatorError::InputFillFailed { .. } => 1,
            LocatorError::InvalidDescriptor(_) => 0,
        }
    }
}
