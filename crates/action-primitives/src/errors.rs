//! Error types for action primitives

use thiserror::Error;

/// Failures surfaced by a page session or the action executor
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Selector or XPath expression rejected by the document
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// No node matched where one was required
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Handle no longer refers to a live node (navigation or detach)
    #[error("Stale element handle: {0}")]
    StaleHandle(String),

    /// Node exists but cannot be scrolled, clicked or typed into
    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    /// Bounded wait expired
    #[error("Wait timeout: {0}")]
    WaitTimeout(String),

    /// Navigation failed or never completed
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// CDP communication or protocol error
    #[error("CDP I/O error: {0}")]
    CdpIo(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ActionError {
    /// Check if polling again may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ActionError::NodeNotFound(_)
                | ActionError::StaleHandle(_)
                | ActionError::NotInteractable(_)
                | ActionError::WaitTimeout(_)
                | ActionError::CdpIo(_)
        )
    }

    /// Get error severity level (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            ActionError::Internal(_) => 3,
            ActionError::Navigation(_) | ActionError::CdpIo(_) => 2,
            ActionError::WaitTimeout(_)
            | ActionError::NodeNotFound(_)
            | ActionError::StaleHandle(_)
            | ActionError::NotInteractable(_) => 1,
            ActionError::InvalidSelector(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_selector_is_not_retryable() {
        assert!(!ActionError::InvalidSelector("//[".into()).is_retryable());
        assert!(ActionError::WaitTimeout("x".into()).is_retryable());
        assert!(ActionError::StaleHandle("x".into()).is_retryable());
    }

    #[test]
    fn severity_ordering() {
        assert_eq!(ActionError::Internal("x".into()).severity(), 3);
        assert_eq!(ActionError::CdpIo("x".into()).severity(), 2);
        assert_eq!(ActionError::NodeNotFound("x".into()).severity(), 1);
    }
}
