use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::{
    errors::ActionError,
    types::{normalize_text, DomNode, ElementHandle, Selector},
};

/// The live page an automation session drives.
///
/// One session is one browser tab. Calls are issued strictly one at a time by
/// the caller; implementations do not need to guard against interleaving.
/// Every handle returned by `query` is invalidated by the next `navigate`.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate and suspend until the load-complete signal
    async fn navigate(&self, url: &str) -> Result<(), ActionError>;

    /// URL of the current document
    async fn current_url(&self) -> Result<String, ActionError>;

    /// All nodes matching the selector, in document order.
    ///
    /// A malformed selector or expression fails with
    /// [`ActionError::InvalidSelector`]; no match is an empty list.
    async fn query(&self, selector: &Selector) -> Result<Vec<DomNode>, ActionError>;

    /// All nodes with the given tag name, in document order
    async fn query_tag(&self, tag: &str) -> Result<Vec<DomNode>, ActionError> {
        self.query(&Selector::Css(tag.to_string())).await
    }

    /// All nodes whose normalized text contains the normalized `needle`, in
    /// document order, with text trimmed and cut to `text_limit` characters
    async fn query_text(&self, needle: &str, text_limit: usize) -> Result<Vec<DomNode>, ActionError> {
        let needle = normalize_text(needle);
        let nodes = self.query(&Selector::Css("*".to_string())).await?;
        Ok(nodes
            .into_iter()
            .filter(|node| node.normalized_text().contains(&needle))
            .map(|mut node| {
                node.text_content = node.text_content.trim().chars().take(text_limit).collect();
                node
            })
            .collect())
    }

    /// Run a read-only inspection script in the document context
    async fn evaluate(&self, script: &str) -> Result<Value, ActionError>;

    /// Scroll the node to the viewport center (smooth)
    async fn scroll_into_view(&self, handle: &ElementHandle) -> Result<(), ActionError>;

    async fn click(&self, handle: &ElementHandle) -> Result<(), ActionError>;

    async fn focus(&self, handle: &ElementHandle) -> Result<(), ActionError>;

    /// Select-all then delete inside the (focused) node
    async fn clear(&self, handle: &ElementHandle) -> Result<(), ActionError>;

    /// Type text one character at a time, pausing `per_char_delay` between keys
    async fn type_text(
        &self,
        handle: &ElementHandle,
        text: &str,
        per_char_delay: Duration,
    ) -> Result<(), ActionError>;

    /// PNG bytes of the current viewport
    async fn screenshot(&self) -> Result<Vec<u8>, ActionError>;
}
