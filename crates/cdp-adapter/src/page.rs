use action_primitives::{
    normalize_text, ActionError, DomNode, ElementHandle, PageSession, Selector,
};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, trace};

use crate::scripts;

fn cdp_io(err: CdpError) -> ActionError {
    ActionError::CdpIo(err.to_string())
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    nodes: Vec<RawNode>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    key: String,
    tag: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(default)]
    visible: bool,
}

impl From<RawNode> for DomNode {
    fn from(raw: RawNode) -> Self {
        DomNode {
            handle: ElementHandle::new(raw.key),
            tag: raw.tag,
            text_content: raw.text,
            attributes: raw.attributes,
            visible: raw.visible,
        }
    }
}

/// One browser tab driven over CDP
#[derive(Clone)]
pub struct ChromiumPage {
    page: Page,
    navigation_timeout: Duration,
}

impl ChromiumPage {
    pub fn new(page: Page, navigation_timeout: Duration) -> Self {
        Self {
            page,
            navigation_timeout,
        }
    }

    pub fn inner(&self) -> &Page {
        &self.page
    }

    async fn eval_value(&self, script: String) -> Result<Value, ActionError> {
        let result = self.page.evaluate(script).await.map_err(cdp_io)?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    /// Re-find the tagged node; a missing tag means the handle outlived its document
    async fn element(&self, handle: &ElementHandle) -> Result<Element, ActionError> {
        self.page
            .find_element(scripts::node_selector(handle.key()))
            .await
            .map_err(|err| {
                ActionError::StaleHandle(format!("{} is no longer in the document: {}", handle, err))
            })
    }
}

#[async_trait]
impl PageSession for ChromiumPage {
    async fn navigate(&self, url: &str) -> Result<(), ActionError> {
        debug!(url, "Navigating");
        match tokio::time::timeout(self.navigation_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(err)) => Err(ActionError::Navigation(format!("{}: {}", url, err))),
            Err(_) => Err(ActionError::Navigation(format!(
                "{}: no load event within {}ms",
                url,
                self.navigation_timeout.as_millis()
            ))),
        }
    }

    async fn current_url(&self) -> Result<String, ActionError> {
        Ok(self.page.url().await.map_err(cdp_io)?.unwrap_or_default())
    }

    async fn query(&self, selector: &Selector) -> Result<Vec<DomNode>, ActionError> {
        let kind = if selector.is_xpath() { "xpath" } else { "css" };
        let value = self
            .eval_value(scripts::query(kind, selector.as_str()))
            .await?;
        let response: QueryResponse = serde_json::from_value(value)
            .map_err(|err| ActionError::Internal(format!("unexpected query result: {}", err)))?;
        if let Some(reason) = response.error {
            return Err(ActionError::InvalidSelector(format!("'{}': {}", selector, reason)));
        }
        trace!(selector = %selector, count = response.nodes.len(), "Query completed");
        Ok(response.nodes.into_iter().map(DomNode::from).collect())
    }

    async fn query_text(&self, needle: &str, text_limit: usize) -> Result<Vec<DomNode>, ActionError> {
        let value = self
            .eval_value(scripts::query_text(&normalize_text(needle), text_limit))
            .await?;
        let response: QueryResponse = serde_json::from_value(value)
            .map_err(|err| ActionError::Internal(format!("unexpected query result: {}", err)))?;
        trace!(needle, count = response.nodes.len(), "Text query completed");
        Ok(response.nodes.into_iter().map(DomNode::from).collect())
    }

    async fn evaluate(&self, script: &str) -> Result<Value, ActionError> {
        self.eval_value(script.to_string()).await
    }

    async fn scroll_into_view(&self, handle: &ElementHandle) -> Result<(), ActionError> {
        match self.eval_value(scripts::scroll_into_view(handle.key())).await? {
            Value::Bool(true) => Ok(()),
            _ => Err(ActionError::StaleHandle(handle.to_string())),
        }
    }

    async fn click(&self, handle: &ElementHandle) -> Result<(), ActionError> {
        let element = self.element(handle).await?;
        element
            .click()
            .await
            .map_err(|err| ActionError::NotInteractable(format!("{}: {}", handle, err)))?;
        Ok(())
    }

    async fn focus(&self, handle: &ElementHandle) -> Result<(), ActionError> {
        let element = self.element(handle).await?;
        element
            .focus()
            .await
            .map_err(|err| ActionError::NotInteractable(format!("{}: {}", handle, err)))?;
        Ok(())
    }

    async fn clear(&self, handle: &ElementHandle) -> Result<(), ActionError> {
        if self.eval_value(scripts::select_contents(handle.key())).await? != Value::Bool(true) {
            return Err(ActionError::StaleHandle(handle.to_string()));
        }
        let element = self.element(handle).await?;
        element.press_key("Delete").await.map_err(cdp_io)?;
        Ok(())
    }

    async fn type_text(
        &self,
        handle: &ElementHandle,
        text: &str,
        per_char_delay: Duration,
    ) -> Result<(), ActionError> {
        let element = self.element(handle).await?;
        for ch in text.chars() {
            element
                .type_str(ch.to_string())
                .await
                .map_err(|err| ActionError::NotInteractable(format!("{}: {}", handle, err)))?;
            if !per_char_delay.is_zero() {
                tokio::time::sleep(per_char_delay).await;
            }
        }
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, ActionError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        self.page.screenshot(params).await.map_err(cdp_io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_response_maps_to_dom_nodes() {
        let response: QueryResponse = serde_json::from_value(json!({
            "nodes": [{
                "key": "k1-1",
                "tag": "input",
                "text": "",
                "attributes": {"type": "submit", "value": "Go"},
                "visible": true
            }]
        }))
        .unwrap();
        let nodes: Vec<DomNode> = response.nodes.into_iter().map(DomNode::from).collect();
        assert_eq!(nodes[0].handle.key(), "k1-1");
        assert_eq!(nodes[0].attribute("value"), Some("Go"));
        assert!(nodes[0].visible);
    }

    #[test]
    fn query_error_is_reported() {
        let response: QueryResponse =
            serde_json::from_value(json!({"error": "not a valid selector"})).unwrap();
        assert!(response.nodes.is_empty());
        assert_eq!(response.error.as_deref(), Some("not a valid selector"));
    }
}
