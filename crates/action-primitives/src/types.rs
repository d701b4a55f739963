//! Core data types for action primitives

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Opaque reference to a node in the live document.
///
/// Issued by a [`crate::PageSession`] and only meaningful to the session that
/// issued it. Valid for the lifetime of the current page load; any navigation
/// invalidates it. Intentionally not serializable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementHandle(String);

impl ElementHandle {
    /// Wrap a session-issued key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Session-issued key backing this handle
    pub fn key(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of a single node as seen by the matchers
#[derive(Clone, Debug)]
pub struct DomNode {
    /// Live handle for acting on this node
    pub handle: ElementHandle,

    /// Lower-case tag name
    pub tag: String,

    /// Full text content (descendants included)
    pub text_content: String,

    /// Attributes, including the live `value` of form controls
    pub attributes: BTreeMap<String, String>,

    /// Whether the node is rendered
    pub visible: bool,
}

impl DomNode {
    /// Look up an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Text content trimmed and case-folded
    pub fn normalized_text(&self) -> String {
        normalize_text(&self.text_content)
    }
}

/// Trim and case-fold text the way every text matcher compares it
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// A query against the document: CSS selector or XPath expression
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Selector {
    Css(String),
    XPath(String),
}

impl Selector {
    /// Classify a raw candidate string.
    ///
    /// Strings starting with `/`, `./`, `..` or `(` are XPath; anything else is CSS.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with('/')
            || trimmed.starts_with("./")
            || trimmed.starts_with("..")
            || trimmed.starts_with('(')
        {
            Selector::XPath(trimmed.to_string())
        } else {
            Selector::Css(trimmed.to_string())
        }
    }

    /// Raw selector or expression text
    pub fn as_str(&self) -> &str {
        match self {
            Selector::Css(s) | Selector::XPath(s) => s,
        }
    }

    pub fn is_xpath(&self) -> bool {
        matches!(self, Selector::XPath(_))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settle, pacing and polling durations used by the executor and waits.
///
/// Settle delays are unconditional sleeps reserved for render/animation
/// settling; readiness checks always go through the polling waits instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tempo {
    /// Delay after scrolling a node into view, before acting on it
    pub scroll_settle_ms: u64,

    /// Delay after a click before returning control
    pub post_click_settle_ms: u64,

    /// Delay between clearing a field and typing into it
    pub clear_settle_ms: u64,

    /// Pause between typed characters
    pub per_char_delay_ms: u64,

    /// Delay after navigation completes
    pub navigate_settle_ms: u64,

    /// Interval between condition probes
    pub poll_interval_ms: u64,
}

impl Default for Tempo {
    fn default() -> Self {
        Self {
            scroll_settle_ms: 500,
            post_click_settle_ms: 1000,
            clear_settle_ms: 200,
            per_char_delay_ms: 100,
            navigate_settle_ms: 3000,
            poll_interval_ms: 100,
        }
    }
}

impl Tempo {
    /// Tempo with every settle and pacing delay disabled
    pub fn instant() -> Self {
        Self {
            scroll_settle_ms: 0,
            post_click_settle_ms: 0,
            clear_settle_ms: 0,
            per_char_delay_ms: 0,
            navigate_settle_ms: 0,
            poll_interval_ms: 10,
        }
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn post_click_settle(&self) -> Duration {
        Duration::from_millis(self.post_click_settle_ms)
    }

    pub fn clear_settle(&self) -> Duration {
        Duration::from_millis(self.clear_settle_ms)
    }

    pub fn per_char_delay(&self) -> Duration {
        Duration::from_millis(self.per_char_delay_ms)
    }

    pub fn navigate_settle(&self) -> Duration {
        Duration::from_millis(self.navigate_settle_ms)
    }

    /// Poll interval, never zero
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_classification() {
        assert_eq!(
            Selector::parse("//*[@title='x']"),
            Selector::XPath("//*[@title='x']".into())
        );
        assert_eq!(
            Selector::parse("(//button)[2]"),
            Selector::XPath("(//button)[2]".into())
        );
        assert_eq!(Selector::parse("  #email "), Selector::Css("#email".into()));
        assert_eq!(
            Selector::parse("input[name=q]"),
            Selector::Css("input[name=q]".into())
        );
    }

    #[test]
    fn normalize_trims_and_folds_case() {
        assert_eq!(normalize_text("  Sign IN \n"), "sign in");
    }

    #[test]
    fn tempo_defaults() {
        let tempo = Tempo::default();
        assert_eq!(tempo.scroll_settle(), Duration::from_millis(500));
        assert_eq!(tempo.post_click_settle(), Duration::from_millis(1000));
        assert_eq!(tempo.per_char_delay(), Duration::from_millis(100));
    }

    #[test]
    fn tempo_partial_yaml_keeps_defaults() {
        let tempo: Tempo = serde_json::from_str(r#"{"per_char_delay_ms": 5}"#).unwrap();
        assert_eq!(tempo.per_char_delay_ms, 5);
        assert_eq!(tempo.scroll_settle_ms, 500);
    }

    #[test]
    fn zero_poll_interval_is_clamped() {
        let tempo = Tempo {
            poll_interval_ms: 0,
            ..Tempo::default()
        };
        assert_eq!(tempo.poll_interval(), Duration::from_millis(1));
    }
}
