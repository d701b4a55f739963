//! Core types for locator system

use action_primitives::ElementHandle;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tag names searched when the caller gives no hints
pub const DEFAULT_ELEMENT_TYPES: [&str; 5] = ["button", "a", "div", "span", "input"];

pub const DEFAULT_CLICK_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_FILL_TIMEOUT_MS: u64 = 5_000;

fn default_element_types() -> Vec<String> {
    DEFAULT_ELEMENT_TYPES.iter().map(|t| t.to_string()).collect()
}

/// How a node was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Normalized text equals the target
    ExactText,

    /// Normalized text contains the target
    SubstringText,

    /// `value` attribute of a button-like control
    AttributeValue,

    /// One of the XPath templates
    #[serde(rename = "xpath")]
    XPath,

    /// One of the CSS templates, `:contains` emulated
    CssContains,

    /// A caller-supplied selector candidate matched directly
    Selector,
}

impl StrategyKind {
    /// Get strategy name as string
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::ExactText => "exact_text",
            StrategyKind::SubstringText => "substring_text",
            StrategyKind::AttributeValue => "attribute_value",
            StrategyKind::XPath => "xpath",
            StrategyKind::CssContains => "css_contains",
            StrategyKind::Selector => "selector",
        }
    }
}

/// What the caller wants clicked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDescriptor {
    /// Free text as the user sees it on the page
    pub target_text: String,

    /// Tag names to search, in priority order
    pub element_types: Vec<String>,

    /// Bounded wait per XPath template
    pub timeout: Duration,
}

impl ElementDescriptor {
    pub fn new(target_text: impl Into<String>) -> Self {
        Self {
            target_text: target_text.into(),
            element_types: default_element_types(),
            timeout: Duration::from_millis(DEFAULT_CLICK_TIMEOUT_MS),
        }
    }

    /// Replace the tag hints; an empty list keeps the defaults
    pub fn with_element_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let types: Vec<String> = types
            .into_iter()
            .map(Into::into)
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if !types.is_empty() {
            self.element_types = types;
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A located node, before any action
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub handle: ElementHandle,

    pub strategy: StrategyKind,

    /// Selector, expression or tag name that produced the match
    pub selector: String,
}

/// Structured result returned to the tool layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,

    pub method: StrategyKind,

    pub selector: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionOutcome {
    pub fn succeeded(method: StrategyKind, selector: impl Into<String>) -> Self {
        Self {
            success: true,
            method,
            selector: selector.into(),
            error: None,
        }
    }
}

impl From<&MatchResult> for ActionOutcome {
    fn from(result: &MatchResult) -> Self {
        ActionOutcome::succeeded(result.strategy, result.selector.clone())
    }
}

/// Locator settings (the `locator:` config section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Default per-template XPath wait for clicks
    pub click_timeout_ms: u64,

    /// Per-candidate presence and visibility wait for fills
    pub fill_timeout_ms: u64,

    /// Default tag hints for clicks
    pub element_types: Vec<String>,

    /// Optional budget for a whole resolve-and-click or fill call
    pub call_timeout_ms: Option<u64>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            click_timeout_ms: DEFAULT_CLICK_TIMEOUT_MS,
            fill_timeout_ms: DEFAULT_FILL_TIMEOUT_MS,
            element_types: default_element_types(),
            call_timeout_ms: None,
        }
    }
}

impl LocatorConfig {
    pub fn click_timeout(&self) -> Duration {
        Duration::from_millis(self.click_timeout_ms)
    }

    pub fn fill_timeout(&self) -> Duration {
        Duration::from_millis(self.fill_timeout_ms)
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }

    /// Descriptor for `target_text` carrying this config's defaults
    pub fn descriptor(&self, target_text: impl Into<String>) -> ElementDescriptor {
        ElementDescriptor::new(target_text)
            .with_element_types(self.element_types.iter().cloned())
            .with_timeout(self.click_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_hints_keep_defaults() {
        let descriptor = ElementDescriptor::new("Next").with_element_types(Vec::<String>::new());
        assert_eq!(descriptor.element_types, default_element_types());

        let descriptor = ElementDescriptor::new("Next").with_element_types(["  ", ""]);
        assert_eq!(descriptor.element_types, default_element_types());
    }

    #[test]
    fn hints_are_normalized() {
        let descriptor = ElementDescriptor::new("Next").with_element_types([" A ", "Button"]);
        assert_eq!(descriptor.element_types, vec!["a", "button"]);
    }

    #[test]
    fn strategy_names_match_serde() {
        for kind in [
            StrategyKind::ExactText,
            StrategyKind::SubstringText,
            StrategyKind::AttributeValue,
            StrategyKind::XPath,
            StrategyKind::CssContains,
            StrategyKind::Selector,
        ] {
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                serde_json::json!(kind.name())
            );
        }
    }

    #[test]
    fn outcome_omits_absent_error() {
        let outcome = ActionOutcome::succeeded(StrategyKind::Selector, "#email");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "method": "selector", "selector": "#email"})
        );
    }

    #[test]
    fn config_descriptor_uses_configured_defaults() {
        let config = LocatorConfig {
            click_timeout_ms: 250,
            element_types: vec!["a".into()],
            ..LocatorConfig::default()
        };
        let descriptor = config.descriptor("Home");
        assert_eq!(descriptor.timeout, Duration::from_millis(250));
        assert_eq!(descriptor.element_types, vec!["a"]);
    }
}
