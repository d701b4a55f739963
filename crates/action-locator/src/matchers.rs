//! Matcher primitives
//!
//! Pure functions over already-queried nodes plus the selector templates the
//! strategies substitute the target text into. Nothing here touches the page.

use action_primitives::{normalize_text, DomNode};

/// First node whose normalized text equals `needle` (already normalized)
pub fn first_exact<'a>(nodes: &'a [DomNode], needle: &str) -> Option<&'a DomNode> {
    nodes.iter().find(|node| node.normalized_text() == needle)
}

/// First node whose normalized text contains `needle` (already normalized)
pub fn first_containing<'a>(nodes: &'a [DomNode], needle: &str) -> Option<&'a DomNode> {
    nodes.iter().find(|node| node.normalized_text().contains(needle))
}

/// First node whose normalized `value` attribute equals or contains `needle`
pub fn first_value_match<'a>(nodes: &'a [DomNode], needle: &str) -> Option<&'a DomNode> {
    nodes.iter().find(|node| {
        node.attribute("value")
            .map(|value| normalize_text(value).contains(needle))
            .unwrap_or(false)
    })
}

/// Quote `text` as an XPath 1.0 string literal.
///
/// XPath has no escape sequences, so text holding both quote kinds is built
/// with `concat()`.
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{}'", text);
    }
    if !text.contains('"') {
        return format!("\"{}\"", text);
    }
    let parts: Vec<String> = text
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// Quote `text` as a double-quoted CSS string
pub fn css_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// XPath templates, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XPathTemplate {
    ContainsText,
    Value,
    AriaLabel,
    Title,
}

impl XPathTemplate {
    pub const ALL: [XPathTemplate; 4] = [
        XPathTemplate::ContainsText,
        XPathTemplate::Value,
        XPathTemplate::AriaLabel,
        XPathTemplate::Title,
    ];

    pub fn render(&self, text: &str) -> String {
        let literal = xpath_literal(text);
        match self {
            XPathTemplate::ContainsText => format!("//*[contains(text(), {})]", literal),
            XPathTemplate::Value => format!("//*[@value={}]", literal),
            XPathTemplate::AriaLabel => format!("//*[@aria-label={}]", literal),
            XPathTemplate::Title => format!("//*[@title={}]", literal),
        }
    }
}

/// CSS templates, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssTemplate {
    ButtonContains,
    LinkContains,
    InputValue,
    AriaLabel,
    Title,
}

impl CssTemplate {
    pub const ALL: [CssTemplate; 5] = [
        CssTemplate::ButtonContains,
        CssTemplate::LinkContains,
        CssTemplate::InputValue,
        CssTemplate::AriaLabel,
        CssTemplate::Title,
    ];

    /// Selector text, possibly using the non-standard `:contains`
    pub fn render(&self, text: &str) -> String {
        let quoted = css_string(text);
        match self {
            CssTemplate::ButtonContains => format!("button:contains({})", quoted),
            CssTemplate::LinkContains => format!("a:contains({})", quoted),
            CssTemplate::InputValue => format!("input[value={}]", quoted),
            CssTemplate::AriaLabel => format!("[aria-label={}]", quoted),
            CssTemplate::Title => format!("[title={}]", quoted),
        }
    }
}

/// A selector split into a real CSS base and an optional text needle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainsSelector {
    pub base: String,
    pub needle: Option<String>,
}

/// Split `base:contains("needle")` into its parts.
///
/// Selectors without a trailing `:contains(...)` come back unchanged with no
/// needle. An empty base means any element.
pub fn split_contains(selector: &str) -> ContainsSelector {
    let Some(start) = selector.find(":contains(") else {
        return ContainsSelector {
            base: selector.to_string(),
            needle: None,
        };
    };
    let argument = &selector[start + ":contains(".len()..];
    let Some(argument) = argument.trim_end().strip_suffix(')') else {
        return ContainsSelector {
            base: selector.to_string(),
            needle: None,
        };
    };

    let base = selector[..start].trim();
    ContainsSelector {
        base: if base.is_empty() {
            "*".to_string()
        } else {
            base.to_string()
        },
        needle: Some(unquote_css(argument.trim())),
    }
}

fn unquote_css(raw: &str) -> String {
    let inner = match raw.chars().next() {
        Some(q @ ('"' | '\'')) if raw.len() >= 2 && raw.ends_with(q) => &raw[1..raw.len() - 1],
        _ => raw,
    };
    let mut out = String::with_capacity(inner.len());
    let mut escaped = false;
    for ch in inner.chars() {
        if escaped {
            out.push(ch);
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else {
            out.push(ch);
        }
    }
    out
}
