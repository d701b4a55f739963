//! Element resolution strategies
//!
//! Fallback order used by [`default_chain`]:
//! 1. Exact text over each hinted tag
//! 2. Substring text over each hinted tag
//! 3. `value` attribute of button-like controls
//! 4. Four XPath templates, each waited on up to the descriptor timeout
//! 5. Five CSS templates with `:contains` emulated
//!
//! A strategy yields zero or one node and has no side effects on the page.

use action_primitives::{
    normalize_text, wait_for_node, ActionError, DomNode, ElementHandle, PageSession, Selector,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::{
    matchers::{
        first_containing, first_exact, first_value_match, split_contains, CssTemplate,
        XPathTemplate,
    },
    types::{ElementDescriptor, MatchResult, StrategyKind},
};

/// Controls scanned by [`AttributeValueStrategy`]
pub const VALUE_CONTROLS_SELECTOR: &str = r#"input[type="submit"], input[type="button"], button"#;

/// Everything a strategy needs for one lookup
pub struct LocateContext<'a> {
    pub page: &'a dyn PageSession,
    pub descriptor: &'a ElementDescriptor,
    pub poll_interval: Duration,
}

impl LocateContext<'_> {
    fn needle(&self) -> String {
        normalize_text(&self.descriptor.target_text)
    }

    /// Target text as the page shows it, for template substitution
    fn raw_text(&self) -> &str {
        self.descriptor.target_text.trim()
    }
}

/// Strategy trait for element resolution
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Attempt to find one node. `Ok(None)` is a normal miss; an error is
    /// treated as a miss by the resolver after logging.
    async fn locate(&self, ctx: &LocateContext<'_>) -> Result<Option<MatchResult>, ActionError>;

    fn kind(&self) -> StrategyKind;

    /// Short label for logs
    fn label(&self) -> String {
        self.kind().name().to_string()
    }
}

/// The fixed fallback chain, in priority order
pub fn default_chain() -> Vec<Arc<dyn Strategy>> {
    let mut chain: Vec<Arc<dyn Strategy>> = vec![
        Arc::new(ExactTextStrategy),
        Arc::new(SubstringTextStrategy),
        Arc::new(AttributeValueStrategy),
    ];
    chain.extend(
        XPathTemplate::ALL
            .into_iter()
            .map(|template| Arc::new(XPathStrategy::new(template)) as Arc<dyn Strategy>),
    );
    chain.extend(
        CssTemplate::ALL
            .into_iter()
            .map(|template| Arc::new(CssContainsStrategy::new(template)) as Arc<dyn Strategy>),
    );
    chain
}

/// Scan hinted tags in order, nodes in document order, with `matcher`.
///
/// A tag whose query fails is skipped and the remaining tags are still
/// scanned. Without a match, the last such failure is returned.
async fn scan_hinted_types<F>(
    ctx: &LocateContext<'_>,
    kind: StrategyKind,
    matcher: F,
) -> Result<Option<MatchResult>, ActionError>
where
    F: Fn(&[DomNode], &str) -> Option<ElementHandle>,
{
    let needle = ctx.needle();
    let mut last_error = None;
    for tag in &ctx.descriptor.element_types {
        let nodes = match ctx.page.query_tag(tag).await {
            Ok(nodes) => nodes,
            Err(err) => {
                warn!(strategy = kind.name(), tag = %tag, error = %err, "Tag query failed, skipping tag");
                last_error = Some(err);
                continue;
            }
        };
        if let Some(handle) = matcher(&nodes, &needle) {
            return Ok(Some(MatchResult {
                handle,
                strategy: kind,
                selector: tag.clone(),
            }));
        }
    }
    match last_error {
        Some(err) => Err(err),
        None => Ok(None),
    }
}

/// Normalized text equals the target
pub struct ExactTextStrategy;

#[async_trait]
impl Strategy for ExactTextStrategy {
    async fn locate(&self, ctx: &LocateContext<'_>) -> Result<Option<MatchResult>, ActionError> {
        scan_hinted_types(ctx, self.kind(), |nodes, needle| {
            first_exact(nodes, needle).map(|n| n.handle.clone())
        })
        .await
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::ExactText
    }
}

/// Normalized text contains the target
pub struct SubstringTextStrategy;

#[async_trait]
impl Strategy for SubstringTextStrategy {
    async fn locate(&self, ctx: &LocateContext<'_>) -> Result<Option<MatchResult>, ActionError> {
        scan_hinted_types(ctx, self.kind(), |nodes, needle| {
            first_containing(nodes, needle).map(|n| n.handle.clone())
        })
        .await
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::SubstringText
    }
}

/// `value` attribute of submit/button controls
pub struct AttributeValueStrategy;

#[async_trait]
impl Strategy for AttributeValueStrategy {
    async fn locate(&self, ctx: &LocateContext<'_>) -> Result<Option<MatchResult>, ActionError> {
        let nodes = ctx
            .page
            .query(&Selector::Css(VALUE_CONTROLS_SELECTOR.to_string()))
            .await?;
        Ok(first_value_match(&nodes, &ctx.needle()).map(|node| MatchResult {
            handle: node.handle.clone(),
            strategy: StrategyKind::AttributeValue,
            selector: VALUE_CONTROLS_SELECTOR.to_string(),
        }))
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::AttributeValue
    }
}

/// One XPath template, waited on until a node exists or the timeout passes
pub struct XPathStrategy {
    template: XPathTemplate,
}

impl XPathStrategy {
    pub fn new(template: XPathTemplate) -> Self {
        Self { template }
    }
}

#[async_trait]
impl Strategy for XPathStrategy {
    async fn locate(&self, ctx: &LocateContext<'_>) -> Result<Option<MatchResult>, ActionError> {
        let expression = self.template.render(ctx.raw_text());
        let selector = Selector::XPath(expression.clone());
        match wait_for_node(
            ctx.page,
            &selector,
            false,
            ctx.descriptor.timeout,
            ctx.poll_interval,
        )
        .await
        {
            Ok(node) => Ok(Some(MatchResult {
                handle: node.handle,
                strategy: StrategyKind::XPath,
                selector: expression,
            })),
            Err(ActionError::WaitTimeout(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::XPath
    }

    fn label(&self) -> String {
        format!("xpath[{:?}]", self.template)
    }
}

/// One CSS template; `:contains` is split off and checked against text
pub struct CssContainsStrategy {
    template: CssTemplate,
}

impl CssContainsStrategy {
    pub fn new(template: CssTemplate) -> Self {
        Self { template }
    }
}

#[async_trait]
impl Strategy for CssContainsStrategy {
    async fn locate(&self, ctx: &LocateContext<'_>) -> Result<Option<MatchResult>, ActionError> {
        let rendered = self.template.render(ctx.raw_text());
        let split = split_contains(&rendered);
        let nodes = ctx.page.query(&Selector::Css(split.base.clone())).await?;

        let found = match &split.needle {
            Some(needle) => first_containing(&nodes, &normalize_text(needle)),
            None => nodes.first(),
        };
        Ok(found.map(|node| MatchResult {
            handle: node.handle.clone(),
            strategy: StrategyKind::CssContains,
            selector: rendered,
        }))
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::CssContains
    }

    fn label(&self) -> String {
        format!("css_contains[{:?}]", self.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chain_order() {
        let kinds: Vec<StrategyKind> = default_chain().iter().map(|s| s.kind()).collect();
        let mut expected = vec![
            StrategyKind::ExactText,
            StrategyKind::SubstringText,
            StrategyKind::AttributeValue,
        ];
        expected.extend([StrategyKind::XPath; 4]);
        expected.extend([StrategyKind::CssContains; 5]);
        assert_eq!(kinds, expected);
    }

    #[test]
    fn labels_distinguish_templates() {
        let labels: Vec<String> = default_chain().iter().map(|s| s.label()).collect();
        assert_eq!(labels[3], "xpath[ContainsText]");
        assert_eq!(labels[11], "css_contains[Title]");
    }
}
