//! In-memory page session for deterministic tests
//!
//! `FakePage` holds a flat list of nodes in document order and records every
//! call made against it, so tests can assert both outcomes and the exact
//! order in which the document was consulted. It understands the subset of
//! CSS (`tag`, `#id`, `.class`, `[attr]`, `[attr=value]`, comma lists) and
//! XPath (`//tag[...]` with `contains(text(), ...)`, `contains(@a, ...)`,
//! `@a=...`, `text()=...`) that the locator emits; anything else is rejected
//! as an invalid selector, the same way a browser rejects `:contains`.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::{
    errors::ActionError,
    session::PageSession,
    types::{DomNode, ElementHandle, Selector},
};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// A node in the fake document
#[derive(Clone, Debug)]
pub struct FakeNode {
    tag: String,
    text: String,
    attributes: BTreeMap<String, String>,
    visible: bool,
    detached: bool,
    appears_after: u32,
}

impl FakeNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            text: String::new(),
            attributes: BTreeMap::new(),
            visible: true,
            detached: false,
            appears_after: 0,
        }
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Present in the document but not rendered
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Queryable and scrollable, but removed before any click or keystroke lands
    pub fn detached(mut self) -> Self {
        self.detached = true;
        self
    }

    /// Only inserted into the document on the n-th query
    pub fn appears_after(mut self, queries: u32) -> Self {
        self.appears_after = queries;
        self
    }
}

/// One recorded interaction with the fake page
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageCall {
    Navigate(String),
    CurrentUrl,
    Query(String),
    Evaluate(String),
    ScrollIntoView(String),
    Click(String),
    Focus(String),
    Clear(String),
    TypeText { handle: String, text: String },
    Screenshot,
}

struct FakeState {
    url: String,
    nodes: Vec<FakeNode>,
    routes: HashMap<String, Vec<FakeNode>>,
    epoch: u64,
    queries: u32,
    calls: Vec<PageCall>,
    eval_result: Value,
}

/// In-memory [`PageSession`]
pub struct FakePage {
    state: Mutex<FakeState>,
}

impl FakePage {
    pub fn new(nodes: Vec<FakeNode>) -> Self {
        Self {
            state: Mutex::new(FakeState {
                url: "about:blank".to_string(),
                nodes,
                routes: HashMap::new(),
                epoch: 0,
                queries: 0,
                calls: Vec::new(),
                eval_result: Value::Null,
            }),
        }
    }

    pub fn with_url(self, url: &str) -> Self {
        self.state.lock().url = url.to_string();
        self
    }

    /// Document served when navigating to `url`
    pub fn with_route(self, url: &str, nodes: Vec<FakeNode>) -> Self {
        self.state.lock().routes.insert(url.to_string(), nodes);
        self
    }

    /// Value returned by every `evaluate` call
    pub fn with_eval_result(self, value: Value) -> Self {
        self.state.lock().eval_result = value;
        self
    }

    pub fn calls(&self) -> Vec<PageCall> {
        self.state.lock().calls.clone()
    }

    /// Selectors queried, in order
    pub fn queries(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PageCall::Query(selector) => Some(selector),
                _ => None,
            })
            .collect()
    }

    /// Handle keys clicked, in order
    pub fn clicks(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PageCall::Click(handle) => Some(handle),
                _ => None,
            })
            .collect()
    }

    pub fn reset_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Attribute of the first node carrying the given `id`
    pub fn attribute_of(&self, id: &str, attr: &str) -> Option<String> {
        let state = self.state.lock();
        state
            .nodes
            .iter()
            .find(|node| node.attributes.get("id").map(String::as_str) == Some(id))
            .and_then(|node| node.attributes.get(attr).cloned())
    }

    /// Current `value` of the node with the given `id`
    pub fn value_of(&self, id: &str) -> Option<String> {
        self.attribute_of(id, "value")
    }

    fn record(&self, call: PageCall) {
        self.state.lock().calls.push(call);
    }

    /// Apply `f` to the live node behind `handle`
    fn with_node<T>(
        &self,
        handle: &ElementHandle,
        require_attached: bool,
        f: impl FnOnce(&mut FakeNode) -> Result<T, ActionError>,
    ) -> Result<T, ActionError> {
        let mut state = self.state.lock();
        let index = parse_handle(handle, state.epoch)?;
        let node = state
            .nodes
            .get_mut(index)
            .ok_or_else(|| ActionError::StaleHandle(handle.to_string()))?;
        if require_attached && node.detached {
            return Err(ActionError::StaleHandle(format!(
                "{} is no longer attached to the document",
                handle
            )));
        }
        f(node)
    }
}

fn handle_key(epoch: u64, index: usize) -> String {
    format!("fake-{}-{}", epoch, index)
}

fn parse_handle(handle: &ElementHandle, epoch: u64) -> Result<usize, ActionError> {
    let stale = || ActionError::StaleHandle(handle.to_string());
    let mut parts = handle.key().strip_prefix("fake-").ok_or_else(stale)?.split('-');
    let handle_epoch: u64 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(stale)?;
    let index: usize = parts.next().and_then(|p| p.parse().ok()).ok_or_else(stale)?;
    if handle_epoch != epoch {
        return Err(stale());
    }
    Ok(index)
}

fn ensure_visible(node: &FakeNode, handle: &ElementHandle) -> Result<(), ActionError> {
    if node.visible {
        Ok(())
    } else {
        Err(ActionError::NotInteractable(format!(
            "{} is not visible",
            handle
        )))
    }
}

#[async_trait]
impl PageSession for FakePage {
    async fn navigate(&self, url: &str) -> Result<(), ActionError> {
        let mut state = self.state.lock();
        state.calls.push(PageCall::Navigate(url.to_string()));
        if let Some(nodes) = state.routes.get(url).cloned() {
            state.nodes = nodes;
        }
        state.url = url.to_string();
        state.epoch += 1;
        state.queries = 0;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, ActionError> {
        let mut state = self.state.lock();
        state.calls.push(PageCall::CurrentUrl);
        Ok(state.url.clone())
    }

    async fn query(&self, selector: &Selector) -> Result<Vec<DomNode>, ActionError> {
        let mut state = self.state.lock();
        state.calls.push(PageCall::Query(selector.as_str().to_string()));
        state.queries += 1;

        let matcher = NodeMatcher::parse(selector)?;
        let queries = state.queries;
        let epoch = state.epoch;
        Ok(state
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.appears_after <= queries)
            .filter(|(_, node)| matcher.matches(node))
            .map(|(index, node)| DomNode {
                handle: ElementHandle::new(handle_key(epoch, index)),
                tag: node.tag.clone(),
                text_content: node.text.clone(),
                attributes: node.attributes.clone(),
                visible: node.visible,
            })
            .collect())
    }

    async fn evaluate(&self, script: &str) -> Result<Value, ActionError> {
        let mut state = self.state.lock();
        state.calls.push(PageCall::Evaluate(script.to_string()));
        Ok(state.eval_result.clone())
    }

    async fn scroll_into_view(&self, handle: &ElementHandle) -> Result<(), ActionError> {
        self.record(PageCall::ScrollIntoView(handle.to_string()));
        self.with_node(handle, false, |_| Ok(()))
    }

    async fn click(&self, handle: &ElementHandle) -> Result<(), ActionError> {
        self.record(PageCall::Click(handle.to_string()));
        self.with_node(handle, true, |node| ensure_visible(node, handle))
    }

    async fn focus(&self, handle: &ElementHandle) -> Result<(), ActionError> {
        self.record(PageCall::Focus(handle.to_string()));
        self.with_node(handle, true, |node| ensure_visible(node, handle))
    }

    async fn clear(&self, handle: &ElementHandle) -> Result<(), ActionError> {
        self.record(PageCall::Clear(handle.to_string()));
        self.with_node(handle, true, |node| {
            node.attributes.insert("value".to_string(), String::new());
            Ok(())
        })
    }

    async fn type_text(
        &self,
        handle: &ElementHandle,
        text: &str,
        per_char_delay: Duration,
    ) -> Result<(), ActionError> {
        self.record(PageCall::TypeText {
            handle: handle.to_string(),
            text: text.to_string(),
        });
        for ch in text.chars() {
            self.with_node(handle, true, |node| {
                ensure_visible(node, handle)?;
                node.attributes
                    .entry("value".to_string())
                    .or_default()
                    .push(ch);
                Ok(())
            })?;
            if !per_char_delay.is_zero() {
                tokio::time::sleep(per_char_delay).await;
            }
        }
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, ActionError> {
        self.record(PageCall::Screenshot);
        Ok(PNG_SIGNATURE.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Selector subset
// ---------------------------------------------------------------------------

enum NodeMatcher {
    Css(Vec<Compound>),
    XPath(XPathQuery),
}

impl NodeMatcher {
    fn parse(selector: &Selector) -> Result<Self, ActionError> {
        match selector {
            Selector::Css(css) => parse_css(css).map(NodeMatcher::Css),
            Selector::XPath(expr) => parse_xpath(expr).map(NodeMatcher::XPath),
        }
    }

    fn matches(&self, node: &FakeNode) -> bool {
        match self {
            NodeMatcher::Css(groups) => groups.iter().any(|c| c.matches(node)),
            NodeMatcher::XPath(query) => query.matches(node),
        }
    }
}

#[derive(Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl Compound {
    fn matches(&self, node: &FakeNode) -> bool {
        if let Some(tag) = &self.tag {
            if &node.tag != tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.attributes.get("id") != Some(id) {
                return false;
            }
        }
        let classes: Vec<&str> = node
            .attributes
            .get("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default();
        if !self.classes.iter().all(|c| classes.contains(&c.as_str())) {
            return false;
        }
        self.attrs.iter().all(|(name, expected)| {
            match (node.attributes.get(name), expected) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
    }
}

fn invalid(selector: &str, reason: &str) -> ActionError {
    ActionError::InvalidSelector(format!("'{}': {}", selector, reason))
}

/// Split at `sep` outside quotes and brackets
fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut depth = 0i32;
    let mut start = 0;
    for (i, ch) in input.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '[') | (None, '(') => depth += 1,
            (None, ']') | (None, ')') => depth -= 1,
            (None, c) if c == sep && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn take_ident(input: &str) -> (&str, &str) {
    let end = input
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(input.len());
    input.split_at(end)
}

fn unquote(raw: &str, allow_escapes: bool) -> Option<String> {
    let mut chars = raw.chars();
    let open = chars.next()?;
    if (open != '"' && open != '\'') || !raw.ends_with(open) || raw.len() < 2 {
        return None;
    }
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::new();
    let mut escaped = false;
    for ch in inner.chars() {
        if escaped {
            out.push(ch);
            escaped = false;
        } else if allow_escapes && ch == '\\' {
            escaped = true;
        } else if ch == open {
            return None;
        } else {
            out.push(ch);
        }
    }
    if escaped {
        return None;
    }
    Some(out)
}

fn parse_css(selector: &str) -> Result<Vec<Compound>, ActionError> {
    if selector.trim().is_empty() {
        return Err(invalid(selector, "empty selector"));
    }
    split_top_level(selector, ',')
        .into_iter()
        .map(|part| parse_compound(part.trim(), selector))
        .collect()
}

fn parse_compound(part: &str, selector: &str) -> Result<Compound, ActionError> {
    if part.is_empty() {
        return Err(invalid(selector, "empty selector group"));
    }
    let mut compound = Compound::default();
    let mut rest = part;

    if let Some(stripped) = rest.strip_prefix('*') {
        rest = stripped;
    } else {
        let (tag, after) = take_ident(rest);
        if !tag.is_empty() {
            compound.tag = Some(tag.to_ascii_lowercase());
        }
        rest = after;
    }

    while let Some(first) = rest.chars().next() {
        match first {
            '#' => {
                let (id, after) = take_ident(&rest[1..]);
                if id.is_empty() {
                    return Err(invalid(selector, "empty id"));
                }
                compound.id = Some(id.to_string());
                rest = after;
            }
            '.' => {
                let (class, after) = take_ident(&rest[1..]);
                if class.is_empty() {
                    return Err(invalid(selector, "empty class"));
                }
                compound.classes.push(class.to_string());
                rest = after;
            }
            '[' => {
                let close = find_closing_bracket(rest)
                    .ok_or_else(|| invalid(selector, "unterminated attribute selector"))?;
                compound.attrs.push(parse_attr(&rest[1..close], selector)?);
                rest = &rest[close + 1..];
            }
            _ => return Err(invalid(selector, "unsupported selector syntax")),
        }
    }
    Ok(compound)
}

fn find_closing_bracket(input: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, ch) in input.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (Some(_), '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, ']') => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_attr(inner: &str, selector: &str) -> Result<(String, Option<String>), ActionError> {
    let Some((name, value)) = inner.split_once('=') else {
        let name = inner.trim();
        if name.is_empty() {
            return Err(invalid(selector, "empty attribute name"));
        }
        return Ok((name.to_string(), None));
    };
    let name = name.trim();
    let (ident, leftover) = take_ident(name);
    if ident.is_empty() || !leftover.is_empty() {
        return Err(invalid(selector, "unsupported attribute operator"));
    }
    let value = value.trim();
    let value = if value.starts_with('"') || value.starts_with('\'') {
        unquote(value, true).ok_or_else(|| invalid(selector, "bad attribute string"))?
    } else {
        let (bare, leftover) = take_ident(value);
        if bare.is_empty() || !leftover.is_empty() {
            return Err(invalid(selector, "bad attribute value"));
        }
        bare.to_string()
    };
    Ok((ident.to_string(), Some(value)))
}

struct XPathQuery {
    tag: Option<String>,
    predicate: Option<XPathPredicate>,
}

enum XPathPredicate {
    ContainsText(String),
    TextEquals(String),
    AttrEquals(String, String),
    AttrContains(String, String),
}

impl XPathQuery {
    fn matches(&self, node: &FakeNode) -> bool {
        if let Some(tag) = &self.tag {
            if &node.tag != tag {
                return false;
            }
        }
        match &self.predicate {
            None => true,
            Some(XPathPredicate::ContainsText(needle)) => node.text.contains(needle.as_str()),
            Some(XPathPredicate::TextEquals(expected)) => &node.text == expected,
            Some(XPathPredicate::AttrEquals(name, expected)) => {
                node.attributes.get(name) == Some(expected)
            }
            Some(XPathPredicate::AttrContains(name, needle)) => node
                .attributes
                .get(name)
                .map(|v| v.contains(needle.as_str()))
                .unwrap_or(false),
        }
    }
}

fn parse_xpath(expr: &str) -> Result<XPathQuery, ActionError> {
    let rest = expr
        .trim()
        .strip_prefix("//")
        .ok_or_else(|| invalid(expr, "expected '//' axis"))?;

    let (step, predicate) = match rest.find('[') {
        Some(open) => {
            let body = rest[open..]
                .strip_prefix('[')
                .and_then(|b| b.strip_suffix(']'))
                .ok_or_else(|| invalid(expr, "unbalanced predicate"))?;
            (&rest[..open], Some(parse_predicate(body.trim(), expr)?))
        }
        None => (rest, None),
    };

    let tag = match step {
        "*" => None,
        other => {
            let (ident, leftover) = take_ident(other);
            if ident.is_empty() || !leftover.is_empty() {
                return Err(invalid(expr, "unsupported location step"));
            }
            Some(ident.to_ascii_lowercase())
        }
    };
    Ok(XPathQuery { tag, predicate })
}

fn parse_predicate(body: &str, expr: &str) -> Result<XPathPredicate, ActionError> {
    let literal = |raw: &str| {
        unquote(raw.trim(), false).ok_or_else(|| invalid(expr, "unsupported literal"))
    };

    if let Some(args) = body
        .strip_prefix("contains(")
        .and_then(|a| a.strip_suffix(')'))
    {
        let parts = split_top_level(args, ',');
        if parts.len() != 2 {
            return Err(invalid(expr, "contains() takes two arguments"));
        }
        let subject = parts[0].trim();
        let needle = literal(parts[1])?;
        return if subject == "text()" {
            Ok(XPathPredicate::ContainsText(needle))
        } else if let Some(attr) = subject.strip_prefix('@') {
            Ok(XPathPredicate::AttrContains(attr.to_string(), needle))
        } else {
            Err(invalid(expr, "unsupported contains() subject"))
        };
    }

    let (lhs, rhs) = body
        .split_once('=')
        .ok_or_else(|| invalid(expr, "unsupported predicate"))?;
    let lhs = lhs.trim();
    let value = literal(rhs)?;
    if lhs == "text()" {
        return Ok(XPathPredicate::TextEquals(value));
    }
    match lhs.strip_prefix('@') {
        Some(attr) if !attr.is_empty() => Ok(XPathPredicate::AttrEquals(attr.to_string(), value)),
        _ => Err(invalid(expr, "unsupported predicate")),
    }
}
