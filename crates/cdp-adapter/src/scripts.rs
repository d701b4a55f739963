//! In-page scripts. Arguments are spliced in as JSON string literals.

use serde_json::Value;

/// Attribute carrying the per-load node token
pub const NODE_ATTR: &str = "data-pagepilot-node";

/// Quote `text` as a JavaScript string literal
pub fn js_string(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

/// CSS selector addressing a tagged node
pub fn node_selector(key: &str) -> String {
    format!("[{}={}]", NODE_ATTR, js_string(key))
}

/// Query by CSS (`kind = "css"`) or XPath (`kind = "xpath"`), tagging each
/// element node and returning `{nodes: [...]}` or `{error}`.
pub fn query(kind: &str, selector: &str) -> String {
    let find = format!(
        r#"const kind = {kind};
            const selector = {selector};
            let found = [];
            try {{
                if (kind === 'xpath') {{
                    const snap = document.evaluate(selector, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                    for (let i = 0; i < snap.snapshotLength; i++) {{
                        const node = snap.snapshotItem(i);
                        if (node && node.nodeType === 1) found.push(node);
                    }}
                }} else {{
                    found = Array.from(document.querySelectorAll(selector));
                }}
            }} catch (e) {{
                return {{ error: String((e && e.message) || e) }};
            }}"#,
        kind = js_string(kind),
        selector = js_string(selector),
    );
    collect_nodes(&find, None)
}

/// Elements whose trimmed, lower-cased text contains `needle`, filtered in
/// the page so only matches are tagged and serialized. Text is trimmed and
/// cut to `text_limit` UTF-16 units.
pub fn query_text(needle: &str, text_limit: usize) -> String {
    let find = format!(
        r#"const needle = {needle};
            const found = Array.from(document.querySelectorAll('*'))
                .filter((el) => (el.textContent || '').trim().toLowerCase().includes(needle));"#,
        needle = js_string(needle),
    );
    collect_nodes(&find, Some(text_limit))
}

/// Wrap a `found`-producing body with tagging and serialization
fn collect_nodes(find: &str, text_limit: Option<usize>) -> String {
    let limit = text_limit.map_or_else(|| "null".to_string(), |n| n.to_string());
    format!(
        r#"(() => {{
            const attr = {attr};
            const limit = {limit};
            const doc = window.__pagepilotDoc || (window.__pagepilotDoc = Math.random().toString(36).slice(2, 10));
            {find}
            const isVisible = (el) => {{
                const style = window.getComputedStyle(el);
                if (style.visibility === 'hidden' || style.display === 'none') return false;
                const rect = el.getBoundingClientRect();
                return rect.width > 0 || rect.height > 0 || el.getClientRects().length > 0;
            }};
            window.__pagepilotSeq = window.__pagepilotSeq || 0;
            return {{ nodes: found.map((el) => {{
                let key = el.getAttribute(attr);
                if (!key || !key.startsWith(doc + '-')) {{
                    key = doc + '-' + (++window.__pagepilotSeq);
                    el.setAttribute(attr, key);
                }}
                const attributes = {{}};
                for (const a of Array.from(el.attributes)) {{
                    if (a.name !== attr) attributes[a.name] = a.value;
                }}
                if (el instanceof HTMLInputElement || el instanceof HTMLTextAreaElement || el instanceof HTMLSelectElement) {{
                    attributes.value = String(el.value);
                }}
                const text = el.textContent || '';
                return {{
                    key,
                    tag: el.tagName.toLowerCase(),
                    text: limit === null ? text : text.trim().slice(0, limit),
                    attributes,
                    visible: isVisible(el),
                }};
            }}) }};
        }})()"#,
        attr = js_string(NODE_ATTR),
        limit = limit,
        find = find,
    )
}

/// Smooth-scroll a tagged node to the viewport center; `false` when gone
pub fn scroll_into_view(key: &str) -> String {
    format!(
        r#"(() => {{
            const el = document.querySelector({selector});
            if (!el) return false;
            el.scrollIntoView({{ behavior: 'smooth', block: 'center', inline: 'center' }});
            return true;
        }})()"#,
        selector = js_string(&node_selector(key)),
    )
}

/// Focus a tagged node and select all of its editable content
pub fn select_contents(key: &str) -> String {
    format!(
        r#"(() => {{
            const el = document.querySelector({selector});
            if (!el) return false;
            el.focus();
            if (typeof el.select === 'function') {{
                el.select();
            }} else {{
                const range = document.createRange();
                range.selectNodeContents(el);
                const selection = window.getSelection();
                selection.removeAllRanges();
                selection.addRange(range);
            }}
            return true;
        }})()"#,
        selector = js_string(&node_selector(key)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_string_escapes_quotes() {
        assert_eq!(js_string(r#"a "b" 'c'"#), r#""a \"b\" 'c'""#);
    }

    #[test]
    fn node_selector_is_attribute_match() {
        assert_eq!(node_selector("ab12-3"), r#"[data-pagepilot-node="ab12-3"]"#);
    }

    #[test]
    fn query_embeds_selector_safely() {
        let script = query("css", r#"[title="x"]"#);
        assert!(script.contains(r#"const selector = "[title=\"x\"]";"#));
        assert!(script.contains(r#"const kind = "css";"#));
        assert!(script.contains("const limit = null;"));
    }

    #[test]
    fn text_query_filters_in_page() {
        let script = query_text(r#"sign "in""#, 100);
        assert!(script.contains(r#"const needle = "sign \"in\"";"#));
        assert!(script.contains("const limit = 100;"));
        assert!(script.contains(".includes(needle)"));
    }
}
