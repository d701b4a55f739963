use action_primitives::{DomNode, Selector};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{parse_params, to_result};
use crate::{context::ToolContext, definition::ToolDefinition, errors::ToolError, toolbox::Tool};

const NAME: &str = "get_page_structure";

/// Selectors listed when no search term is given, in listing order
pub const INTERACTIVE_SELECTORS: [&str; 8] = [
    "button",
    "a",
    "input",
    "select",
    "textarea",
    "[onclick]",
    "[role=\"button\"]",
    "[tabindex]",
];

const LISTING_TEXT_LIMIT: usize = 50;
const SEARCH_TEXT_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Params {
    #[serde(alias = "searchTerm")]
    search_term: Option<String>,
}

/// One node in the structure listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureEntry {
    /// Interactive selector that found the node (listing mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    pub tag: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub visible: bool,
    /// Search mode only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clickable: Option<bool>,
}

impl StructureEntry {
    fn from_node(node: &DomNode, text_limit: usize) -> Self {
        let attr = |name: &str| node.attribute(name).map(str::to_string);
        Self {
            selector: None,
            tag: node.tag.clone(),
            text: node.text_content.trim().chars().take(text_limit).collect(),
            id: attr("id"),
            class_name: attr("class"),
            name: attr("name"),
            input_type: attr("type"),
            value: attr("value"),
            placeholder: attr("placeholder"),
            visible: node.visible,
            clickable: None,
        }
    }
}

fn is_clickable(node: &DomNode) -> bool {
    matches!(node.tag.as_str(), "a" | "button" | "input")
        || node.attribute("onclick").is_some()
        || node.attribute("role") == Some("button")
}

/// List interactive elements, or every element containing a search term
pub struct PageStructureTool {
    definition: ToolDefinition,
}

impl PageStructureTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::new(
                NAME,
                "Describe the page's interactive elements, or find elements containing a term",
                json!({
                    "type": "object",
                    "properties": {
                        "search_term": {
                            "type": "string",
                            "description": "Only list elements whose text contains this term"
                        }
                    }
                }),
            ),
        }
    }

    async fn interactive(&self, ctx: &ToolContext) -> Result<Vec<StructureEntry>, ToolError> {
        let mut entries = Vec::new();
        for selector in INTERACTIVE_SELECTORS {
            let nodes = ctx
                .session()
                .query(&Selector::Css(selector.to_string()))
                .await?;
            debug!(selector, count = nodes.len(), "Interactive selector scanned");
            entries.extend(nodes.iter().map(|node| StructureEntry {
                selector: Some(selector.to_string()),
                ..StructureEntry::from_node(node, LISTING_TEXT_LIMIT)
            }));
        }
        Ok(entries)
    }

    async fn search(&self, ctx: &ToolContext, term: &str) -> Result<Vec<StructureEntry>, ToolError> {
        let nodes = ctx.session().query_text(term, SEARCH_TEXT_LIMIT).await?;
        debug!(term, count = nodes.len(), "Text search scanned");
        Ok(nodes
            .iter()
            .map(|node| StructureEntry {
                clickable: Some(is_clickable(node)),
                ..StructureEntry::from_node(node, SEARCH_TEXT_LIMIT)
            })
            .collect())
    }
}

impl Default for PageStructureTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for PageStructureTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, ctx: &ToolContext, params: Value) -> Result<Value, ToolError> {
        let params: Params = parse_params(NAME, params)?;
        let term = params
            .search_term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let structure = match term {
            Some(term) => self.search(ctx, term).await?,
            None => self.interactive(ctx).await?,
        };

        let count = structure.len();
        Ok(json!({ "structure": to_result(&structure)?, "count": count }))
    }
}
