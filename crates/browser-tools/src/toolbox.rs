//! Tool trait and the registry that runs tools against one page

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{context::ToolContext, definition::ToolDefinition, errors::ToolError, tools};

/// An executable unit an orchestrator can call by name.
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    /// Execute with already-validated parameters
    async fn execute(&self, ctx: &ToolContext, params: Value) -> Result<Value, ToolError>;

    /// Reject non-object parameters and missing required keys
    fn validate(&self, params: &Value) -> Result<(), ToolError> {
        let definition = self.definition();
        let Some(object) = params.as_object() else {
            return Err(ToolError::invalid(
                &definition.name,
                "parameters must be an object",
            ));
        };
        for key in definition.required_params() {
            if object.get(key).map_or(true, Value::is_null) {
                return Err(ToolError::invalid(
                    &definition.name,
                    format!("missing required parameter `{}`", key),
                ));
            }
        }
        Ok(())
    }
}

/// The six built-in browser tools, in listing order
pub fn builtin_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(tools::OpenUrlTool::new()),
        Arc::new(tools::ScreenshotTool::new()),
        Arc::new(tools::FindAndClickTool::new()),
        Arc::new(tools::FillInputTool::new()),
        Arc::new(tools::PageStructureTool::new()),
        Arc::new(tools::WaitAndVerifyTool::new()),
    ]
}

/// Registry bound to one page context.
///
/// Calls are serialized: a second call waits until the first one returns, so
/// two tools never interleave on the page.
pub struct ToolBox {
    ctx: ToolContext,
    tools: Vec<Arc<dyn Tool>>,
    guard: Mutex<()>,
}

impl ToolBox {
    /// Registry holding the built-in tools
    pub fn new(ctx: ToolContext) -> Self {
        Self::with_tools(ctx, builtin_tools())
    }

    pub fn with_tools(ctx: ToolContext, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            ctx,
            tools,
            guard: Mutex::new(()),
        }
    }

    pub fn context(&self) -> &ToolContext {
        &self.ctx
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools
            .iter()
            .find(|tool| tool.definition().name == name)
            .cloned()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition().clone()).collect()
    }

    /// Validate and run the named tool
    pub async fn call(&self, name: &str, params: Value) -> Result<Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.validate(&params)?;

        let _turn = self.guard.lock().await;
        let started = Instant::now();
        info!(tool = name, "Tool call started");

        let result = tool.execute(&self.ctx, params).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(tool = name, elapsed_ms, "Tool call finished"),
            Err(err) => warn!(tool = name, elapsed_ms, kind = %err.kind(), error = %err, "Tool call failed"),
        }
        result
    }
}
