use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::store::StoreClient;
use crate::tools::ToolError;

/// Shared context available to all tool handlers.
pub struct ToolHandlerContext {
    pub store: Arc<StoreClient>,
}

/// Handler function signature — takes args and context, returns the
/// tool-shaped JSON payload or a categorized error.
pub type ToolHandler = Arc<
    dyn Fn(
            Value,
            Arc<ToolHandlerContext>,
        ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send>>
        + Send
        + Sync,
>;

/// Registry of tool handlers, built once at startup.
///
/// This is the single source of truth for which tools exist on the local
/// fallback path; the name set mirrors what the remote MCP endpoint
/// exposes, so callers are path-agnostic.
pub struct ToolRegistry {
    handlers: HashMap<String, ToolHandler>,
    context: Arc<ToolHandlerContext>,
}

impl ToolRegistry {
    pub fn new(context: ToolHandlerContext) -> Self {
        Self {
            handlers: HashMap::new(),
            context: Arc::new(context),
        }
    }

    /// Register a tool handler by name.
    pub fn register(&mut self, name: &str, handler: ToolHandler) {
        self.handlers.insert(name.to_string(), handler);
    }

    /// Names of all registered tools, sorted.
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Execute a tool call by name.
    pub async fn execute(&self, tool_name: &str, args: Value) -> Result<Value, ToolError> {
        let start = std::time::Instant::now();

        let handler = match self.handlers.get(tool_name) {
            Some(h) => h,
            None => {
                tracing::warn!(tool = %tool_name, "Unknown tool called");
                metrics::counter!("tools.execution.errors", "tool" => tool_name.to_string())
                    .increment(1);
                return Err(ToolError::UnknownTool(tool_name.to_string()));
            }
        };

        let result = handler(args, Arc::clone(&self.context)).await;

        let latency = start.elapsed().as_secs_f64();
        metrics::histogram!("tools.execution.latency", "tool" => tool_name.to_string())
            .record(latency);
        metrics::counter!("tools.execution.count", "tool" => tool_name.to_string()).increment(1);

        match result {
            Ok(value) => {
                tracing::info!(tool = %tool_name, latency_s = latency, "Tool call succeeded");
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(tool = %tool_name, latency_s = latency, error = %e, "Tool call failed");
                metrics::counter!("tools.execution.errors", "tool" => tool_name.to_string())
                    .increment(1);
                Err(e)
            }
        }
    }
}
