use std::time::Duration;

use serde_json::Value;

use crate::breaker::CircuitBreaker;
use crate::mcp::McpClient;
use crate::tools::{ToolError, ToolRegistry};

/// Remote MCP endpoint configuration for the dispatcher.
pub struct RemoteEndpoint {
    pub url: String,
    pub timeout: Duration,
    /// Optional cooldown policy. `None` means the remote path is
    /// re-attempted on every request, even right after a failure.
    pub breaker: Option<CircuitBreaker>,
}

/// Dual-path tool dispatcher.
///
/// Each request attempts the remote MCP endpoint first (when one is
/// configured) and falls back to the local registry on any transport
/// failure. Remote failures are logged but never surfaced to the caller;
/// within one request the remote path is never re-attempted after
/// falling back.
pub struct ToolDispatcher {
    registry: ToolRegistry,
    remote: Option<RemoteEndpoint>,
    client: McpClient,
}

impl ToolDispatcher {
    pub fn new(registry: ToolRegistry, remote: Option<RemoteEndpoint>) -> Self {
        Self {
            registry,
            remote,
            client: McpClient::new(),
        }
    }

    /// Resolve and execute a tool call.
    pub async fn dispatch(&self, tool: &str, arguments: Value) -> Result<Value, ToolError> {
        if let Some(remote) = &self.remote {
            if remote.breaker.as_ref().is_none_or(|b| b.allow()) {
                tracing::info!(tool = %tool, endpoint = %remote.url, "Forwarding to MCP transport");

                match self
                    .client
                    .call_tool(&remote.url, tool, arguments.clone(), remote.timeout)
                    .await
                {
                    Ok(outcome) => {
                        if let Some(b) = &remote.breaker {
                            b.record_success();
                        }
                        metrics::counter!("dispatch.path", "path" => "remote").increment(1);

                        // A remote isError result is a business failure, not
                        // a transport failure — no fallback.
                        if outcome.is_error {
                            return Err(ToolError::Invocation(payload_message(&outcome.payload)));
                        }
                        return Ok(outcome.payload);
                    }
                    Err(e) => {
                        tracing::warn!(
                            tool = %tool,
                            endpoint = %remote.url,
                            error = %e,
                            "MCP transport failed, falling back to local execution"
                        );
                        if let Some(b) = &remote.breaker {
                            b.record_failure();
                        }
                        metrics::counter!("dispatch.remote_failures").increment(1);
                    }
                }
            } else {
                tracing::debug!(tool = %tool, "Circuit breaker open, skipping remote path");
                metrics::counter!("dispatch.breaker_skips").increment(1);
            }
        }

        metrics::counter!("dispatch.path", "path" => "local").increment(1);
        self.registry.execute(tool, arguments).await
    }
}

/// Human-readable message for a remote error payload.
fn payload_message(payload: &Value) -> String {
    match payload {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
