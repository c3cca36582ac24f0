use std::time::Duration;

use serde_json::{json, Value};

/// MCP protocol revision spoken by this client.
const PROTOCOL_VERSION: &str = "2025-03-26";

/// Session id header used by streamable HTTP transports.
const SESSION_HEADER: &str = "mcp-session-id";

/// Upper bound on the best-effort session close request.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Failure of a remote MCP call. The dispatcher treats every variant the
/// same way (fall back to local execution); the variants exist so the
/// distinct cause lands in the logs.
#[derive(Debug, thiserror::Error)]
pub enum McpClientError {
    #[error("MCP transport unreachable: {0}")]
    Transport(String),

    #[error("MCP handshake failed: {0}")]
    Handshake(String),

    #[error("MCP protocol error: {0}")]
    Protocol(String),

    #[error("MCP response decode failed: {0}")]
    Decode(String),

    #[error("MCP call timed out after {0:?}")]
    Timeout(Duration),
}

impl From<McpClientError> for billing_common::BillingError {
    fn from(e: McpClientError) -> Self {
        match e {
            McpClientError::Timeout(_) => billing_common::BillingError::Timeout(e.to_string()),
            other => billing_common::BillingError::McpTransport(other.to_string()),
        }
    }
}

/// Result of a remote tool call that completed at the protocol level.
///
/// `is_error` carries the MCP `isError` flag: a business failure reported
/// by the remote tool, distinct from a transport failure.
pub struct CallToolOutcome {
    pub payload: Value,
    pub is_error: bool,
}

/// One-shot streamable HTTP MCP client.
///
/// Each `call_tool` opens a fresh session, issues exactly one `tools/call`
/// and closes the session again. Sessions are never pooled or reused.
pub struct McpClient {
    http: reqwest::Client,
}

impl McpClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Call a tool on the remote endpoint within `timeout`.
    ///
    /// The session is closed on every exit path; if the deadline fires
    /// mid-call, the close still runs with whatever session id the
    /// handshake produced.
    pub async fn call_tool(
        &self,
        endpoint: &str,
        tool: &str,
        arguments: Value,
        timeout: Duration,
    ) -> Result<CallToolOutcome, McpClientError> {
        let mut session: Option<String> = None;

        let outcome = tokio::time::timeout(
            timeout,
            self.call_inner(endpoint, tool, arguments, &mut session),
        )
        .await;

        if let Some(ref sid) = session {
            self.close_session(endpoint, sid).await;
        }

        match outcome {
            Ok(result) => result,
            Err(_) => Err(McpClientError::Timeout(timeout)),
        }
    }

    async fn call_inner(
        &self,
        endpoint: &str,
        tool: &str,
        arguments: Value,
        session: &mut Option<String>,
    ) -> Result<CallToolOutcome, McpClientError> {
        // 1. initialize — the handshake may itself fail.
        let init = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {
                    "name": "billing-bridge",
                    "version": env!("CARGO_PKG_VERSION"),
                },
            },
        });

        let resp = self
            .post_message(endpoint, None, &init)
            .await
            .map_err(|e| McpClientError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(McpClientError::Handshake(format!(
                "initialize returned HTTP {}",
                resp.status()
            )));
        }

        *session = resp
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = resp
            .text()
            .await
            .map_err(|e| McpClientError::Decode(e.to_string()))?;
        rpc_result(&body).map_err(|e| McpClientError::Handshake(e.to_string()))?;

        // 2. notifications/initialized — no id, no response body expected.
        let initialized = json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized",
        });

        let resp = self
            .post_message(endpoint, session.as_deref(), &initialized)
            .await
            .map_err(|e| McpClientError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(McpClientError::Handshake(format!(
                "initialized notification returned HTTP {}",
                resp.status()
            )));
        }

        // 3. tools/call — exactly one per session.
        let call = json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/call",
            "params": {
                "name": tool,
                "arguments": arguments,
            },
        });

        let resp = self
            .post_message(endpoint, session.as_deref(), &call)
            .await
            .map_err(|e| McpClientError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(McpClientError::Protocol(format!(
                "tools/call returned HTTP {}",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| McpClientError::Decode(e.to_string()))?;
        let result = rpc_result(&body)?;

        let is_error = result
            .get("isError")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let payload = match result.get("structuredContent") {
            Some(v) if !v.is_null() => v.clone(),
            _ => text_content(&result),
        };

        Ok(CallToolOutcome { payload, is_error })
    }

    async fn post_message(
        &self,
        endpoint: &str,
        session: Option<&str>,
        message: &Value,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut req = self
            .http
            .post(endpoint)
            .header(reqwest::header::ACCEPT, "application/json, text/event-stream")
            .json(message);

        if let Some(sid) = session {
            req = req.header(SESSION_HEADER, sid);
        }

        req.send().await
    }

    /// Best-effort session teardown. Failures are logged, never surfaced.
    async fn close_session(&self, endpoint: &str, session: &str) {
        let result = self
            .http
            .delete(endpoint)
            .header(SESSION_HEADER, session)
            .timeout(CLOSE_TIMEOUT)
            .send()
            .await;

        if let Err(e) = result {
            tracing::debug!(error = %e, "MCP session close failed");
        }
    }
}

impl Default for McpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the JSON-RPC `result` from a response body, surfacing JSON-RPC
/// errors as protocol failures.
fn rpc_result(body: &str) -> Result<Value, McpClientError> {
    let raw = extract_json_payload(body)?;

    let message: Value =
        serde_json::from_str(raw).map_err(|e| McpClientError::Decode(e.to_string()))?;

    if let Some(error) = message.get("error") {
        let detail = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown JSON-RPC error");
        return Err(McpClientError::Protocol(detail.to_string()));
    }

    message
        .get("result")
        .cloned()
        .ok_or_else(|| McpClientError::Decode("response has no result field".to_string()))
}

/// Streamable HTTP responses are either plain JSON or an SSE stream. For
/// a one-shot call the final `data:` line carries the response message.
fn extract_json_payload(body: &str) -> Result<&str, McpClientError> {
    let trimmed = body.trim();
    if trimmed.starts_with('{') {
        return Ok(trimmed);
    }

    trimmed
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .last()
        .ok_or_else(|| McpClientError::Decode("response is neither JSON nor SSE".to_string()))
}

/// Join the text blocks of a CallToolResult `content` array.
fn text_content(result: &Value) -> Value {
    let joined = result
        .get("content")
        .and_then(Value::as_array)
        .map(|blocks| {
            blocks
                .iter()
                .filter_map(|b| b.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();

    Value::String(joined)
}
