use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use billing_common::api::{CallToolRequest, ErrorBody, RouteInfo, RoutesResponse};

use crate::dispatch::ToolDispatcher;
use crate::tools::ToolError;

/// Shared application state.
pub struct AppState {
    pub dispatcher: ToolDispatcher,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}

/// POST /mcp_call — invoke a tool, remote first, local fallback.
///
/// The body is extracted as a `Result` so malformed JSON produces the
/// same `{"detail": ...}` error shape as every other failure.
pub async fn mcp_call_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CallToolRequest>, JsonRejection>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorBody>)> {
    let Json(request) =
        payload.map_err(|rejection| (rejection.status(), Json(ErrorBody::new(rejection.body_text()))))?;

    if request.tool.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Tool name must not be empty")),
        ));
    }

    tracing::info!(tool = %request.tool, "Received /mcp_call request");

    let result = state
        .dispatcher
        .dispatch(&request.tool, Value::Object(request.arguments))
        .await;

    result.map(Json).map_err(error_response)
}

/// GET /routes — diagnostic listing of the boundary surface.
pub async fn routes_handler() -> Json<RoutesResponse> {
    let route = |path: &str, methods: &[&str]| RouteInfo {
        path: path.to_string(),
        methods: methods.iter().map(|m| m.to_string()).collect(),
    };

    Json(RoutesResponse {
        routes: vec![
            route("/", &["GET"]),
            route("/health", &["GET"]),
            route("/metrics", &["GET"]),
            route("/routes", &["GET"]),
            route("/mcp_call", &["POST"]),
        ],
    })
}

/// GET / — root status payload.
pub async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": "MCP billing bridge running",
    }))
}

/// GET /health — fixed health payload.
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "healthy" })),
    )
}

/// GET /metrics — Prometheus render.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}

/// Map a dispatch failure to its caller-visible category. Internal faults
/// are logged and surfaced opaquely.
fn error_response(e: ToolError) -> (StatusCode, Json<ErrorBody>) {
    match e {
        ToolError::UnknownTool(_) => (StatusCode::BAD_REQUEST, Json(ErrorBody::new(e.to_string()))),
        ToolError::InvalidArguments(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorBody::new(e.to_string())),
        ),
        ToolError::NotFound(msg) => (StatusCode::NOT_FOUND, Json(ErrorBody::new(msg))),
        ToolError::Invocation(msg) => (StatusCode::BAD_REQUEST, Json(ErrorBody::new(msg))),
        ToolError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal error during tool dispatch");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Internal server error")),
            )
        }
    }
}
