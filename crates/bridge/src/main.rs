use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;

use billing_common::BillingError;

use billing_bridge::breaker::CircuitBreaker;
use billing_bridge::config::BridgeConfig;
use billing_bridge::dispatch::{RemoteEndpoint, ToolDispatcher};
use billing_bridge::routes::{self, AppState};
use billing_bridge::store::StoreClient;
use billing_bridge::tools::handlers::register_billing_tools;
use billing_bridge::tools::{ToolHandlerContext, ToolRegistry};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Billing bridge starting");

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Billing bridge failed — refusing to run");
        std::process::exit(1);
    }
}

async fn run() -> billing_common::Result<()> {
    let config = BridgeConfig::from_env();

    // Install Prometheus metrics recorder.
    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| BillingError::Config(format!("Prometheus recorder: {}", e)))?;

    // SQLite
    let store = StoreClient::connect(&config.database_url, config.max_connections).await?;
    store.migrate().await?;

    if config.seed_demo {
        store.seed_demo().await?;
        tracing::info!("Demo invoices seeded");
    }

    tracing::info!("Store connected and migrated");

    // Local tool registry — built once, no runtime registration.
    let mut registry = ToolRegistry::new(ToolHandlerContext {
        store: Arc::new(store),
    });
    register_billing_tools(&mut registry);
    tracing::info!(tools = ?registry.tool_names(), "Local tool registry built");

    let remote = config.mcp_transport_url.clone().map(|url| {
        tracing::info!(endpoint = %url, "Remote MCP transport configured");
        RemoteEndpoint {
            url,
            timeout: config.remote_timeout,
            breaker: (config.breaker_threshold > 0).then(|| {
                CircuitBreaker::new(
                    "mcp_transport",
                    config.breaker_threshold,
                    config.breaker_cooldown_secs,
                )
            }),
        }
    });
    if remote.is_none() {
        tracing::info!("No remote MCP transport configured, all calls execute locally");
    }

    let state = Arc::new(AppState {
        dispatcher: ToolDispatcher::new(registry, remote),
        metrics_handle,
    });

    let app = Router::new()
        .route("/", get(routes::root_handler))
        .route("/health", get(routes::health_handler))
        .route("/metrics", get(routes::metrics_handler))
        .route("/routes", get(routes::routes_handler))
        .route("/mcp_call", post(routes::mcp_call_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .map_err(|e| BillingError::Config(format!("Bind port {}: {}", config.port, e)))?;

    tracing::info!(port = config.port, "Billing bridge listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| BillingError::Internal(format!("HTTP server error: {}", e)))
}
