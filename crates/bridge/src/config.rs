use std::time::Duration;

/// Bridge configuration, resolved from the environment with defaults.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Port for the HTTP boundary (BRIDGE_PORT, default 8000).
    pub port: u16,
    /// SQLite connection string (DATABASE_URL).
    pub database_url: String,
    /// Connection pool size (BRIDGE_DB_MAX_CONNECTIONS, default 5).
    pub max_connections: u32,
    /// Remote MCP endpoint (MCP_TRANSPORT_URL). Unset falls back to the
    /// conventional local transport; set to an empty string to disable the
    /// remote path entirely.
    pub mcp_transport_url: Option<String>,
    /// Deadline for one remote call (MCP_CALL_TIMEOUT_MS, default 10000).
    pub remote_timeout: Duration,
    /// Consecutive remote failures before the breaker opens
    /// (MCP_BREAKER_THRESHOLD). 0 disables the breaker, which is the
    /// default: every request re-attempts the remote path.
    pub breaker_threshold: u32,
    /// Breaker cooldown in seconds (MCP_BREAKER_COOLDOWN, default 60).
    pub breaker_cooldown_secs: u64,
    /// Insert the demo invoice set at startup (BRIDGE_SEED_DEMO=1).
    pub seed_demo: bool,
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        let port: u16 = std::env::var("BRIDGE_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://billing.db?mode=rwc".into());

        let max_connections: u32 = std::env::var("BRIDGE_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let mcp_transport_url = match std::env::var("MCP_TRANSPORT_URL") {
            Ok(url) if url.trim().is_empty() => None,
            Ok(url) => Some(url.trim().to_string()),
            Err(_) => Some("http://127.0.0.1:9000/mcp".into()),
        };

        let remote_timeout = Duration::from_millis(
            std::env::var("MCP_CALL_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10_000),
        );

        let breaker_threshold: u32 = std::env::var("MCP_BREAKER_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        let breaker_cooldown_secs: u64 = std::env::var("MCP_BREAKER_COOLDOWN")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        let seed_demo = std::env::var("BRIDGE_SEED_DEMO").is_ok_and(|v| v == "1" || v == "true");

        Self {
            port,
            database_url,
            max_connections,
            mcp_transport_url,
            remote_timeout,
            breaker_threshold,
            breaker_cooldown_secs,
            seed_demo,
        }
    }
}
