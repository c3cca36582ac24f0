use thiserror::Error;

/// Top-level error type for billing bridge operations.
#[derive(Debug, Error)]
pub enum BillingError {
    // --- Hard dependency errors (system cannot function) ---
    #[error("Database error: {0}")]
    Database(String),

    // --- Soft dependency errors (system degrades to local execution) ---
    #[error("MCP transport error: {0}")]
    McpTransport(String),

    // --- Operational errors ---
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("{0}")]
    Internal(String),
}

impl BillingError {
    /// Whether this error comes from the remote MCP transport. Transport
    /// failures are recovered by local fallback and never escalate.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::McpTransport(_) | Self::Timeout(_))
    }
}

/// Result type alias for billing bridge operations.
pub type Result<T> = std::result::Result<T, BillingError>;
