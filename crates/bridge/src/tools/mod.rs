pub mod handlers;
pub mod registry;

pub use registry::{ToolHandler, ToolHandlerContext, ToolRegistry};

/// Failure of a single tool invocation, local or remote.
///
/// Categories map one-to-one onto boundary status codes, so callers can
/// branch on "fix request", "no such record" or "retry".
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    NotFound(String),

    /// Business failure reported by the tool itself (including remote
    /// results flagged as errors).
    #[error("{0}")]
    Invocation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
