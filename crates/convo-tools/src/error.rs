//! Error types for tool capabilities.

use thiserror::Error;

/// Errors a capability can report from `invoke`.
///
/// These never cross the orchestration boundary: the invoker converts
/// them into failure outcomes in the tool message content.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Missing required parameter.
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// Invalid parameter value.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// JSON handling failed inside the capability.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General execution error.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}
