//! Orchestrator error types.

use convo_core::ModelError;
use thiserror::Error;

/// Errors surfaced by [`TurnOrchestrator::run_turn`](crate::TurnOrchestrator::run_turn).
///
/// Tool failures never appear here; they become structured failure
/// payloads inside the conversation. Only a failure to obtain any model
/// response at all aborts a turn.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The model backend failed before any part of the turn was applied.
    #[error("model invocation failed: {0}")]
    Model(#[from] ModelError),
}
