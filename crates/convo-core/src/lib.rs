//! Core types and contracts for the turn-orchestration engine.
//!
//! This crate provides the shared vocabulary used by the orchestrator,
//! the tool layer, and the model backends:
//!
//! - [`Message`] / [`ToolCall`] - The conversation grammar and the
//!   normalized tool-call form.
//! - [`validate`] - Repair of malformed histories into the largest
//!   well-formed prefix-compatible subsequence.
//! - [`ChatModel`] - The trait every model backend implements.
//! - [`ToolOutcome`] - The tagged result every tool invocation resolves to.
//! - [`ConversationContext`] / [`ContextStore`] - Per-session state and
//!   the persistence collaborator contract.
//!
//! # Example
//!
//! ```rust
//! use convo_core::{validate, Message};
//!
//! let history = vec![Message::user("hello"), Message::assistant("hi!")];
//! let validated = validate(&history);
//! assert!(!validated.was_repaired);
//! assert_eq!(validated.clean.len(), 2);
//! ```

mod context;
mod message;
mod model;
mod outcome;
mod validator;

pub use context::{
    ContextStore, ConversationContext, InMemoryContextStore, PersistedContext, SessionMemory,
    StoreError,
};
pub use message::{Message, Role, ToolCall, ToolCallFunction};
pub use model::{
    empty_object_schema, ChatModel, FunctionDeclaration, ModelError, ModelRequest, ModelResponse,
    ToolDeclaration, TOOL_CHOICE_AUTO,
};
pub use outcome::{ToolErrorKind, ToolOutcome};
pub use validator::{validate, Validated};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
