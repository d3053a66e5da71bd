//! Tool layer for the turn-orchestration engine.
//!
//! This crate provides:
//!
//! - [`ToolCapability`] - The contract a tool must satisfy to
//!   participate in orchestration.
//! - [`ToolRegistry`] - Name-to-capability lookup and model-facing
//!   declarations.
//! - [`ToolInvoker`] - Executes one tool call and always produces a
//!   well-formed tool message, converting every failure into a
//!   structured outcome.
//! - Built-in session-memory tools ([`RememberNote`], [`RecallNote`]).
//!
//! # Example
//!
//! ```rust
//! use convo_core::{SessionMemory, ToolCall};
//! use convo_tools::{session_toolset, ToolInvoker};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let registry = session_toolset();
//!     let invoker = ToolInvoker::new(&registry);
//!
//!     let call = ToolCall::new("c1", "remember_note", r#"{"key":"k","value":1}"#);
//!     let message = invoker.invoke(&call, SessionMemory::new()).await;
//!     assert!(message.content.contains("\"success\":true"));
//! }
//! ```

mod capability;
mod error;
mod invoker;
mod registry;
pub mod tools;

pub use capability::{ToolArgs, ToolCapability};
pub use error::ToolError;
pub use invoker::ToolInvoker;
pub use registry::ToolRegistry;
pub use tools::{RecallNote, RememberNote};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

/// Create a registry with the built-in session-memory tools registered.
pub fn session_toolset() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(RememberNote::new());
    registry.register(RecallNote::new());
    registry
}
