//! Mock model implementations for orchestrator tests.
//!
//! - [`ScriptedModel`] - Returns a queued sequence of replies or
//!   failures, recording every request it receives.
//! - [`FailingModel`] - Always fails with a configured error.
//!
//! For production completions use the `openai-model` crate instead.
//!
//! # Example
//!
//! ```rust
//! use convo_core::{ChatModel, Message, ModelRequest, ModelResponse};
//! use mock_model::ScriptedModel;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let model = ScriptedModel::new(vec![ModelResponse::text("hello!")]);
//!     let request = ModelRequest::text_only(vec![Message::user("hi")]);
//!     let response = model.complete(request).await.unwrap();
//!     assert_eq!(response.content, "hello!");
//! }
//! ```

mod failing;
mod scripted;

pub use failing::{FailingModel, FailureMode};
pub use scripted::{ScriptedModel, ScriptedStep};

// Re-export core types for convenience
pub use convo_core::{ChatModel, ModelError, ModelRequest, ModelResponse};
