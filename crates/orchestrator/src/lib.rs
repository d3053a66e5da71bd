//! Turn orchestration for tool-calling conversations.
//!
//! Ties the pieces together: session lookup, history validation, the
//! model/tool round trip, and committing the finished turn. The model
//! backend is any [`ChatModel`](convo_core::ChatModel); tools come from
//! a [`ToolRegistry`](convo_tools::ToolRegistry).
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use convo_tools::session_toolset;
//! use openai_model::OpenAiModel;
//! use orchestrator::TurnOrchestrator;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let model = Arc::new(OpenAiModel::from_env()?);
//! let orchestrator = TurnOrchestrator::new(model, session_toolset());
//!
//! let output = orchestrator.run_turn("session-1", "hello").await?;
//! println!("{}", output.output_text);
//! # Ok(())
//! # }
//! ```

mod error;
mod orchestrator;
mod prompt;
mod session;

pub use error::OrchestratorError;
pub use orchestrator::{TurnOrchestrator, TurnOptions, TurnOutput, FALLBACK_APOLOGY};
pub use prompt::{build_system_prompt, AssistantRole};
pub use session::{Session, SessionRegistry};
