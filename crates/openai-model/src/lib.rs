//! OpenAI-compatible chat completions backend.
//!
//! Provides [`OpenAiModel`], a [`ChatModel`](convo_core::ChatModel)
//! implementation for any service speaking the OpenAI chat completions
//! protocol, configured via [`OpenAiConfig`].

pub mod api_types;
pub mod client;
pub mod config;

pub use client::OpenAiModel;
pub use config::{OpenAiConfig, OpenAiConfigBuilder};

// Re-export the core trait so callers need only this crate.
pub use convo_core::{ChatModel, ModelError, ModelRequest, ModelResponse};
