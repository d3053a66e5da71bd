//! The model backend contract.
//!
//! Backends (an OpenAI-compatible HTTP client in production, scripted
//! models in tests) implement [`ChatModel`]. The orchestrator sends a
//! [`ModelRequest`] and receives a [`ModelResponse`] whose tool calls
//! are raw wire values, normalized by the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::message::Message;

/// Tool choice value for turns where the model may pick tools freely.
pub const TOOL_CHOICE_AUTO: &str = "auto";

/// Default parameters schema for capabilities that declare none.
pub fn empty_object_schema() -> Value {
    json!({ "type": "object", "properties": {}, "required": [] })
}

/// The function part of a tool declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    /// Tool name the model will call.
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// JSON Schema for the arguments object.
    pub parameters: Value,
}

/// A tool exposed to the model as a callable function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    /// Declaration type, always `"function"`.
    #[serde(rename = "type")]
    pub declaration_type: String,
    /// The declared function.
    pub function: FunctionDeclaration,
}

impl ToolDeclaration {
    /// Declare a function tool. A `None` schema defaults to an empty
    /// object schema.
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Option<Value>,
    ) -> Self {
        Self {
            declaration_type: "function".to_string(),
            function: FunctionDeclaration {
                name: name.into(),
                description: description.into(),
                parameters: parameters.unwrap_or_else(empty_object_schema),
            },
        }
    }
}

/// One request to a model backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    /// The full prompt: system message, history window, user input, and
    /// (on the final-answer call) the assistant/tool tail.
    pub messages: Vec<Message>,
    /// Tools the model may call. Empty on the final-answer call.
    pub tools: Vec<ToolDeclaration>,
    /// Tool choice mode; `Some("auto")` whenever tools are declared.
    pub tool_choice: Option<String>,
}

impl ModelRequest {
    /// Build a request with tool declarations and `tool_choice = auto`.
    pub fn with_tools(messages: Vec<Message>, tools: Vec<ToolDeclaration>) -> Self {
        let tool_choice = (!tools.is_empty()).then(|| TOOL_CHOICE_AUTO.to_string());
        Self {
            messages,
            tools,
            tool_choice,
        }
    }

    /// Build a text-only request: the model must answer, not call tools.
    pub fn text_only(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            tool_choice: None,
        }
    }
}

/// One response from a model backend.
#[derive(Debug, Clone, Default)]
pub struct ModelResponse {
    /// Assistant text. May be empty when the model only calls tools.
    pub content: String,
    /// Raw tool-call wire values, normalized by the orchestrator.
    pub tool_calls: Vec<Value>,
}

impl ModelResponse {
    /// A plain text response.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// A response carrying raw tool-call values.
    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<Value>) -> Self {
        Self {
            content: content.into(),
            tool_calls,
        }
    }
}

/// Errors from a model backend.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The backend is misconfigured.
    #[error("model configuration error: {0}")]
    Configuration(String),

    /// The request never produced a provider response.
    #[error("model network error: {0}")]
    Network(String),

    /// The provider returned a non-success status.
    #[error("provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    /// The provider response could not be interpreted.
    #[error("invalid model response: {0}")]
    InvalidResponse(String),
}

impl ModelError {
    /// Whether this error is the provider rejecting the message history
    /// shape (a tool-call/tool-sequence violation). Drives the
    /// orchestrator's recovery path: rebuild a minimal prompt and retry
    /// once.
    pub fn is_history_rejection(&self) -> bool {
        match self {
            Self::Provider { status, message } if *status == 400 => {
                let lowered = message.to_ascii_lowercase();
                lowered.contains("tool_call")
                    || lowered.contains("tool call")
                    || (lowered.contains("tool") && lowered.contains("message"))
            }
            _ => false,
        }
    }
}

/// A chat model backend.
///
/// Object-safe; the orchestrator holds a `dyn ChatModel`. A single
/// `complete` call is the only point where provider latency or failure
/// can occur, and it is never retried by the backend itself.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one completion.
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;

    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;
}
