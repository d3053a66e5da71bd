//! Tool invocation outcomes.
//!
//! Every tool invocation resolves to a [`ToolOutcome`], which is always
//! serialized into a tool message's content and never thrown across the
//! orchestration boundary: the model sees failures as normal tool
//! results and decides how to respond.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Classification of a failed tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolErrorKind {
    /// The raw arguments could not be parsed; the tool was never invoked.
    ArgumentParseError,
    /// No capability is registered under the requested name.
    ToolNotFound,
    /// The capability ran and reported an error.
    ToolExecutionError,
}

/// The tagged result of one tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// The tool ran and produced a payload (shape is tool-specific).
    Success(Value),
    /// The invocation failed; the kind and message are surfaced to the
    /// model in the tool message content.
    Failure {
        error: ToolErrorKind,
        message: String,
    },
}

impl ToolOutcome {
    /// Create a success outcome.
    pub fn success(payload: Value) -> Self {
        Self::Success(payload)
    }

    /// Create a failure outcome.
    pub fn failure(error: ToolErrorKind, message: impl Into<String>) -> Self {
        Self::Failure {
            error,
            message: message.into(),
        }
    }

    /// Whether this outcome is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Serialize the outcome into tool message content.
    ///
    /// Success merges `"success": true` into the payload object; a
    /// non-object payload is wrapped under `"result"`. Failure always
    /// serializes `{"success": false, "error": ..., "message": ...}`.
    pub fn to_content(&self) -> String {
        let value = match self {
            Self::Success(Value::Object(payload)) => {
                let mut object = payload.clone();
                object.insert("success".to_string(), Value::Bool(true));
                Value::Object(object)
            }
            Self::Success(payload) => json!({ "success": true, "result": payload }),
            Self::Failure { error, message } => json!({
                "success": false,
                "error": error,
                "message": message,
            }),
        };
        value.to_string()
    }
}
