//! Conversation message grammar and tool-call normalization.
//!
//! Messages follow the OpenAI-compatible chat shape on the wire and in
//! persisted histories. Tool calls are stored in one normalized form
//! (`{id, function: {name, arguments: string}}`); the two wire shapes
//! providers have historically emitted are normalized on ingestion via
//! [`ToolCall::from_wire`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The role of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instruction, first in every prompt.
    System,
    /// End-user input.
    User,
    /// Model output, optionally carrying tool calls.
    Assistant,
    /// Result of one tool invocation, paired to an assistant tool call.
    Tool,
}

/// The function part of a normalized tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallFunction {
    /// Name of the tool to invoke.
    pub name: String,
    /// Raw arguments, always serialized as a JSON string. Parsed back
    /// to an object only at invocation time.
    pub arguments: String,
}

/// A model-issued request to invoke a named tool.
///
/// This is the normalized internal form. Wire values from providers may
/// arrive in two shapes and are converted via [`ToolCall::from_wire`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id, referenced by the matching tool message.
    pub id: String,
    /// The requested function and its raw arguments.
    pub function: ToolCallFunction,
}

impl ToolCall {
    /// Create a normalized tool call.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            function: ToolCallFunction {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    /// Whether this call carries a non-empty id and name.
    pub fn is_well_formed(&self) -> bool {
        !self.id.is_empty() && !self.function.name.is_empty()
    }

    /// Normalize a raw wire value into a [`ToolCall`].
    ///
    /// Accepts both shapes seen from providers:
    ///
    /// - `{ "id": ..., "function": { "name": ..., "arguments": string|object } }`
    /// - `{ "id": ..., "name": ..., "args": string|object }` (legacy)
    ///
    /// Returns `None` when the value cannot be normalized; callers drop
    /// the call rather than failing the turn.
    pub fn from_wire(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let id = object.get("id")?.as_str()?;

        let (name, raw_arguments) = if let Some(function) = object.get("function") {
            let function = function.as_object()?;
            let name = function.get("name")?.as_str()?;
            (name, function.get("arguments"))
        } else {
            let name = object.get("name")?.as_str()?;
            (name, object.get("args"))
        };

        if id.is_empty() || name.is_empty() {
            return None;
        }

        let arguments = match raw_arguments {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            // Object (or any other structured) arguments are coerced to
            // the canonical string form.
            Some(other) => other.to_string(),
        };

        Some(Self::new(id, name, arguments))
    }
}

/// A single message in a conversation history.
///
/// Serialized field names match the wire contract: `tool_calls` on
/// assistant messages, `tool_call_id` and `name` on tool messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message role.
    pub role: Role,
    /// Text content. May be empty for an assistant message that only
    /// carries tool calls.
    #[serde(default)]
    pub content: String,
    /// Tool calls requested by an assistant message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// The assistant-declared call id this tool message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Tool name, present on tool messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a plain assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    /// Create an assistant message carrying tool calls.
    ///
    /// Content may be empty; an empty call list is stored as `None`.
    pub fn assistant_with_tool_calls(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: if calls.is_empty() { None } else { Some(calls) },
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a tool-result message answering the given call id.
    pub fn tool(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
        }
    }

    /// The ids this assistant message declares, skipping malformed entries.
    pub fn declared_call_ids(&self) -> Vec<&str> {
        match (&self.role, &self.tool_calls) {
            (Role::Assistant, Some(calls)) => calls
                .iter()
                .filter(|call| call.is_well_formed())
                .map(|call| call.id.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }
}
