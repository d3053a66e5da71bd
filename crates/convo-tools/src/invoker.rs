//! Tool invoker: resolves and runs one tool call, always producing a
//! well-formed tool message.

use std::collections::HashMap;

use convo_core::{Message, SessionMemory, ToolCall, ToolErrorKind, ToolOutcome};
use serde_json::Value;
use tracing::{debug, warn};

use crate::capability::ToolArgs;
use crate::registry::ToolRegistry;

/// Executes tool calls against a registry.
///
/// The invoker is the error boundary between capability code and the
/// orchestration loop: parse failures, unknown names, and capability
/// errors all become failure outcomes serialized into the returned tool
/// message, never errors the caller must handle. The invoker imposes no
/// timeout of its own; bounding network I/O is the capability's job.
pub struct ToolInvoker<'a> {
    registry: &'a ToolRegistry,
}

impl<'a> ToolInvoker<'a> {
    /// Create an invoker over a registry.
    pub fn new(registry: &'a ToolRegistry) -> Self {
        Self { registry }
    }

    /// Invoke one tool call and return the resulting tool message.
    ///
    /// A call with unparseable arguments is never forwarded to the
    /// capability: invoking a tool with guessed or partial arguments is
    /// more dangerous than a clearly failed call the model can retry.
    /// Memory writes a failing capability already made are kept.
    pub async fn invoke(&self, call: &ToolCall, memory: SessionMemory) -> Message {
        let name = &call.function.name;
        debug!("Invoking tool '{}' (call id {})", name, call.id);

        let outcome = match parse_arguments(&call.function.arguments) {
            Err(reason) => {
                warn!("Tool '{}' argument parse failed: {}", name, reason);
                ToolOutcome::failure(ToolErrorKind::ArgumentParseError, reason)
            }
            Ok(params) => match self.registry.resolve(name) {
                None => {
                    warn!("Tool '{}' not found in registry", name);
                    ToolOutcome::failure(
                        ToolErrorKind::ToolNotFound,
                        format!("No tool named '{}' is registered", name),
                    )
                }
                Some(capability) => {
                    match capability.invoke(ToolArgs::new(params, memory)).await {
                        Ok(payload) => ToolOutcome::success(payload),
                        Err(error) => {
                            warn!("Tool '{}' execution failed: {}", name, error);
                            ToolOutcome::failure(
                                ToolErrorKind::ToolExecutionError,
                                error.to_string(),
                            )
                        }
                    }
                }
            },
        };

        debug!(
            "Tool '{}' resolved: success={}",
            name,
            outcome.is_success()
        );
        Message::tool(&call.id, name, outcome.to_content())
    }
}

/// Parse a raw arguments string into a parameters map.
///
/// An empty or whitespace-only string means no arguments. Anything else
/// must parse to a JSON object; the error string becomes the failure
/// message.
fn parse_arguments(raw: &str) -> Result<HashMap<String, Value>, String> {
    if raw.trim().is_empty() {
        return Ok(HashMap::new());
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|e| format!("arguments are not valid JSON: {}", e))?;

    match value {
        Value::Object(object) => Ok(object.into_iter().collect()),
        other => Err(format!(
            "arguments must be a JSON object, got {}",
            type_name(&other)
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
