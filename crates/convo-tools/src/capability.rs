//! Tool capability trait and invocation arguments.

use std::collections::HashMap;

use async_trait::async_trait;
use convo_core::{empty_object_schema, SessionMemory};
use serde_json::Value;

use crate::error::ToolError;

/// Arguments passed to a capability for one invocation.
///
/// Parameters are the parsed arguments object from the model's tool
/// call. The memory handle gives the capability access to the session's
/// side channel; whatever it writes there persists even if the
/// invocation ultimately fails.
#[derive(Clone)]
pub struct ToolArgs {
    /// Parsed parameters as key-value pairs.
    pub params: HashMap<String, Value>,
    /// The session's memory side channel.
    pub memory: SessionMemory,
}

impl ToolArgs {
    /// Create arguments for the given session memory.
    pub fn new(params: HashMap<String, Value>, memory: SessionMemory) -> Self {
        Self { params, memory }
    }

    /// Get an optional string parameter.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.params.get(key)?.as_str().map(|s| s.to_string())
    }

    /// Get a required string parameter.
    pub fn require_string(&self, key: &str) -> Result<String, ToolError> {
        self.params
            .get(key)
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ToolError::InvalidParameter {
                name: key.to_string(),
                reason: "expected string".to_string(),
            })
    }

    /// Get a required raw value parameter.
    pub fn require_value(&self, key: &str) -> Result<Value, ToolError> {
        self.params
            .get(key)
            .cloned()
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))
    }

    /// Get a required integer parameter.
    pub fn require_i64(&self, key: &str) -> Result<i64, ToolError> {
        self.params
            .get(key)
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?
            .as_i64()
            .ok_or_else(|| ToolError::InvalidParameter {
                name: key.to_string(),
                reason: "expected integer".to_string(),
            })
    }

    /// Get an optional boolean parameter with a default.
    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.params
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(default)
    }
}

/// A named capability the model can invoke.
///
/// One unified interface: every capability declares its input schema
/// here, and legacy shapes are adapted at registration time rather than
/// probed at call time. `invoke` returns the success payload; errors
/// are mapped to failure outcomes by the invoker, the error boundary
/// between capability code and the orchestration loop.
#[async_trait]
pub trait ToolCapability: Send + Sync {
    /// The capability's unique name (used for dispatch and declaration).
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema for the arguments object.
    fn input_schema(&self) -> Value {
        empty_object_schema()
    }

    /// Run the capability. Memory writes made before an `Err` persist.
    async fn invoke(&self, args: ToolArgs) -> Result<Value, ToolError>;
}
