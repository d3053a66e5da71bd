//! Session-memory note tools.
//!
//! These capabilities expose the memory side channel to the model: a
//! value remembered in one turn (or by an earlier tool call in the same
//! turn) can be recalled later, which is how the assistant resolves
//! back-references like "book the second one" against a prior lookup.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::capability::{ToolArgs, ToolCapability};
use crate::error::ToolError;

/// Write a value into session memory under a key.
#[derive(Debug, Clone, Default)]
pub struct RememberNote;

impl RememberNote {
    /// Create the capability.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolCapability for RememberNote {
    fn name(&self) -> &str {
        "remember_note"
    }

    fn description(&self) -> &str {
        "Store a value in session memory under a key, replacing any previous value."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "key": { "type": "string", "description": "Memory key to write" },
                "value": { "description": "Value to store (any JSON)" }
            },
            "required": ["key", "value"]
        })
    }

    async fn invoke(&self, args: ToolArgs) -> Result<Value, ToolError> {
        let key = args.require_string("key")?;
        let value = args.require_value("value")?;
        let replaced = args.memory.insert(key.clone(), value).await.is_some();
        Ok(json!({ "stored": key, "replaced": replaced }))
    }
}

/// Read a value from session memory.
#[derive(Debug, Clone, Default)]
pub struct RecallNote;

impl RecallNote {
    /// Create the capability.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolCapability for RecallNote {
    fn name(&self) -> &str {
        "recall_note"
    }

    fn description(&self) -> &str {
        "Read a value previously stored in session memory. Reports found=false for unknown keys."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "key": { "type": "string", "description": "Memory key to read" }
            },
            "required": ["key"]
        })
    }

    async fn invoke(&self, args: ToolArgs) -> Result<Value, ToolError> {
        let key = args.require_string("key")?;
        Ok(match args.memory.get(&key).await {
            Some(value) => json!({ "key": key, "found": true, "value": value }),
            None => json!({ "key": key, "found": false }),
        })
    }
}
