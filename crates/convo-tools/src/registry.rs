//! Tool registry: name to capability lookup and model-facing declarations.

use std::collections::HashMap;
use std::sync::Arc;

use convo_core::ToolDeclaration;
use tracing::info;

use crate::capability::ToolCapability;

/// Registry mapping canonical tool names to capabilities.
///
/// A missing name is not fatal to a turn: the invoker converts it into
/// a `ToolNotFound` failure outcome so the model can see the failure
/// and adjust.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolCapability>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability. A same-named capability is replaced.
    pub fn register<T: ToolCapability + 'static>(&mut self, capability: T) {
        let name = capability.name().to_string();
        info!("Registering tool: {}", name);
        self.tools.insert(name, Arc::new(capability));
    }

    /// Register a shared capability.
    pub fn register_shared(&mut self, capability: Arc<dyn ToolCapability>) {
        let name = capability.name().to_string();
        info!("Registering tool: {}", name);
        self.tools.insert(name, capability);
    }

    /// Resolve a capability by name.
    pub fn resolve(&self, name: &str) -> Option<&Arc<dyn ToolCapability>> {
        self.tools.get(name)
    }

    /// Whether a capability is registered.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names.
    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Build the model-facing declaration for every registered
    /// capability.
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        let mut declarations: Vec<ToolDeclaration> = self
            .tools
            .values()
            .map(|capability| {
                ToolDeclaration::function(
                    capability.name(),
                    capability.description(),
                    Some(capability.input_schema()),
                )
            })
            .collect();
        // Stable declaration order keeps prompts reproducible.
        declarations.sort_by(|a, b| a.function.name.cmp(&b.function.name));
        declarations
    }
}
