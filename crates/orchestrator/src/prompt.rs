//! System prompt assembly.
//!
//! The system prompt is rebuilt for every model call from the assistant
//! role's base instructions plus a rendering of the session memory.
//! Memory values are truncated so one oversized entry cannot crowd out
//! the instructions.

use std::collections::BTreeMap;

use serde_json::Value;

/// Maximum rendered length of a single memory value.
const MAX_MEMORY_VALUE_LEN: usize = 300;

const CUSTOMER_INSTRUCTIONS: &str = "You are a helpful assistant for this service. \
Answer questions directly and concisely. \
When a task requires looking something up or changing state, call the matching tool \
instead of guessing. Never fabricate tool results.";

const ADMIN_INSTRUCTIONS: &str = "You are an operations assistant for service staff. \
Be precise and terse. Use tools for every lookup or mutation; report exactly what the \
tool returned, including failures.";

/// The persona a session runs under. Selects the base instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssistantRole {
    /// Customer-facing assistant.
    #[default]
    Customer,
    /// Staff-facing operations assistant.
    Admin,
}

impl AssistantRole {
    fn instructions(self) -> &'static str {
        match self {
            Self::Customer => CUSTOMER_INSTRUCTIONS,
            Self::Admin => ADMIN_INSTRUCTIONS,
        }
    }
}

/// Build the system prompt for one model call.
///
/// When memory is non-empty a `[MEMORY]...[END MEMORY]` section is
/// appended, one `key: value` line per entry in key order, values
/// truncated.
pub fn build_system_prompt(role: AssistantRole, memory: &BTreeMap<String, Value>) -> String {
    let mut prompt = role.instructions().to_string();

    if !memory.is_empty() {
        prompt.push_str("\n\n[MEMORY]\nFacts stored earlier in this session:\n");
        for (key, value) in memory {
            let rendered = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            prompt.push_str(&format!("- {}: {}\n", key, truncate_text(&rendered, MAX_MEMORY_VALUE_LEN)));
        }
        prompt.push_str("[END MEMORY]");
    }

    prompt
}

/// Truncate text to a maximum length, appending an ellipsis marker.
fn truncate_text(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    // Cut on a char boundary at or below the limit.
    let mut cut = max_len;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &text[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_memory_omits_section() {
        let prompt = build_system_prompt(AssistantRole::Customer, &BTreeMap::new());
        assert!(!prompt.contains("[MEMORY]"));
    }

    #[test]
    fn test_memory_rendered_in_key_order() {
        let mut memory = BTreeMap::new();
        memory.insert("zebra".to_string(), json!("last"));
        memory.insert("apple".to_string(), json!(7));

        let prompt = build_system_prompt(AssistantRole::Customer, &memory);
        let apple = prompt.find("- apple: 7").unwrap();
        let zebra = prompt.find("- zebra: last").unwrap();
        assert!(apple < zebra);
    }

    #[test]
    fn test_long_values_truncated() {
        let mut memory = BTreeMap::new();
        memory.insert("blob".to_string(), json!("x".repeat(1000)));

        let prompt = build_system_prompt(AssistantRole::Admin, &memory);
        let line = prompt.lines().find(|l| l.starts_with("- blob:")).unwrap();
        assert!(line.len() < 400);
        assert!(line.ends_with("..."));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "é".repeat(200);
        let truncated = truncate_text(&text, 301);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_roles_have_distinct_instructions() {
        let customer = build_system_prompt(AssistantRole::Customer, &BTreeMap::new());
        let admin = build_system_prompt(AssistantRole::Admin, &BTreeMap::new());
        assert_ne!(customer, admin);
    }
}
