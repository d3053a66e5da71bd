//! History validation and repair.
//!
//! A history is well-formed when:
//!
//! - every tool message answers a call id declared by a strictly
//!   earlier assistant message,
//! - every assistant tool-call entry carries a non-empty id and name,
//! - system and user messages carry no tool fields.
//!
//! [`validate`] never fails: it returns the largest well-formed
//! prefix-compatible subsequence of its input, without inventing data.
//! Validity is decided by message position alone; timestamps play no
//! part in before/after ordering.

use std::collections::HashMap;

use crate::message::{Message, Role};

/// Result of validating a history.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    /// The well-formed history.
    pub clean: Vec<Message>,
    /// Whether the output differs from the input. Callers treat this as
    /// a signal to persist the corrected history, not as an error.
    pub was_repaired: bool,
}

/// Validate a history, repairing it when malformed.
///
/// Repair policy:
///
/// - system/user messages are kept with any stray tool fields dropped;
/// - assistant messages are kept, stripped of malformed tool-call
///   entries (an emptied list becomes a plain assistant message);
/// - tool messages are kept only when their call id was declared by an
///   earlier-positioned assistant message;
/// - when tool messages exist but no assistant message anywhere declares
///   a valid call id, the pairing was never captured correctly and the
///   whole assistant/tool trace is unrecoverable: only system and user
///   messages survive. Partial reconstruction would feed the model an
///   inconsistent function-calling trace, which degrades behavior more
///   than losing assistant turns.
pub fn validate(history: &[Message]) -> Validated {
    // Map every valid declared call id to the index of the assistant
    // message that declared it. First declaration wins.
    let mut declared: HashMap<&str, usize> = HashMap::new();
    let mut has_tool_messages = false;
    for (index, message) in history.iter().enumerate() {
        if message.role == Role::Tool {
            has_tool_messages = true;
        }
        for id in message.declared_call_ids() {
            declared.entry(id).or_insert(index);
        }
    }

    let clean = if has_tool_messages && declared.is_empty() {
        // Corruption escape hatch: tool results with no possible
        // matching declaration.
        history
            .iter()
            .filter(|message| matches!(message.role, Role::System | Role::User))
            .map(sanitize)
            .collect()
    } else {
        history
            .iter()
            .enumerate()
            .filter_map(|(index, message)| match message.role {
                Role::System | Role::User | Role::Assistant => Some(sanitize(message)),
                Role::Tool => {
                    let answered = message
                        .tool_call_id
                        .as_deref()
                        .and_then(|id| declared.get(id))
                        .is_some_and(|declaring_index| *declaring_index < index);
                    answered.then(|| sanitize(message))
                }
            })
            .collect::<Vec<_>>()
    };

    let was_repaired = clean != history;
    Validated { clean, was_repaired }
}

/// Reduce a message to its role's legal field shape.
fn sanitize(message: &Message) -> Message {
    let mut clean = message.clone();
    match clean.role {
        Role::System | Role::User => {
            clean.tool_calls = None;
            clean.tool_call_id = None;
            clean.name = None;
        }
        Role::Assistant => {
            clean.tool_call_id = None;
            clean.name = None;
            clean.tool_calls = clean.tool_calls.and_then(|calls| {
                let kept: Vec<_> = calls.into_iter().filter(|c| c.is_well_formed()).collect();
                if kept.is_empty() { None } else { Some(kept) }
            });
        }
        Role::Tool => {
            clean.tool_calls = None;
        }
    }
    clean
}
