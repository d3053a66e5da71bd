//! The turn executor.
//!
//! [`TurnOrchestrator::run_turn`] drives one full turn: validate the
//! stored history, call the model with tools declared, execute any tool
//! calls sequentially, ask the model for the final answer, and commit
//! the whole trace back to the session. The session context stays
//! locked for the duration, so turns within a session never interleave.

use std::sync::Arc;

use convo_core::{validate, ChatModel, Message, ModelRequest, Role, SessionMemory, ToolCall};
use convo_tools::{ToolInvoker, ToolRegistry};
use tracing::{debug, info, warn};

use crate::error::OrchestratorError;
use crate::prompt::{build_system_prompt, AssistantRole};
use crate::session::SessionRegistry;

/// Reply used when the model cannot produce a final answer for an
/// otherwise completed turn.
pub const FALLBACK_APOLOGY: &str =
    "I'm sorry, I ran into a problem completing that request. Please try again.";

/// Tunable turn parameters.
#[derive(Debug, Clone)]
pub struct TurnOptions {
    /// Maximum number of history messages included in a prompt, counted
    /// from the most recent. The system prompt is not counted.
    pub max_history_messages: usize,
}

impl Default for TurnOptions {
    fn default() -> Self {
        Self {
            max_history_messages: 40,
        }
    }
}

/// The result of one completed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutput {
    /// Final assistant text, already appended to the session history.
    pub output_text: String,
    /// Whether this turn repaired or rebuilt the history: the validator
    /// changed the stored history, or the provider rejected the history
    /// shape and the turn recovered on a minimal prompt.
    pub history_repaired: bool,
}

/// Drives turns against a model backend and a tool registry.
pub struct TurnOrchestrator {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    sessions: SessionRegistry,
    role: AssistantRole,
    options: TurnOptions,
}

impl TurnOrchestrator {
    /// Create an orchestrator with default role and options.
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolRegistry) -> Self {
        Self {
            model,
            tools,
            sessions: SessionRegistry::default(),
            role: AssistantRole::default(),
            options: TurnOptions::default(),
        }
    }

    /// Set the assistant role.
    pub fn with_role(mut self, role: AssistantRole) -> Self {
        self.role = role;
        self
    }

    /// Set the turn options.
    pub fn with_options(mut self, options: TurnOptions) -> Self {
        self.options = options;
        self
    }

    /// The session registry, for history management alongside turns.
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Run one turn for a session.
    ///
    /// On success the user input, any tool trace, and the final
    /// assistant reply are committed to the session history. When the
    /// first model call fails the error is returned and the session is
    /// left untouched. Failures after tools have run never lose the
    /// trace: the turn completes with [`FALLBACK_APOLOGY`].
    pub async fn run_turn(
        &self,
        session_id: &str,
        user_input: &str,
    ) -> Result<TurnOutput, OrchestratorError> {
        let session = self.sessions.get_or_create(session_id).await;
        let mut context = session.context.lock().await;

        info!(
            session = session_id,
            model = self.model.name(),
            "Running turn"
        );

        let validated = validate(&context.history);
        let mut repaired = validated.was_repaired;
        if repaired {
            warn!(session = session_id, "Stored history was repaired before use");
        }
        let mut working = validated.clean;
        // Messages from this turn onward are never trimmed out of the
        // prompt; the window budget applies to prior history only.
        let turn_start = working.len();
        working.push(Message::user(user_input));

        let memory = context.memory.clone();

        // First call: tools declared, model may answer or call tools.
        let request = ModelRequest::with_tools(
            self.prompt_messages(&working, turn_start, &memory).await,
            self.tools.declarations(),
        );
        let response = self.model.complete(request).await?;

        let surviving: Vec<ToolCall> = response
            .tool_calls
            .iter()
            .filter_map(|raw| match ToolCall::from_wire(raw) {
                Some(call) => Some(call),
                None => {
                    warn!(session = session_id, "Dropping malformed tool call: {}", raw);
                    None
                }
            })
            .collect();

        let output_text = if surviving.is_empty() {
            // Plain answer, or every call was malformed.
            if !response.content.is_empty() {
                working.push(Message::assistant(&response.content));
                response.content
            } else {
                // Nothing usable came back; ask for a text answer.
                warn!(session = session_id, "Model returned no usable content or calls");
                let (text, recovered) = self.final_answer(&working, turn_start, &memory).await;
                repaired |= recovered;
                working.push(Message::assistant(&text));
                text
            }
        } else {
            debug!(
                session = session_id,
                calls = surviving.len(),
                "Executing tool calls"
            );
            working.push(Message::assistant_with_tool_calls(
                &response.content,
                surviving.clone(),
            ));

            // Sequential execution in declared order: later calls may
            // depend on memory written by earlier ones.
            let invoker = ToolInvoker::new(&self.tools);
            for call in &surviving {
                let message = invoker.invoke(call, memory.clone()).await;
                working.push(message);
            }

            let (text, recovered) = self.final_answer(&working, turn_start, &memory).await;
            repaired |= recovered;
            working.push(Message::assistant(&text));
            text
        };

        context.history = working;
        context.touch();

        info!(session = session_id, repaired, "Turn committed");
        Ok(TurnOutput {
            output_text,
            history_repaired: repaired,
        })
    }

    /// Build the prompt for a model call: system message, the most
    /// recent window of prior history, then everything from the current
    /// turn (`working[turn_start..]`) in full.
    ///
    /// The window is revalidated so trimming can never strand a tool
    /// message without its declaring assistant message.
    async fn prompt_messages(
        &self,
        working: &[Message],
        turn_start: usize,
        memory: &SessionMemory,
    ) -> Vec<Message> {
        let system = Message::system(build_system_prompt(self.role, &memory.snapshot().await));

        let start = turn_start.saturating_sub(self.options.max_history_messages);
        let window = validate(&working[start..]).clean;

        let mut messages = Vec::with_capacity(window.len() + 1);
        messages.push(system);
        messages.extend(window);
        messages
    }

    /// Ask the model for a text-only final answer over the turn so far.
    ///
    /// When the provider rejects the history shape, retries once on a
    /// minimal prompt of just the system message and the latest user
    /// input. Any remaining failure yields [`FALLBACK_APOLOGY`]; tool
    /// effects from this turn are kept either way. Returns the text and
    /// whether the minimal-prompt recovery was used.
    async fn final_answer(
        &self,
        working: &[Message],
        turn_start: usize,
        memory: &SessionMemory,
    ) -> (String, bool) {
        let request =
            ModelRequest::text_only(self.prompt_messages(working, turn_start, memory).await);
        let error = match self.model.complete(request).await {
            Ok(response) => return (nonempty_or_apology(response.content), false),
            Err(error) => error,
        };

        if error.is_history_rejection() {
            warn!("Provider rejected history shape; retrying with minimal prompt");
            let system = Message::system(build_system_prompt(self.role, &memory.snapshot().await));
            let mut minimal = vec![system];
            if let Some(user) = working.iter().rev().find(|m| m.role == Role::User) {
                minimal.push(user.clone());
            }
            match self.model.complete(ModelRequest::text_only(minimal)).await {
                Ok(response) => return (nonempty_or_apology(response.content), true),
                Err(retry_error) => {
                    warn!("Minimal-prompt retry failed: {}", retry_error);
                    return (FALLBACK_APOLOGY.to_string(), true);
                }
            }
        }

        warn!("Final answer call failed: {}", error);
        (FALLBACK_APOLOGY.to_string(), false)
    }
}

fn nonempty_or_apology(content: String) -> String {
    if content.trim().is_empty() {
        FALLBACK_APOLOGY.to_string()
    } else {
        content
    }
}
