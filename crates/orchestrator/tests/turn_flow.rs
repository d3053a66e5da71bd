//! End-to-end turn flow tests against scripted model backends.

use std::sync::Arc;

use convo_core::{async_trait, ModelResponse, Role};
use convo_tools::{session_toolset, ToolArgs, ToolCapability, ToolError, ToolRegistry};
use mock_model::{FailingModel, FailureMode, ScriptedModel, ScriptedStep};
use orchestrator::{OrchestratorError, TurnOrchestrator, TurnOptions, FALLBACK_APOLOGY};
use serde_json::{json, Value};

struct EchoTool;

#[async_trait]
impl ToolCapability for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo the given text back."
    }

    async fn invoke(&self, args: ToolArgs) -> Result<Value, ToolError> {
        let text = args.require_string("text")?;
        Ok(json!({ "echoed": text }))
    }
}

fn echo_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(EchoTool);
    registry
}

fn echo_call(id: &str, text: &str) -> Value {
    json!({
        "id": id,
        "function": { "name": "echo", "arguments": json!({ "text": text }).to_string() }
    })
}

#[tokio::test]
async fn plain_turn_commits_user_and_assistant() {
    let model = Arc::new(ScriptedModel::new(vec![ModelResponse::text("Hi there!")]));
    let orchestrator = TurnOrchestrator::new(model.clone(), echo_registry());

    let output = orchestrator.run_turn("s1", "hello").await.unwrap();
    assert_eq!(output.output_text, "Hi there!");
    assert!(!output.history_repaired);

    let session = orchestrator.sessions().get("s1").await.unwrap();
    let history = session.context.lock().await.history.clone();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].content, "hello");
    assert_eq!(history[1].role, Role::Assistant);
    assert_eq!(history[1].content, "Hi there!");

    // Tools were declared on the only call.
    let requests = model.requests().await;
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].tools.is_empty());
    assert_eq!(requests[0].tool_choice.as_deref(), Some("auto"));
}

#[tokio::test]
async fn tool_turn_commits_full_trace() {
    let model = Arc::new(ScriptedModel::new(vec![
        ModelResponse::with_tool_calls("", vec![echo_call("c1", "hi")]),
        ModelResponse::text("done"),
    ]));
    let orchestrator = TurnOrchestrator::new(model.clone(), echo_registry());

    let output = orchestrator.run_turn("s1", "say hi").await.unwrap();
    assert_eq!(output.output_text, "done");

    let session = orchestrator.sessions().get("s1").await.unwrap();
    let history = session.context.lock().await.history.clone();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[1].role, Role::Assistant);
    assert_eq!(history[1].declared_call_ids(), vec!["c1"]);
    assert_eq!(history[2].role, Role::Tool);
    assert_eq!(history[2].tool_call_id.as_deref(), Some("c1"));
    assert!(history[2].content.contains("\"success\":true"));
    assert!(history[2].content.contains("\"echoed\":\"hi\""));
    assert_eq!(history[3].role, Role::Assistant);
    assert_eq!(history[3].content, "done");

    // The final-answer call carried no tool declarations.
    let requests = model.requests().await;
    assert_eq!(requests.len(), 2);
    assert!(requests[1].tools.is_empty());
    assert!(requests[1].tool_choice.is_none());
}

#[tokio::test]
async fn tool_calls_run_sequentially_sharing_memory() {
    let store = json!({ "key": "city", "value": "Lisbon" }).to_string();
    let fetch = json!({ "key": "city" }).to_string();
    let model = Arc::new(ScriptedModel::new(vec![
        ModelResponse::with_tool_calls(
            "",
            vec![
                json!({ "id": "c1", "function": { "name": "remember_note", "arguments": store } }),
                json!({ "id": "c2", "function": { "name": "recall_note", "arguments": fetch } }),
            ],
        ),
        ModelResponse::text("noted"),
    ]));
    let orchestrator = TurnOrchestrator::new(model, session_toolset());

    orchestrator.run_turn("s1", "remember my city").await.unwrap();

    let session = orchestrator.sessions().get("s1").await.unwrap();
    let history = session.context.lock().await.history.clone();

    // The second call observed the first call's write.
    let recall = &history[3];
    assert_eq!(recall.tool_call_id.as_deref(), Some("c2"));
    assert!(recall.content.contains("\"found\":true"));
    assert!(recall.content.contains("Lisbon"));
}

#[tokio::test]
async fn unknown_tool_becomes_failure_result() {
    let ghost = json!({ "id": "c1", "function": { "name": "teleport", "arguments": "{}" } });
    let model = Arc::new(ScriptedModel::new(vec![
        ModelResponse::with_tool_calls("", vec![ghost]),
        ModelResponse::text("that did not work"),
    ]));
    let orchestrator = TurnOrchestrator::new(model, echo_registry());

    let output = orchestrator.run_turn("s1", "teleport me").await.unwrap();
    assert_eq!(output.output_text, "that did not work");

    let session = orchestrator.sessions().get("s1").await.unwrap();
    let history = session.context.lock().await.history.clone();
    assert_eq!(history[2].role, Role::Tool);
    assert!(history[2].content.contains("\"success\":false"));
    assert!(history[2].content.contains("ToolNotFound"));
}

#[tokio::test]
async fn malformed_calls_are_dropped_and_turn_still_answers() {
    // No id, so normalization drops the call; content is empty, so the
    // orchestrator asks for a text answer instead.
    let bad = json!({ "function": { "name": "echo", "arguments": "{}" } });
    let model = Arc::new(ScriptedModel::new(vec![
        ModelResponse::with_tool_calls("", vec![bad]),
        ModelResponse::text("plain answer"),
    ]));
    let orchestrator = TurnOrchestrator::new(model, echo_registry());

    let output = orchestrator.run_turn("s1", "hi").await.unwrap();
    assert_eq!(output.output_text, "plain answer");

    let session = orchestrator.sessions().get("s1").await.unwrap();
    let history = session.context.lock().await.history.clone();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].role, Role::Assistant);
    assert!(history[1].tool_calls.is_none());
}

#[tokio::test]
async fn first_call_failure_leaves_history_untouched() {
    let model = Arc::new(FailingModel::network("connection refused"));
    let orchestrator = TurnOrchestrator::new(model, echo_registry());

    let result = orchestrator.run_turn("s1", "hello").await;
    assert!(matches!(result, Err(OrchestratorError::Model(_))));

    let session = orchestrator.sessions().get("s1").await.unwrap();
    assert!(session.context.lock().await.history.is_empty());
}

#[tokio::test]
async fn history_rejection_recovers_on_minimal_prompt() {
    let model = Arc::new(ScriptedModel::from_steps(vec![
        ScriptedStep::Reply(ModelResponse::with_tool_calls("", vec![echo_call("c1", "x")])),
        ScriptedStep::Fail(FailureMode::history_rejected()),
        ScriptedStep::Reply(ModelResponse::text("recovered")),
    ]));
    let orchestrator = TurnOrchestrator::new(model.clone(), echo_registry());

    let output = orchestrator.run_turn("s1", "try it").await.unwrap();
    assert_eq!(output.output_text, "recovered");
    assert!(output.history_repaired);

    // The retry prompt was just system + user.
    let requests = model.requests().await;
    assert_eq!(requests.len(), 3);
    let retry = &requests[2];
    assert_eq!(retry.messages.len(), 2);
    assert_eq!(retry.messages[0].role, Role::System);
    assert_eq!(retry.messages[1].role, Role::User);
    assert_eq!(retry.messages[1].content, "try it");

    // The tool trace from this turn is still committed.
    let session = orchestrator.sessions().get("s1").await.unwrap();
    let history = session.context.lock().await.history.clone();
    assert_eq!(history.len(), 4);
    assert_eq!(history[3].content, "recovered");
}

#[tokio::test]
async fn exhausted_recovery_falls_back_to_apology() {
    let model = Arc::new(ScriptedModel::from_steps(vec![
        ScriptedStep::Reply(ModelResponse::with_tool_calls("", vec![echo_call("c1", "x")])),
        ScriptedStep::Fail(FailureMode::history_rejected()),
        ScriptedStep::Fail(FailureMode::Network("gone".to_string())),
    ]));
    let orchestrator = TurnOrchestrator::new(model, echo_registry());

    let output = orchestrator.run_turn("s1", "try it").await.unwrap();
    assert_eq!(output.output_text, FALLBACK_APOLOGY);
    assert!(output.history_repaired);

    // Tool effects are kept; the apology closes the turn.
    let session = orchestrator.sessions().get("s1").await.unwrap();
    let history = session.context.lock().await.history.clone();
    assert_eq!(history.len(), 4);
    assert_eq!(history[2].role, Role::Tool);
    assert_eq!(history[3].content, FALLBACK_APOLOGY);
}

#[tokio::test]
async fn unrecognized_final_failure_apologizes_without_retry() {
    let model = Arc::new(ScriptedModel::from_steps(vec![
        ScriptedStep::Reply(ModelResponse::with_tool_calls("", vec![echo_call("c1", "x")])),
        ScriptedStep::Fail(FailureMode::Network("gone".to_string())),
    ]));
    let orchestrator = TurnOrchestrator::new(model.clone(), echo_registry());

    let output = orchestrator.run_turn("s1", "try it").await.unwrap();
    assert_eq!(output.output_text, FALLBACK_APOLOGY);
    assert!(!output.history_repaired);
    assert_eq!(model.requests().await.len(), 2);
}

#[tokio::test]
async fn stored_corruption_is_repaired_before_use() {
    let model = Arc::new(ScriptedModel::new(vec![ModelResponse::text("ok")]));
    let orchestrator = TurnOrchestrator::new(model, echo_registry());

    // Seed a history containing an orphan tool message.
    {
        let session = orchestrator.sessions().get_or_create("s1").await;
        let mut context = session.context.lock().await;
        context.history.push(convo_core::Message::user("earlier"));
        context
            .history
            .push(convo_core::Message::tool("ghost", "echo", "{}"));
    }

    let output = orchestrator.run_turn("s1", "hello").await.unwrap();
    assert!(output.history_repaired);

    let session = orchestrator.sessions().get("s1").await.unwrap();
    let history = session.context.lock().await.history.clone();
    assert!(history.iter().all(|m| m.role != Role::Tool));
    assert_eq!(history.len(), 3);
}

#[tokio::test]
async fn prompt_window_is_bounded() {
    let model = Arc::new(ScriptedModel::new(vec![ModelResponse::text("ok")]));
    let orchestrator = TurnOrchestrator::new(model.clone(), echo_registry()).with_options(
        TurnOptions {
            max_history_messages: 4,
        },
    );

    {
        let session = orchestrator.sessions().get_or_create("s1").await;
        let mut context = session.context.lock().await;
        for i in 0..20 {
            context.history.push(convo_core::Message::user(format!("m{i}")));
            context
                .history
                .push(convo_core::Message::assistant(format!("r{i}")));
        }
    }

    orchestrator.run_turn("s1", "latest").await.unwrap();

    let requests = model.requests().await;
    // System message, four prior-history messages, then the new user
    // input on top of the window budget.
    assert_eq!(requests[0].messages.len(), 6);
    assert_eq!(requests[0].messages[0].role, Role::System);
    assert_eq!(requests[0].messages[1].content, "m18");
    assert_eq!(requests[0].messages[4].content, "r19");
    assert_eq!(requests[0].messages.last().unwrap().content, "latest");
}

#[tokio::test]
async fn memory_survives_into_later_prompts() {
    let store = json!({ "key": "name", "value": "Ada" }).to_string();
    let model = Arc::new(ScriptedModel::new(vec![
        ModelResponse::with_tool_calls(
            "",
            vec![json!({ "id": "c1", "function": { "name": "remember_note", "arguments": store } })],
        ),
        ModelResponse::text("saved"),
        ModelResponse::text("hello Ada"),
    ]));
    let orchestrator = TurnOrchestrator::new(model.clone(), session_toolset());

    orchestrator.run_turn("s1", "remember my name").await.unwrap();
    orchestrator.run_turn("s1", "greet me").await.unwrap();

    let requests = model.requests().await;
    let system = &requests[2].messages[0];
    assert!(system.content.contains("[MEMORY]"));
    assert!(system.content.contains("- name: Ada"));
}
