//! Scripted model implementation.

use std::collections::VecDeque;

use async_trait::async_trait;
use convo_core::{ChatModel, ModelError, ModelRequest, ModelResponse};
use tokio::sync::Mutex;

use crate::failing::FailureMode;

/// One scripted step: a reply or a failure.
#[derive(Debug)]
pub enum ScriptedStep {
    /// Return this response.
    Reply(ModelResponse),
    /// Fail with this mode.
    Fail(FailureMode),
}

/// A model that replays a fixed script.
///
/// Steps are consumed in order; every request is recorded so tests can
/// assert on what the orchestrator sent (e.g. that the final-answer
/// call carried no tool declarations). An exhausted script returns
/// `ModelError::InvalidResponse`, which fails the test visibly.
pub struct ScriptedModel {
    steps: Mutex<VecDeque<ScriptedStep>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    /// Create a model replying with the given responses in order.
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self::from_steps(responses.into_iter().map(ScriptedStep::Reply).collect())
    }

    /// Create a model from explicit steps (replies and failures).
    pub fn from_steps(steps: Vec<ScriptedStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in order.
    pub async fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of script steps not yet consumed.
    pub async fn remaining(&self) -> usize {
        self.steps.lock().await.len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        self.requests.lock().await.push(request);

        match self.steps.lock().await.pop_front() {
            Some(ScriptedStep::Reply(response)) => Ok(response),
            Some(ScriptedStep::Fail(mode)) => Err(mode.to_error()),
            None => Err(ModelError::InvalidResponse(
                "scripted model exhausted".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "ScriptedModel"
    }
}
