//! Always-failing model implementation.

use async_trait::async_trait;
use convo_core::{ChatModel, ModelError, ModelRequest, ModelResponse};

/// Reproducible failure configurations.
///
/// `ModelError` is not `Clone`, so the mode is stored and a fresh error
/// is built per call.
#[derive(Debug, Clone)]
pub enum FailureMode {
    /// Transport-level failure.
    Network(String),
    /// Provider rejection with a status and message.
    Provider { status: u16, message: String },
}

impl FailureMode {
    /// A provider 400 rejecting the tool-message sequence, as seen when
    /// a malformed history reaches an OpenAI-compatible endpoint.
    pub fn history_rejected() -> Self {
        Self::Provider {
            status: 400,
            message: "Invalid parameter: messages with role 'tool' must be a response to a \
                      preceding message with 'tool_calls'"
                .to_string(),
        }
    }

    /// Build the error for one call.
    pub fn to_error(&self) -> ModelError {
        match self {
            Self::Network(message) => ModelError::Network(message.clone()),
            Self::Provider { status, message } => ModelError::Provider {
                status: *status,
                message: message.clone(),
            },
        }
    }
}

/// A model that fails every call with a configured error.
#[derive(Debug, Clone)]
pub struct FailingModel {
    mode: FailureMode,
}

impl FailingModel {
    /// Create a model failing with the given mode.
    pub fn new(mode: FailureMode) -> Self {
        Self { mode }
    }

    /// Create a model failing with a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FailureMode::Network(message.into()))
    }

    /// Create a model failing with a history-shape rejection.
    pub fn history_rejected() -> Self {
        Self::new(FailureMode::history_rejected())
    }
}

#[async_trait]
impl ChatModel for FailingModel {
    async fn complete(&self, _request: ModelRequest) -> Result<ModelResponse, ModelError> {
        Err(self.mode.to_error())
    }

    fn name(&self) -> &str {
        "FailingModel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convo_core::Message;

    #[tokio::test]
    async fn test_network_failure() {
        let model = FailingModel::network("connection refused");
        let result = model
            .complete(ModelRequest::text_only(vec![Message::user("hi")]))
            .await;
        assert!(matches!(result, Err(ModelError::Network(_))));
    }

    #[tokio::test]
    async fn test_history_rejection_is_recognizable() {
        let model = FailingModel::history_rejected();
        let error = model
            .complete(ModelRequest::text_only(vec![Message::user("hi")]))
            .await
            .unwrap_err();
        assert!(error.is_history_rejection());
    }
}
