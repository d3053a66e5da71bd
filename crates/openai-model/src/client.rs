//! HTTP client implementing [`ChatModel`] against an OpenAI-compatible API.

use std::time::Duration;

use async_trait::async_trait;
use convo_core::{ChatModel, ModelError, ModelRequest, ModelResponse};
use tracing::{debug, warn};

use crate::api_types::{ApiErrorEnvelope, ApiMessage, ChatCompletionRequest, ChatCompletionResponse};
use crate::config::OpenAiConfig;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Chat model backed by an OpenAI-compatible completions endpoint.
pub struct OpenAiModel {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiModel {
    /// Create a new model client with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self, ModelError> {
        if config.api_key.is_empty() {
            return Err(ModelError::Configuration("API key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| ModelError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Create a model client from environment variables.
    pub fn from_env() -> Result<Self, ModelError> {
        Self::new(OpenAiConfig::from_env()?)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.api_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ChatModel for OpenAiModel {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: request.messages.iter().map(ApiMessage::from).collect(),
            tools: if request.tools.is_empty() {
                None
            } else {
                Some(request.tools.clone())
            },
            tool_choice: request.tool_choice.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!(
            model = %self.config.model,
            messages = body.messages.len(),
            tools = body.tools.as_ref().map_or(0, |t| t.len()),
            "sending chat completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(text);
            warn!(status = status.as_u16(), %message, "chat completion failed");
            return Err(ModelError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| ModelError::InvalidResponse(format!("malformed response body: {e}")))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidResponse("response contained no choices".to_string()))?;

        if let Some(usage) = completion.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "chat completion succeeded"
            );
        }

        Ok(ModelResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls: choice.message.tool_calls.unwrap_or_default(),
        })
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}
