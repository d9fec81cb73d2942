//! DeepSeek chat client over the HuggingFace router.
//!
//! The router exposes an OpenAI-compatible `/v1/chat/completions` endpoint,
//! so the wire types here are the standard chat-completions shapes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::chat::{ChatModel, GenerationParams};
use crate::error::{ModelError, Result};

/// The HF router chat-completions endpoint.
pub const ROUTER_API_URL: &str = "https://router.huggingface.co/v1/chat/completions";

/// The default generation model.
const DEFAULT_MODEL: &str = "deepseek-ai/DeepSeek-V3.2";

/// Default request timeout in seconds. Generation is slower than
/// embedding, so the budget is larger.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for a [`DeepSeekClient`].
#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    /// Bearer token for the router.
    pub api_key: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// Chat-completions endpoint URL.
    pub base_url: String,
}

impl DeepSeekConfig {
    /// Create a config for the default model on the HF router.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: ROUTER_API_URL.to_string(),
        }
    }

    /// Override the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the endpoint URL (for self-hosted OpenAI-compatible servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// A [`ChatModel`] backed by DeepSeek via the HF router.
///
/// Sends exactly one chat-completions request per call. Non-2xx responses
/// surface as [`ModelError::Generation`] with the upstream status and body;
/// timeouts and connection failures as [`ModelError::Transport`].
#[derive(Debug)]
pub struct DeepSeekClient {
    client: reqwest::Client,
    config: DeepSeekConfig,
}

// ── Chat-completions wire types ────────────────────────────────────

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl DeepSeekClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Config`] if the API key is empty.
    pub fn new(config: DeepSeekConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(ModelError::Config("API key must not be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ModelError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create a client using the `HUGGINGFACE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("HUGGINGFACE_API_KEY").map_err(|_| {
            ModelError::Config("HUGGINGFACE_API_KEY environment variable not set".to_string())
        })?;
        Self::new(DeepSeekConfig::new(api_key))
    }
}

#[async_trait]
impl ChatModel for DeepSeekClient {
    async fn generate(
        &self,
        system: &str,
        user: &str,
        params: &GenerationParams,
    ) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };

        debug!(model = %self.config.model, max_tokens = params.max_tokens, temperature = params.temperature, "sending chat request");

        let response = self
            .client
            .post(&self.config.base_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(model = %self.config.model, %status, "chat request failed");
            return Err(ModelError::Generation { status: status.as_u16(), message: body });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::MalformedResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                ModelError::MalformedResponse("response contained no choices".to_string())
            })?;

        debug!(model = %self.config.model, output_len = content.len(), "chat request completed");
        Ok(content)
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_api_key() {
        let err = DeepSeekClient::new(DeepSeekConfig::new("")).unwrap_err();
        assert!(matches!(err, ModelError::Config(_)));
    }

    #[test]
    fn request_serializes_to_chat_completions_shape() {
        let request = ChatRequest {
            model: "deepseek-ai/DeepSeek-V3.2",
            messages: vec![
                ChatMessage { role: "system", content: "be helpful" },
                ChatMessage { role: "user", content: "hello" },
            ],
            max_tokens: 1024,
            temperature: 0.3,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "deepseek-ai/DeepSeek-V3.2");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hello");
        assert_eq!(value["max_tokens"], 1024);
    }

    #[test]
    fn response_parses_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Hi there"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Hi there");
    }
}
