//! Deterministic mock chat model for tests.

use async_trait::async_trait;

use crate::chat::{ChatModel, GenerationParams};
use crate::error::Result;

/// A [`ChatModel`] that returns a fixed response, or echoes the user
/// message when no response is configured.
///
/// Echo mode makes end-to-end retrieval tests deterministic: the "answer"
/// contains whatever context was assembled into the prompt.
#[derive(Debug, Clone, Default)]
pub struct MockChatModel {
    response: Option<String>,
}

impl MockChatModel {
    /// Create a mock that echoes the user message back.
    pub fn echo() -> Self {
        Self { response: None }
    }

    /// Create a mock that always returns `response`.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self { response: Some(response.into()) }
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn generate(
        &self,
        _system: &str,
        user: &str,
        _params: &GenerationParams,
    ) -> Result<String> {
        match &self.response {
            Some(response) => Ok(response.clone()),
            None => Ok(user.to_string()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
