//! The chat-model trait and generation parameters.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Generation parameters for one request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GenerationParams {
    /// Maximum number of output tokens.
    pub max_tokens: u32,
    /// Sampling temperature. `0.0` makes output deterministic for
    /// identical inputs; higher values are stochastic.
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self { max_tokens: 1024, temperature: 0.3 }
    }
}

/// A remote generative-text service behind a narrow contract.
///
/// One request per [`generate`](ChatModel::generate) call; no internal
/// retries on rate limits or 5xx — failures propagate as typed errors and
/// the calling pipeline decides whether to retry.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate text from a system instruction and a user message.
    ///
    /// Returns the raw model output. An empty or malformed upstream
    /// response is an error, never an empty string.
    async fn generate(
        &self,
        system: &str,
        user: &str,
        params: &GenerationParams,
    ) -> Result<String>;

    /// The model identifier, for logging.
    fn name(&self) -> &str;
}
