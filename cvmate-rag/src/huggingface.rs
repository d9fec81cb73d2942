//! HuggingFace Inference API embedding provider.
//!
//! This module is only available when the `huggingface` feature is enabled.
//!
//! Calls the hosted feature-extraction pipeline, so no model weights are
//! downloaded locally.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// Base URL for the HF inference feature-extraction pipeline.
const HF_INFERENCE_BASE: &str = "https://router.huggingface.co/hf-inference/models";

/// The default sentence-embedding model.
const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Dimensionality of `all-MiniLM-L6-v2` embeddings.
const DEFAULT_DIMENSIONS: usize = 384;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// An [`EmbeddingProvider`] backed by the HuggingFace Inference API.
///
/// Uses `reqwest` to call the feature-extraction pipeline directly, one
/// request per text. Non-2xx responses surface as [`RagError::Embedding`];
/// timeouts and connection failures as [`RagError::Transport`].
///
/// # Example
///
/// ```rust,ignore
/// use cvmate_rag::huggingface::HfEmbeddingProvider;
///
/// let provider = HfEmbeddingProvider::new("hf_...")?;
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
pub struct HfEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a str,
}

impl HfEmbeddingProvider {
    /// Create a new provider with the given API key.
    ///
    /// Uses the default model (`all-MiniLM-L6-v2`, 384 dimensions).
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Embedding {
                provider: "HuggingFace".into(),
                message: "API key must not be empty".into(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| RagError::Embedding {
                provider: "HuggingFace".into(),
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            model: DEFAULT_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Create a new provider using the `HUGGINGFACE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var("HUGGINGFACE_API_KEY").map_err(|_| RagError::Embedding {
                provider: "HuggingFace".into(),
                message: "HUGGINGFACE_API_KEY environment variable not set".into(),
            })?;
        Self::new(api_key)
    }

    /// Set the model and its embedding dimensionality.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }

    fn endpoint(&self) -> String {
        format!("{HF_INFERENCE_BASE}/{}/pipeline/feature-extraction", self.model)
    }

    /// The feature-extraction pipeline returns either a flat vector or a
    /// singleton batch depending on the model; accept both shapes.
    fn parse_vector(&self, value: Value) -> Result<Vec<f32>> {
        let flat: std::result::Result<Vec<f32>, _> = serde_json::from_value(value.clone());
        let vector = match flat {
            Ok(v) => v,
            Err(_) => {
                let nested: Vec<Vec<f32>> =
                    serde_json::from_value(value).map_err(|e| RagError::Embedding {
                        provider: "HuggingFace".into(),
                        message: format!("unexpected response shape: {e}"),
                    })?;
                nested.into_iter().next().ok_or_else(|| RagError::Embedding {
                    provider: "HuggingFace".into(),
                    message: "empty embedding response".into(),
                })?
            }
        };

        if vector.len() != self.dimensions {
            return Err(RagError::Embedding {
                provider: "HuggingFace".into(),
                message: format!(
                    "model '{}' returned {} dimensions, expected {}",
                    self.model,
                    vector.len(),
                    self.dimensions
                ),
            });
        }
        Ok(vector)
    }

    fn transport_err(e: reqwest::Error) -> RagError {
        RagError::Transport { operation: "embed".into(), message: e.to_string() }
    }
}

#[async_trait]
impl EmbeddingProvider for HfEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "HuggingFace", model = %self.model, text_len = text.len(), "embedding text");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&FeatureExtractionRequest { inputs: text })
            .send()
            .await
            .map_err(Self::transport_err)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(provider = "HuggingFace", %status, "embedding request failed");
            return Err(RagError::Embedding {
                provider: "HuggingFace".into(),
                message: format!("{status}: {body}"),
            });
        }

        let value: Value = response.json().await.map_err(Self::transport_err)?;
        self.parse_vector(value)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn fingerprint(&self) -> String {
        format!("hf/{}@{}", self.model, self.dimensions)
    }
}
