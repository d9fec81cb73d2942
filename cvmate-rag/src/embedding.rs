//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. Embedding is a pure function of (text, model, version): the
/// same text with the same configuration yields the same vector.
///
/// The default [`embed_batch`](EmbeddingProvider::embed_batch) implementation
/// calls [`embed`](EmbeddingProvider::embed) sequentially; backends that
/// support native batching should override it. Batch calls must return
/// exactly one vector per input, in input order — partial results are an
/// error, never a silent truncation.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// Returns exactly `texts.len()` vectors in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Return a stable identifier for this provider's configuration.
    ///
    /// Recorded on each collection at build time; collections are only
    /// queryable by a provider with the same fingerprint.
    fn fingerprint(&self) -> String;
}
