//! Configuration for the RAG pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for the RAG pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of top results to return from vector search.
    pub top_k: usize,
    /// Maximum size of the assembled context blob in characters.
    ///
    /// Retrieval truncates rather than exceed the generator's input budget.
    pub max_context_chars: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self { chunk_size: 1000, chunk_overlap: 200, top_k: 8, max_context_chars: 6000 }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of top results to return from vector search.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the maximum assembled context size in characters.
    pub fn max_context_chars(mut self, chars: usize) -> Self {
        self.config.max_context_chars = chars;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `max_context_chars == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.max_context_chars == 0 {
            return Err(RagError::Config(
                "max_context_chars must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}

/// Derive the vector collection key for a user.
///
/// Keys are deterministic and unique per user so retrieval can never cross
/// user boundaries.
pub fn user_collection(user_id: i64) -> String {
    format!("user_{user_id}_cv")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_overlap_ge_chunk_size() {
        let err = RagConfig::builder().chunk_size(100).chunk_overlap(100).build().unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }

    #[test]
    fn builder_rejects_zero_top_k() {
        let err = RagConfig::builder().top_k(0).build().unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }

    #[test]
    fn collection_keys_are_deterministic_and_distinct() {
        assert_eq!(user_collection(7), "user_7_cv");
        assert_ne!(user_collection(7), user_collection(8));
    }
}
