//! In-memory vector index using cosine similarity.
//!
//! This module provides [`InMemoryIndex`], a zero-dependency index backed by
//! a `HashMap` protected by a `tokio::sync::RwLock`. It is suitable for
//! development, testing, and single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Chunk, CollectionMeta, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorIndex;

/// One user's collection: its build metadata plus the stored chunks.
#[derive(Debug, Clone)]
struct Collection {
    meta: CollectionMeta,
    chunks: Vec<Chunk>,
}

/// An in-memory [`VectorIndex`] using cosine similarity for search.
///
/// Rebuilds swap the whole collection under a write lock, so readers see
/// either the fully-old or fully-new set, never a mix.
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryIndex {
    /// Create a new empty in-memory index.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn rebuild(
        &self,
        collection: &str,
        meta: CollectionMeta,
        chunks: &[Chunk],
    ) -> Result<()> {
        for chunk in chunks {
            if chunk.embedding.len() != meta.dimensions {
                return Err(RagError::VectorIndex {
                    backend: "InMemory".to_string(),
                    message: format!(
                        "chunk '{}' has {} dimensions, collection expects {}",
                        chunk.id,
                        chunk.embedding.len(),
                        meta.dimensions
                    ),
                });
            }
        }

        // Validation happens before the write lock, so a failed rebuild
        // leaves the previous collection untouched.
        let mut collections = self.collections.write().await;
        collections
            .insert(collection.to_string(), Collection { meta, chunks: chunks.to_vec() });
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        let stored = collections.get(collection).ok_or_else(|| RagError::CollectionNotFound {
            collection: collection.to_string(),
        })?;

        if embedding.len() != stored.meta.dimensions {
            return Err(RagError::VectorIndex {
                backend: "InMemory".to_string(),
                message: format!(
                    "query has {} dimensions, collection expects {}",
                    embedding.len(),
                    stored.meta.dimensions
                ),
            });
        }

        let mut results: Vec<SearchResult> = stored
            .chunks
            .iter()
            .map(|chunk| SearchResult {
                chunk: chunk.clone(),
                score: cosine_similarity(&chunk.embedding, embedding),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);
        Ok(results)
    }

    async fn collection_meta(&self, collection: &str) -> Result<CollectionMeta> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .map(|c| c.meta.clone())
            .ok_or_else(|| RagError::CollectionNotFound { collection: collection.to_string() })
    }

    async fn drop_collection(&self, collection: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(collection);
        Ok(())
    }
}
