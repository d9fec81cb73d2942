//! Vector index trait for storing and searching vector embeddings.

use async_trait::async_trait;

use crate::document::{Chunk, CollectionMeta, SearchResult};
use crate::error::Result;

/// A storage backend for per-user vector collections.
///
/// Collections are replaced wholesale on each ingestion rather than updated
/// incrementally: [`rebuild`](VectorIndex::rebuild) is all-or-nothing, so a
/// failed ingestion leaves the previous collection untouched and concurrent
/// readers never see a mix of old and new entries.
///
/// The similarity metric is cosine similarity for every backend.
///
/// # Example
///
/// ```rust,ignore
/// use cvmate_rag::{InMemoryIndex, VectorIndex};
///
/// let index = InMemoryIndex::new();
/// index.rebuild("user_1_cv", meta, &chunks).await?;
/// let results = index.search("user_1_cv", &query_embedding, 8).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Atomically replace all entries under `collection`.
    ///
    /// Creates the collection if it does not exist. Chunks must have
    /// embeddings set. On error the previous contents remain visible.
    async fn rebuild(
        &self,
        collection: &str,
        meta: CollectionMeta,
        chunks: &[Chunk],
    ) -> Result<()>;

    /// Search for the `top_k` most similar chunks to the given embedding.
    ///
    /// Returns results ordered by descending similarity score, fewer than
    /// `top_k` only when the collection holds fewer entries.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CollectionNotFound`](crate::RagError::CollectionNotFound)
    /// if no collection exists for the key. An existing but empty collection
    /// returns `Ok(vec![])`.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>>;

    /// Return the metadata recorded when `collection` was last rebuilt.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CollectionNotFound`](crate::RagError::CollectionNotFound)
    /// if no collection exists for the key.
    async fn collection_meta(&self, collection: &str) -> Result<CollectionMeta>;

    /// Remove a collection and all its entries. Idempotent: dropping an
    /// absent collection is not an error.
    async fn drop_collection(&self, collection: &str) -> Result<()>;
}
