//! RAG pipeline orchestrator.
//!
//! The [`RagPipeline`] coordinates ingestion (chunk → embed → rebuild) and
//! retrieval (embed → search → assemble context) by composing an
//! [`EmbeddingProvider`], a [`VectorIndex`], and a [`Chunker`].
//!
//! # Example
//!
//! ```rust,ignore
//! use cvmate_rag::{RagPipeline, RagConfig, InMemoryIndex, RecursiveChunker};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .index(Arc::new(InMemoryIndex::new()))
//!     .chunker(Arc::new(RecursiveChunker::new(1000, 200)?))
//!     .build()?;
//!
//! pipeline.ingest("user_1_cv", &document).await?;
//! let context = pipeline.retrieve("user_1_cv", "What did they study?").await?;
//! ```

use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{Chunk, CollectionMeta, Document};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorIndex;

/// The RAG pipeline orchestrator.
///
/// Coordinates document ingestion (chunk → embed → atomic rebuild) and
/// retrieval (embed → search → context assembly). Construct one via
/// [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    chunker: Arc<dyn Chunker>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// The collection metadata this pipeline's embedder produces.
    fn meta(&self) -> CollectionMeta {
        CollectionMeta {
            dimensions: self.embedding_provider.dimensions(),
            embedder: self.embedding_provider.fingerprint(),
        }
    }

    /// Ingest a document into `collection`, replacing any prior contents.
    ///
    /// Runs chunk → batch-embed → [`VectorIndex::rebuild`]. The rebuild is
    /// all-or-nothing: if any stage fails, the previous collection (if one
    /// exists) is left untouched.
    ///
    /// Returns the number of chunks stored.
    ///
    /// # Errors
    ///
    /// Propagates [`RagError::Embedding`], [`RagError::Transport`], and
    /// [`RagError::VectorIndex`] unchanged.
    pub async fn ingest(&self, collection: &str, document: &Document) -> Result<usize> {
        let chunks = self.chunk_document(document);
        self.index_chunks(collection, document, chunks).await
    }

    /// The chunking stage of ingestion.
    pub fn chunk_document(&self, document: &Document) -> Vec<Chunk> {
        self.chunker.chunk(document)
    }

    /// The embed-and-rebuild stage of ingestion.
    ///
    /// Same guarantees as [`ingest`](RagPipeline::ingest); split out so a
    /// caller tracking a per-document state machine can observe the
    /// chunking/embedding stage boundary.
    pub async fn index_chunks(
        &self,
        collection: &str,
        document: &Document,
        mut chunks: Vec<Chunk>,
    ) -> Result<usize> {
        if chunks.is_empty() {
            // Processed-with-zero-chunks is distinguishable from absent:
            // the collection is created empty.
            self.index.rebuild(collection, self.meta(), &[]).await?;
            info!(document.id = %document.id, chunk_count = 0, "ingested empty document");
            return Ok(0);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedding_provider.embed_batch(&texts).await.inspect_err(|e| {
            error!(document.id = %document.id, error = %e, "embedding failed during ingestion");
        })?;

        if embeddings.len() != chunks.len() {
            return Err(RagError::Embedding {
                provider: self.embedding_provider.fingerprint(),
                message: format!(
                    "batch returned {} vectors for {} chunks",
                    embeddings.len(),
                    chunks.len()
                ),
            });
        }

        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        self.index.rebuild(collection, self.meta(), &chunks).await.inspect_err(|e| {
            error!(document.id = %document.id, error = %e, "rebuild failed during ingestion");
        })?;

        let chunk_count = chunks.len();
        info!(document.id = %document.id, collection, chunk_count, "ingested document");
        Ok(chunk_count)
    }

    /// Retrieve context for a query: embed → search → assemble.
    ///
    /// Chunk texts are concatenated in relevance order, separated by a
    /// blank line, and truncated (char-boundary safe) at the configured
    /// `max_context_chars`.
    ///
    /// # Errors
    ///
    /// - [`RagError::CollectionNotFound`] if the collection does not exist
    /// - [`RagError::EmbedderMismatch`] if the collection was built with a
    ///   different embedder configuration
    /// - embedding/search errors propagated unchanged
    pub async fn retrieve(&self, collection: &str, query: &str) -> Result<String> {
        self.retrieve_with_k(collection, query, self.config.top_k).await
    }

    /// Like [`retrieve`](RagPipeline::retrieve) with an explicit `top_k`,
    /// overriding the configured default.
    pub async fn retrieve_with_k(
        &self,
        collection: &str,
        query: &str,
        top_k: usize,
    ) -> Result<String> {
        let stored = self.index.collection_meta(collection).await?;
        let expected = self.embedding_provider.fingerprint();
        if stored.embedder != expected {
            return Err(RagError::EmbedderMismatch {
                collection: collection.to_string(),
                expected,
                actual: stored.embedder,
            });
        }

        let query_embedding = self.embedding_provider.embed(query).await.inspect_err(|e| {
            error!(error = %e, "embedding failed during retrieval");
        })?;

        let results =
            self.index.search(collection, &query_embedding, top_k).await.inspect_err(
                |e| error!(collection, error = %e, "vector search failed"),
            )?;

        let mut context = String::new();
        for result in &results {
            if !context.is_empty() {
                context.push_str("\n\n");
            }
            context.push_str(&result.chunk.text);
        }

        if context.chars().count() > self.config.max_context_chars {
            context = context.chars().take(self.config.max_context_chars).collect();
        }

        info!(collection, result_count = results.len(), context_len = context.len(), "retrieved context");
        Ok(context)
    }

    /// Drop a user's collection. Idempotent.
    pub async fn drop_collection(&self, collection: &str) -> Result<()> {
        self.index.drop_collection(collection).await
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// All fields are required. Call [`build()`](RagPipelineBuilder::build) to
/// validate and produce the pipeline.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn VectorIndex>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector index backend.
    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required field is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let index =
            self.index.ok_or_else(|| RagError::Config("index is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::Config("chunker is required".to_string()))?;

        Ok(RagPipeline { config, embedding_provider, index, chunker })
    }
}
