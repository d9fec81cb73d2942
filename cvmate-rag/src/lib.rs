//! # cvmate-rag
//!
//! Retrieval-Augmented Generation core for the cvmate CV assistant.
//!
//! This crate covers the ingest-and-retrieve half of the RAG workflow:
//!
//! - [`Chunker`] implementations ([`FixedSizeChunker`], [`RecursiveChunker`])
//! - [`EmbeddingProvider`] trait plus the remote [`HfEmbeddingProvider`]
//!   (feature `huggingface`, on by default)
//! - [`VectorIndex`] trait with [`InMemoryIndex`] and a pgvector backend
//!   (feature `pgvector`)
//! - [`RagPipeline`] tying the three together
//!
//! Collections are scoped per user via [`user_collection`] and rebuilt
//! atomically on every ingestion; a query sees either the fully-old or the
//! fully-new set, never a mix. The similarity metric is cosine similarity
//! throughout.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cvmate_rag::{
//!     Document, InMemoryIndex, RagConfig, RagPipeline, RecursiveChunker, user_collection,
//! };
//!
//! let config = RagConfig::default();
//! let pipeline = RagPipeline::builder()
//!     .config(config.clone())
//!     .embedding_provider(Arc::new(embedder))
//!     .index(Arc::new(InMemoryIndex::new()))
//!     .chunker(Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap)?))
//!     .build()?;
//!
//! let collection = user_collection(42);
//! pipeline.ingest(&collection, &Document::from_text("cv_42", cv_text)).await?;
//! let context = pipeline.retrieve(&collection, "What languages do they know?").await?;
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod pipeline;
pub mod vectorstore;

#[cfg(feature = "huggingface")]
pub mod huggingface;

#[cfg(feature = "pgvector")]
pub mod pgvector;

pub use chunking::{Chunker, FixedSizeChunker, RecursiveChunker};
pub use config::{RagConfig, RagConfigBuilder, user_collection};
pub use document::{Chunk, CollectionMeta, Document, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use inmemory::InMemoryIndex;
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use vectorstore::VectorIndex;

#[cfg(feature = "huggingface")]
pub use huggingface::HfEmbeddingProvider;

#[cfg(feature = "pgvector")]
pub use pgvector::PgVectorIndex;
