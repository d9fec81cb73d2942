//! Error types for the `cvmate-rag` crate.

use thiserror::Error;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// A configuration validation error (bad chunk/overlap settings, etc.).
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error returned by an embedding backend.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A network-level failure (timeout, connect, DNS) talking to a remote model.
    ///
    /// Distinct from [`RagError::Embedding`] so callers can treat transport
    /// failures as transient.
    #[error("Transport error ({operation}): {message}")]
    Transport {
        /// The operation being attempted when transport failed.
        operation: String,
        /// A description of the failure.
        message: String,
    },

    /// An error in the vector index backend.
    #[error("Vector index error ({backend}): {message}")]
    VectorIndex {
        /// The vector index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// No collection exists for the given key.
    ///
    /// Raised on search against an absent collection so callers can tell
    /// "not yet processed" apart from "processed, zero chunks".
    #[error("Collection '{collection}' not found")]
    CollectionNotFound {
        /// The collection key that was looked up.
        collection: String,
    },

    /// The collection was built with a different embedder configuration.
    #[error(
        "Collection '{collection}' was built with embedder '{actual}', expected '{expected}'"
    )]
    EmbedderMismatch {
        /// The collection key that was queried.
        collection: String,
        /// The fingerprint of the embedder performing the query.
        expected: String,
        /// The fingerprint recorded when the collection was built.
        actual: String,
    },
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
