//! Error types for the `cvmate-service` crate.

use thiserror::Error;

use cvmate_model::ModelError;
use cvmate_rag::RagError;

/// Errors surfaced by the CV service.
///
/// Variants are distinguishable by pattern matching so callers never need
/// to string-match messages: `NotReady` means poll and retry, a nested
/// [`RagError::CollectionNotFound`] means the user has no indexed CV, and
/// everything else is a hard failure.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The user's document has not finished indexing yet.
    #[error("Document is not indexed yet; try again once processing completes")]
    NotReady,

    /// The requested artifact type is not recognized.
    #[error("Invalid application type '{0}'; expected 'cover_letter' or 'email'")]
    InvalidArtifactType(String),

    /// Fetching the document from blob storage failed.
    #[error("Document fetch failed: {0}")]
    Fetch(String),

    /// Extracting text from the document bytes failed.
    #[error("Text extraction failed: {0}")]
    Extraction(String),

    /// An error from the RAG core, propagated unchanged.
    #[error(transparent)]
    Rag(#[from] RagError),

    /// An error from the generative model, propagated unchanged.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A convenience result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
