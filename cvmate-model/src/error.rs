//! Error types for the `cvmate-model` crate.

use thiserror::Error;

/// Errors that can occur when calling a generative model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A configuration validation error (empty API key, bad base URL).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The upstream service rejected or failed the generation request.
    ///
    /// Carries the upstream HTTP status and message. The client never
    /// retries internally; the caller decides whether to retry.
    #[error("Generation error ({status}): {message}")]
    Generation {
        /// The upstream HTTP status code.
        status: u16,
        /// The upstream error message or response body.
        message: String,
    },

    /// A network-level failure (timeout, connect, DNS).
    ///
    /// Distinct from [`ModelError::Generation`] so callers can treat
    /// transport failures as transient.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// A convenience result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
