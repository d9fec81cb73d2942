//! Configuration for the CV service.

use cvmate_model::GenerationParams;
use cvmate_rag::RagConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the CV service: RAG parameters plus per-operation
/// generation parameters.
///
/// Generation defaults mirror the intended use: question answering is kept
/// close to the source (low temperature), application drafting is allowed
/// more freedom.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    /// RAG chunking and retrieval parameters.
    pub rag: RagConfig,
    /// Number of chunks retrieved when drafting an application.
    ///
    /// Applications benefit from broader CV coverage than pointed
    /// questions, so this may exceed `rag.top_k`.
    pub application_top_k: usize,
    /// Generation parameters for question answering.
    pub qa_params: GenerationParams,
    /// Generation parameters for cover letters.
    pub cover_letter_params: GenerationParams,
    /// Generation parameters for application emails.
    pub email_params: GenerationParams,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            rag: RagConfig::default(),
            application_top_k: 10,
            qa_params: GenerationParams { max_tokens: 1024, temperature: 0.3 },
            cover_letter_params: GenerationParams { max_tokens: 2048, temperature: 0.8 },
            email_params: GenerationParams { max_tokens: 1536, temperature: 0.8 },
        }
    }
}
