//! The CV service: question answering and application generation.
//!
//! [`CvService`] is an explicit value constructed once at process start
//! with its collaborators injected; handlers hold a shared reference
//! rather than reaching for global state.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use cvmate_model::ChatModel;
use cvmate_rag::{RagPipeline, user_collection};

use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::format::markdown_to_html;
use crate::history::{ApplicationRecord, ChatRecord, HistorySink};
use crate::parser::parse_email;
use crate::prompts;
use crate::storage::{DocumentStatus, DocumentStore};

/// The kind of application artifact to generate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// A full cover letter.
    CoverLetter,
    /// A short application email with a subject line.
    Email,
}

impl FromStr for ArtifactKind {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cover_letter" => Ok(Self::CoverLetter),
            "email" => Ok(Self::Email),
            other => Err(ServiceError::InvalidArtifactType(other.to_string())),
        }
    }
}

/// A generated application artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationDraft {
    /// Subject line; present for emails, absent for cover letters.
    pub subject: Option<String>,
    /// The artifact body as HTML.
    pub content: String,
}

/// The CV question-answering and application-generation service.
pub struct CvService {
    config: ServiceConfig,
    pipeline: Arc<RagPipeline>,
    model: Arc<dyn ChatModel>,
    documents: Arc<dyn DocumentStore>,
    history: Arc<dyn HistorySink>,
}

impl CvService {
    /// Create a new service with injected collaborators.
    pub fn new(
        config: ServiceConfig,
        pipeline: Arc<RagPipeline>,
        model: Arc<dyn ChatModel>,
        documents: Arc<dyn DocumentStore>,
        history: Arc<dyn HistorySink>,
    ) -> Self {
        Self { config, pipeline, model, documents, history }
    }

    /// Return the service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Fail with [`ServiceError::NotReady`] while the user's document is
    /// mid-ingestion.
    ///
    /// No status at all, or a `Failed` status, falls through: retrieval
    /// then reports `CollectionNotFound` for a user with no usable index,
    /// while a user whose re-upload failed can still query the intact
    /// previous index.
    async fn check_ready(&self, user_id: i64) -> Result<()> {
        match self.documents.status(user_id).await {
            Some(
                DocumentStatus::Uploaded | DocumentStatus::Chunking | DocumentStatus::Embedding,
            ) => Err(ServiceError::NotReady),
            _ => Ok(()),
        }
    }

    /// Answer a question about the user's CV.
    ///
    /// Returns plain answer text with no markup conversion.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotReady`] while ingestion is in progress
    /// - [`RagError::CollectionNotFound`](cvmate_rag::RagError::CollectionNotFound)
    ///   if the user has no indexed CV
    /// - model and retrieval errors propagated unchanged
    pub async fn answer_question(&self, user_id: i64, question: &str) -> Result<String> {
        self.check_ready(user_id).await?;

        let collection = user_collection(user_id);
        let context = self.pipeline.retrieve(&collection, question).await?;

        let user_prompt = prompts::qa_user(&context, question);
        let answer = self
            .model
            .generate(prompts::QA_SYSTEM, &user_prompt, &self.config.qa_params)
            .await?;

        let record = ChatRecord {
            user_id,
            question: question.to_string(),
            answer: answer.clone(),
            created_at: Utc::now(),
        };
        if let Err(e) = self.history.append_chat(record).await {
            warn!(user_id, error = %e, "failed to record chat history");
        }

        info!(user_id, answer_len = answer.len(), "answered question");
        Ok(answer)
    }

    /// Generate a cover letter or application email for a job description.
    ///
    /// Retrieval is keyed by the job description so the most relevant CV
    /// sections are surfaced. Email output is parsed for its subject line;
    /// both kinds get their body converted to HTML.
    pub async fn generate_application(
        &self,
        user_id: i64,
        job_description: &str,
        kind: ArtifactKind,
    ) -> Result<ApplicationDraft> {
        self.check_ready(user_id).await?;

        let collection = user_collection(user_id);
        let cv_context = self
            .pipeline
            .retrieve_with_k(&collection, job_description, self.config.application_top_k)
            .await?;

        let draft = match kind {
            ArtifactKind::CoverLetter => {
                let prompt = prompts::cover_letter_user(&cv_context, job_description);
                let content = self
                    .model
                    .generate(
                        prompts::COVER_LETTER_SYSTEM,
                        &prompt,
                        &self.config.cover_letter_params,
                    )
                    .await?;
                ApplicationDraft { subject: None, content: markdown_to_html(&content) }
            }
            ArtifactKind::Email => {
                let prompt = prompts::email_user(&cv_context, job_description);
                let raw = self
                    .model
                    .generate(prompts::EMAIL_SYSTEM, &prompt, &self.config.email_params)
                    .await?;
                let email = parse_email(&raw);
                ApplicationDraft {
                    subject: Some(email.subject),
                    content: markdown_to_html(&email.body),
                }
            }
        };

        let record = ApplicationRecord {
            user_id,
            kind,
            job_description: job_description.to_string(),
            subject: draft.subject.clone(),
            content: draft.content.clone(),
            created_at: Utc::now(),
        };
        if let Err(e) = self.history.append_application(record).await {
            warn!(user_id, error = %e, "failed to record application history");
        }

        info!(user_id, ?kind, content_len = draft.content.len(), "generated application");
        Ok(draft)
    }
}
