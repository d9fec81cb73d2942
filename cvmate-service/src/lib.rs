//! # cvmate-service
//!
//! The application layer of the cvmate CV assistant: upload a résumé, ask
//! questions about it, and draft tailored cover letters and application
//! emails via retrieval-augmented generation.
//!
//! The service composes the RAG core (`cvmate-rag`) with a chat model
//! (`cvmate-model`) and talks to everything stateful — blob storage,
//! document status rows, history rows — through narrow collaborator traits
//! ([`DocumentFetcher`], [`DocumentStore`], [`HistorySink`]). In-memory
//! implementations of each are included for tests and development.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cvmate_service::{
//!     ArtifactKind, CvService, IngestionManager, InMemoryDocumentStore, InMemoryHistory,
//!     PlainTextExtractor, ServiceConfig,
//! };
//!
//! let documents = Arc::new(InMemoryDocumentStore::new());
//! let ingestion = IngestionManager::new(
//!     Arc::clone(&pipeline),
//!     Arc::new(fetcher),
//!     Arc::new(PlainTextExtractor),
//!     documents.clone(),
//! );
//! let service = CvService::new(
//!     ServiceConfig::default(),
//!     pipeline,
//!     model,
//!     documents,
//!     Arc::new(InMemoryHistory::new()),
//! );
//!
//! ingestion.submit(user_id, cv_url).await;
//! // ... poll status until Indexed ...
//! let answer = service.answer_question(user_id, "What languages do they know?").await?;
//! let draft = service
//!     .generate_application(user_id, job_description, ArtifactKind::Email)
//!     .await?;
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod history;
pub mod ingest;
pub mod parser;
pub mod prompts;
pub mod service;
pub mod storage;

pub use config::ServiceConfig;
pub use error::{Result, ServiceError};
pub use format::markdown_to_html;
pub use history::{ApplicationRecord, ChatRecord, HistoryError, HistorySink, InMemoryHistory};
pub use ingest::IngestionManager;
pub use parser::{DEFAULT_SUBJECT, EmailDraft, parse_email};
pub use service::{ApplicationDraft, ArtifactKind, CvService};
pub use storage::{
    DocumentFetcher, DocumentStatus, DocumentStore, HttpFetcher, InMemoryDocumentStore,
    InMemoryFetcher, PlainTextExtractor, TextExtractor,
};
#[cfg(feature = "pdf")]
pub use storage::PdfExtractor;
