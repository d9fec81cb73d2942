//! History records emitted by the service.
//!
//! The core only emits records; persistence and ownership enforcement
//! belong to the collaborator behind [`HistorySink`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::service::ArtifactKind;

/// A history write failed in the backing store.
#[derive(Debug, Error)]
#[error("History write failed: {0}")]
pub struct HistoryError(pub String);

/// A question/answer pair from the chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRecord {
    /// The owning user.
    pub user_id: i64,
    /// The question asked.
    pub question: String,
    /// The answer returned (plain text).
    pub answer: String,
    /// When the exchange happened.
    pub created_at: DateTime<Utc>,
}

/// A generated application artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationRecord {
    /// The owning user.
    pub user_id: i64,
    /// The artifact type that was generated.
    pub kind: ArtifactKind,
    /// The job description the artifact was generated for.
    pub job_description: String,
    /// Subject line, present for emails only.
    pub subject: Option<String>,
    /// The generated content (HTML).
    pub content: String,
    /// When the artifact was generated.
    pub created_at: DateTime<Utc>,
}

/// Append-only sink for history records.
///
/// Sink failures are logged by the service but never fail the user-facing
/// operation: the answer was already produced.
#[async_trait]
pub trait HistorySink: Send + Sync {
    /// Record a chat exchange.
    async fn append_chat(&self, record: ChatRecord) -> Result<(), HistoryError>;

    /// Record a generated application artifact.
    async fn append_application(&self, record: ApplicationRecord) -> Result<(), HistoryError>;
}

/// An in-memory [`HistorySink`] for tests and development.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    chats: tokio::sync::Mutex<Vec<ChatRecord>>,
    applications: tokio::sync::Mutex<Vec<ApplicationRecord>>,
}

impl InMemoryHistory {
    /// Create a new empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded chat exchanges.
    pub async fn chats(&self) -> Vec<ChatRecord> {
        self.chats.lock().await.clone()
    }

    /// Snapshot of recorded application artifacts.
    pub async fn applications(&self) -> Vec<ApplicationRecord> {
        self.applications.lock().await.clone()
    }
}

#[async_trait]
impl HistorySink for InMemoryHistory {
    async fn append_chat(&self, record: ChatRecord) -> Result<(), HistoryError> {
        self.chats.lock().await.push(record);
        Ok(())
    }

    async fn append_application(&self, record: ApplicationRecord) -> Result<(), HistoryError> {
        self.applications.lock().await.push(record);
        Ok(())
    }
}
