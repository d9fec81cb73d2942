//! Background document ingestion with per-user serialization.
//!
//! Uploads return immediately; the chunk → embed → index sequence runs in
//! a spawned task and flips the document's [`DocumentStatus`] at each
//! stage boundary. At most one ingestion is in flight per user: a new
//! submission aborts and replaces any running one, so two uploads for the
//! same user can never race.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use cvmate_rag::{Document, RagPipeline, user_collection};

use crate::error::{Result, ServiceError};
use crate::storage::{DocumentFetcher, DocumentStatus, DocumentStore, TextExtractor};

/// Runs document ingestion off the request path.
///
/// A failed ingestion marks the document [`DocumentStatus::Failed`] and
/// leaves any previously indexed collection untouched — the pipeline's
/// rebuild is all-or-nothing, so the caller may simply re-submit.
pub struct IngestionManager {
    pipeline: Arc<RagPipeline>,
    fetcher: Arc<dyn DocumentFetcher>,
    extractor: Arc<dyn TextExtractor>,
    documents: Arc<dyn DocumentStore>,
    in_flight: Mutex<HashMap<i64, JoinHandle<()>>>,
}

impl IngestionManager {
    /// Create a new manager.
    pub fn new(
        pipeline: Arc<RagPipeline>,
        fetcher: Arc<dyn DocumentFetcher>,
        extractor: Arc<dyn TextExtractor>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self { pipeline, fetcher, extractor, documents, in_flight: Mutex::new(HashMap::new()) }
    }

    /// Start ingesting the document at `url` for `user_id`.
    ///
    /// Returns once the job is scheduled; progress is observable via the
    /// [`DocumentStore`]. Any in-flight ingestion for the same user is
    /// aborted and replaced.
    pub async fn submit(&self, user_id: i64, url: impl Into<String>) {
        let url = url.into();
        let mut in_flight = self.in_flight.lock().await;
        in_flight.retain(|_, handle| !handle.is_finished());
        if let Some(previous) = in_flight.remove(&user_id) {
            previous.abort();
            warn!(user_id, "aborted in-flight ingestion for re-upload");
        }

        self.documents.set_status(user_id, DocumentStatus::Uploaded).await;

        let pipeline = Arc::clone(&self.pipeline);
        let fetcher = Arc::clone(&self.fetcher);
        let extractor = Arc::clone(&self.extractor);
        let documents = Arc::clone(&self.documents);

        let handle = tokio::spawn(async move {
            let outcome =
                run_ingestion(&pipeline, &*fetcher, &*extractor, &*documents, user_id, &url)
                    .await;
            match outcome {
                Ok(chunk_count) => {
                    documents.set_status(user_id, DocumentStatus::Indexed).await;
                    info!(user_id, chunk_count, "document indexed");
                }
                Err(e) => {
                    error!(user_id, error = %e, "ingestion failed");
                    documents
                        .set_status(user_id, DocumentStatus::Failed { reason: e.to_string() })
                        .await;
                }
            }
        });

        in_flight.insert(user_id, handle);
    }

    /// Number of ingestion tasks currently tracked. Finished tasks are
    /// reaped on the next [`submit`](IngestionManager::submit).
    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    /// Wait for the user's in-flight ingestion (if any) to finish.
    ///
    /// Intended for tests and graceful shutdown; production callers poll
    /// the status instead.
    pub async fn wait(&self, user_id: i64) {
        let handle = self.in_flight.lock().await.remove(&user_id);
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Remove the user's document: abort in-flight work, drop the vector
    /// collection, clear the status. Idempotent.
    pub async fn remove(&self, user_id: i64) -> Result<()> {
        if let Some(handle) = self.in_flight.lock().await.remove(&user_id) {
            handle.abort();
        }
        self.pipeline.drop_collection(&user_collection(user_id)).await?;
        self.documents.clear(user_id).await;
        info!(user_id, "removed document and collection");
        Ok(())
    }
}

/// The ingestion job body: fetch → extract → chunk → embed → index.
///
/// Document bytes exist only within this function's scope; nothing is
/// written to disk.
async fn run_ingestion(
    pipeline: &RagPipeline,
    fetcher: &dyn DocumentFetcher,
    extractor: &dyn TextExtractor,
    documents: &dyn DocumentStore,
    user_id: i64,
    url: &str,
) -> Result<usize> {
    let bytes = fetcher.fetch(url).await?;
    let pages = extractor.extract(&bytes)?;
    drop(bytes);

    let document = Document::from_pages(format!("cv_{user_id}"), &pages);

    documents.set_status(user_id, DocumentStatus::Chunking).await;
    let chunks = pipeline.chunk_document(&document);

    documents.set_status(user_id, DocumentStatus::Embedding).await;
    let chunk_count = pipeline
        .index_chunks(&user_collection(user_id), &document, chunks)
        .await
        .map_err(ServiceError::Rag)?;

    Ok(chunk_count)
}
