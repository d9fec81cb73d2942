//! Collaborator contracts: blob fetching, text extraction, and document
//! status tracking.
//!
//! The service never owns user/document rows or blob buckets; it talks to
//! them through these traits. In-memory implementations are provided for
//! tests and single-process development.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{Result, ServiceError};

/// Ingestion state of a user's document.
///
/// `Uploaded → Chunking → Embedding → Indexed | Failed`. Queries require
/// `Indexed`; anything earlier is "not ready", and `Failed` carries the
/// reason for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DocumentStatus {
    /// The document is stored but processing has not started.
    Uploaded,
    /// The document text is being split into chunks.
    Chunking,
    /// Chunk embeddings are being generated.
    Embedding,
    /// The document is fully indexed and queryable.
    Indexed,
    /// Processing failed; the previous index (if any) is still intact.
    Failed {
        /// Why processing failed.
        reason: String,
    },
}

/// Tracks per-user document status. Owned by the relational-store
/// collaborator in production.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// The current status of the user's document, if one was ever uploaded.
    async fn status(&self, user_id: i64) -> Option<DocumentStatus>;

    /// Record a status transition.
    async fn set_status(&self, user_id: i64, status: DocumentStatus);

    /// Forget the user's document entirely.
    async fn clear(&self, user_id: i64);
}

/// Fetches document bytes from blob storage by URL.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Download the document. The bytes live only as long as the caller
    /// keeps them; nothing is written to disk.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Extracts page texts from raw document bytes.
pub trait TextExtractor: Send + Sync {
    /// Return the document's pages in order. A document without page
    /// structure yields a single page.
    fn extract(&self, bytes: &[u8]) -> Result<Vec<String>>;
}

/// A [`TextExtractor`] for plain-text documents.
///
/// Pages are separated by form-feed characters, the convention used by
/// most text exports.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ServiceError::Extraction(format!("document is not valid UTF-8: {e}")))?;
        Ok(text.split('\u{0c}').map(|page| page.trim().to_string()).collect())
    }
}

/// A [`TextExtractor`] for PDF documents (feature `pdf`, on by default).
///
/// Text is pulled with the `pdf-extract` crate; when extraction fails,
/// `lopdf` is used to tell an unreadable file apart from a font or
/// encoding problem. Page breaks reported by the extractor become page
/// boundaries; a PDF without them is treated as a single page.
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

#[cfg(feature = "pdf")]
impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
            match lopdf::Document::load_mem(bytes) {
                Err(load) => ServiceError::Extraction(format!("not a readable PDF: {load}")),
                Ok(_) => ServiceError::Extraction(format!("PDF text extraction failed: {e}")),
            }
        })?;

        let pages: Vec<String> = text
            .replace('\0', "")
            .split('\u{0c}')
            .map(clean_pdf_page)
            .filter(|page| !page.is_empty())
            .collect();

        if pages.is_empty() {
            return Err(ServiceError::Extraction(
                "no text content could be extracted from PDF".to_string(),
            ));
        }
        Ok(pages)
    }
}

/// Trim line ends and collapse blank-line runs to one, keeping paragraph
/// boundaries intact for the chunker.
#[cfg(feature = "pdf")]
fn clean_pdf_page(raw: &str) -> String {
    let mut out = String::new();
    let mut blank_run = false;
    for line in raw.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run = true;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run { "\n\n" } else { "\n" });
        }
        blank_run = false;
        out.push_str(line);
    }
    out
}

/// An in-memory [`DocumentStore`] for tests and development.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    statuses: RwLock<HashMap<i64, DocumentStatus>>,
}

impl InMemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn status(&self, user_id: i64) -> Option<DocumentStatus> {
        self.statuses.read().await.get(&user_id).cloned()
    }

    async fn set_status(&self, user_id: i64, status: DocumentStatus) {
        self.statuses.write().await.insert(user_id, status);
    }

    async fn clear(&self, user_id: i64) {
        self.statuses.write().await.remove(&user_id);
    }
}

/// A [`DocumentFetcher`] that downloads over HTTP with a bounded timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a new fetcher with a 30 second request timeout.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ServiceError::Fetch(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ServiceError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Fetch(format!("{status} fetching {url}")));
        }

        let bytes = response.bytes().await.map_err(|e| ServiceError::Fetch(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// A [`DocumentFetcher`] that serves from an in-memory map, for tests.
#[derive(Debug, Default)]
pub struct InMemoryFetcher {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryFetcher {
    /// Create a new empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store bytes under a URL.
    pub async fn put(&self, url: impl Into<String>, bytes: Vec<u8>) {
        self.blobs.write().await.insert(url.into(), bytes);
    }
}

#[async_trait]
impl DocumentFetcher for InMemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.blobs
            .read()
            .await
            .get(url)
            .cloned()
            .ok_or_else(|| ServiceError::Fetch(format!("no blob stored at {url}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_extractor_splits_on_form_feed() {
        let bytes = b"page one\x0cpage two\x0cpage three";
        let pages = PlainTextExtractor.extract(bytes).unwrap();
        assert_eq!(pages, vec!["page one", "page two", "page three"]);
    }

    #[test]
    fn plain_text_extractor_rejects_invalid_utf8() {
        let err = PlainTextExtractor.extract(&[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, ServiceError::Extraction(_)));
    }

    #[cfg(feature = "pdf")]
    fn minimal_pdf(text: &str) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{Document, Object, Stream, dictionary};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 13.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id =
            doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        doc.objects.insert(
            pages_id,
            lopdf::Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_extractor_reads_generated_pdf() {
        let bytes = minimal_pdf("Jane Doe studied at Aalto University");
        let pages = PdfExtractor.extract(&bytes).unwrap();
        assert!(!pages.is_empty());
        let all = pages.join("\n");
        assert!(all.contains("Aalto"), "extracted text missing content: {all}");
        assert!(all.contains("University"));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_extractor_rejects_unreadable_bytes() {
        let bytes = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\nnot actually a PDF body";
        let err = PdfExtractor.extract(bytes).unwrap_err();
        assert!(matches!(err, ServiceError::Extraction(_)));
    }

    #[tokio::test]
    async fn document_store_round_trips_status() {
        let store = InMemoryDocumentStore::new();
        assert_eq!(store.status(1).await, None);
        store.set_status(1, DocumentStatus::Indexed).await;
        assert_eq!(store.status(1).await, Some(DocumentStatus::Indexed));
        store.clear(1).await;
        assert_eq!(store.status(1).await, None);
    }
}
