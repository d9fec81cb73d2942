//! Data types for documents, chunks, and search results.

use serde::{Deserialize, Serialize};

/// A source document assembled from extracted page texts.
///
/// Documents are transient: they exist only for the duration of ingestion.
/// Page boundaries are recorded as character offsets into `text` so chunks
/// can carry a best-effort source page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Identifier of the document (derived from the owning user).
    pub id: String,
    /// The full text content, pages joined by a blank line.
    pub text: String,
    /// Character offset at which each page starts within `text`.
    pub page_offsets: Vec<usize>,
}

impl Document {
    /// Build a document from ordered page texts.
    ///
    /// Pages are joined with a blank line; the start offset of each page is
    /// recorded for page attribution during chunking.
    pub fn from_pages(id: impl Into<String>, pages: &[String]) -> Self {
        let mut text = String::new();
        let mut page_offsets = Vec::with_capacity(pages.len());
        for (i, page) in pages.iter().enumerate() {
            if i > 0 {
                text.push_str("\n\n");
            }
            page_offsets.push(text.chars().count());
            text.push_str(page);
        }
        Self { id: id.into(), text, page_offsets }
    }

    /// Build a single-page document from plain text.
    pub fn from_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), page_offsets: vec![0] }
    }

    /// Best-effort page number (1-based) for a character offset into `text`.
    pub fn page_at(&self, char_offset: usize) -> u32 {
        let idx = self.page_offsets.partition_point(|&start| start <= char_offset);
        idx.max(1) as u32
    }
}

/// A contiguous text span extracted from a [`Document`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier, `{document_id}_{position}`.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// Sequence position within the source document (0-based).
    pub position: usize,
    /// Best-effort source page (1-based).
    pub page: u32,
    /// The vector embedding for this chunk's text. Empty until embedded.
    pub embedding: Vec<f32>,
    /// The ID of the parent [`Document`].
    pub document_id: String,
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The cosine similarity score (higher is more relevant).
    pub score: f32,
}

/// Descriptor persisted with each collection, recording how it was built.
///
/// Queries against a collection whose `embedder` fingerprint differs from
/// the querying provider's are rejected rather than silently compared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionMeta {
    /// Dimensionality of the stored vectors.
    pub dimensions: usize,
    /// Fingerprint of the embedding provider that built the collection.
    pub embedder: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pages_records_offsets() {
        let pages = vec!["first".to_string(), "second".to_string()];
        let doc = Document::from_pages("doc", &pages);
        assert_eq!(doc.text, "first\n\nsecond");
        assert_eq!(doc.page_offsets, vec![0, 7]);
        assert_eq!(doc.page_at(0), 1);
        assert_eq!(doc.page_at(6), 1);
        assert_eq!(doc.page_at(7), 2);
        assert_eq!(doc.page_at(100), 2);
    }
}
