//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`FixedSizeChunker`] — splits by character count with exact overlap
//! - [`RecursiveChunker`] — prefers paragraph, sentence, then word boundaries
//!
//! Both are deterministic: the same input and configuration always produce
//! the same chunk sequence. Sizes and overlaps are measured in characters
//! and all slicing is char-boundary safe.

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text, position, and a best-effort
/// source page, but no embeddings. Embeddings are attached later by the
/// pipeline.
pub trait Chunker: Send + Sync {
    /// Split a document into ordered chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Validate a `(chunk_size, overlap)` pair.
fn validate(chunk_size: usize, chunk_overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(RagError::Config("chunk_size must be greater than zero".to_string()));
    }
    if chunk_overlap >= chunk_size {
        return Err(RagError::Config(format!(
            "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}

/// Build a [`Chunk`] from a text span and its char offset in the document.
fn make_chunk(document: &Document, position: usize, char_offset: usize, text: String) -> Chunk {
    Chunk {
        id: format!("{}_{position}", document.id),
        text,
        position,
        page: document.page_at(char_offset),
        embedding: Vec::new(),
        document_id: document.id.clone(),
    }
}

/// Splits text into fixed-size chunks by character count.
///
/// Consecutive chunks share exactly `chunk_overlap` characters, except
/// possibly the final chunk, and together cover the whole input with no
/// gaps.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `chunk_overlap >= chunk_size` or
    /// `chunk_size == 0`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate(chunk_size, chunk_overlap)?;
        Ok(Self { chunk_size, chunk_overlap })
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = document.text.chars().collect();
        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            let text: String = chars[start..end].iter().collect();
            chunks.push(make_chunk(document, chunks.len(), start, text));
            if end == chars.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}

/// A text span with its char offset in the source document.
#[derive(Debug, Clone)]
struct Segment {
    text: String,
    char_offset: usize,
    char_len: usize,
}

/// Split `text` at `separator`, keeping the separator attached to the
/// preceding segment. Offsets are char offsets relative to `base`.
fn split_keeping_separator(text: &str, base: usize, separator: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = text;
    let mut offset = base;

    while let Some(pos) = rest.find(separator) {
        let end = pos + separator.len();
        let piece = &rest[..end];
        let len = piece.chars().count();
        segments.push(Segment { text: piece.to_string(), char_offset: offset, char_len: len });
        offset += len;
        rest = &rest[end..];
    }

    if !rest.is_empty() {
        segments.push(Segment {
            text: rest.to_string(),
            char_offset: offset,
            char_len: rest.chars().count(),
        });
    }

    segments
}

/// Hard character cut for text with no usable boundaries left.
fn split_by_size(text: &str, base: usize, chunk_size: usize) -> Vec<Segment> {
    let chars: Vec<char> = text.chars().collect();
    let mut segments = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        segments.push(Segment {
            text: chars[start..end].iter().collect(),
            char_offset: base + start,
            char_len: end - start,
        });
        start = end;
    }
    segments
}

/// Break text into leaf segments no longer than `chunk_size`, preferring
/// the given separators in order before falling back to hard cuts.
fn leaf_segments(text: &str, base: usize, chunk_size: usize, separators: &[&str]) -> Vec<Segment> {
    if text.chars().count() <= chunk_size {
        if text.is_empty() {
            return Vec::new();
        }
        return vec![Segment {
            text: text.to_string(),
            char_offset: base,
            char_len: text.chars().count(),
        }];
    }

    let Some((separator, remaining)) = separators.split_first() else {
        return split_by_size(text, base, chunk_size);
    };

    let pieces = split_keeping_separator(text, base, separator);
    if pieces.len() <= 1 {
        // Separator not present — try the next level down.
        return leaf_segments(text, base, chunk_size, remaining);
    }

    let mut segments = Vec::new();
    for piece in pieces {
        if piece.char_len <= chunk_size {
            segments.push(piece);
        } else {
            segments.extend(leaf_segments(&piece.text, piece.char_offset, chunk_size, remaining));
        }
    }
    segments
}

/// Splits text hierarchically: paragraphs, then sentences, then words.
///
/// Segments are greedily merged up to `chunk_size`; when a chunk is full,
/// trailing segments totalling at most `chunk_overlap` characters are
/// carried into the next chunk, so overlap happens on structural
/// boundaries rather than mid-word.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    const SEPARATORS: [&'static str; 5] = ["\n\n", "\n", ". ", "! ", " "];

    /// Create a new `RecursiveChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `chunk_overlap >= chunk_size` or
    /// `chunk_size == 0`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate(chunk_size, chunk_overlap)?;
        Ok(Self { chunk_size, chunk_overlap })
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let segments = leaf_segments(&document.text, 0, self.chunk_size, &Self::SEPARATORS);
        let mut chunks = Vec::new();
        // The window of segments forming the chunk under construction.
        let mut window: Vec<Segment> = Vec::new();
        let mut window_len = 0;

        for segment in segments {
            if !window.is_empty() && window_len + segment.char_len > self.chunk_size {
                let text: String = window.iter().map(|s| s.text.as_str()).collect();
                chunks.push(make_chunk(document, chunks.len(), window[0].char_offset, text));

                // Carry trailing segments into the next chunk as overlap,
                // leaving room so the new chunk still fits chunk_size.
                let budget =
                    self.chunk_overlap.min(self.chunk_size.saturating_sub(segment.char_len));
                let mut carried = Vec::new();
                let mut carried_len = 0;
                for seg in window.iter().rev() {
                    if carried_len + seg.char_len > budget {
                        break;
                    }
                    carried_len += seg.char_len;
                    carried.push(seg.clone());
                }
                carried.reverse();
                window = carried;
                window_len = carried_len;
            }
            window_len += segment.char_len;
            window.push(segment);
        }

        if !window.is_empty() {
            let text: String = window.iter().map(|s| s.text.as_str()).collect();
            chunks.push(make_chunk(document, chunks.len(), window[0].char_offset, text));
        }

        chunks
    }
}
