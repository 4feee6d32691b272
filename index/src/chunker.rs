//! Fixed-size overlapping chunking of normalized documents.

use serde::{Deserialize, Serialize};

use crate::document::MailDocument;
use crate::error::{IndexError, Result};

/// Chunking parameters.
///
/// Each chunk after the first starts `chunk_size - overlap` characters after
/// the previous chunk's start, so overlap must stay strictly below the chunk
/// size for the splitter to make progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks.
    pub overlap: usize,
}

impl ChunkConfig {
    /// Create a validated config. Requires `chunk_size > 0` and
    /// `overlap < chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 || overlap >= chunk_size {
            return Err(IndexError::InvalidChunking {
                chunk_size,
                overlap,
            });
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Distance between consecutive chunk starts.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 100,
        }
    }
}

/// A bounded-length text segment, the unit indexed for retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// The segment text.
    pub text: String,

    /// Position of the source document in the input sequence.
    pub doc_index: usize,
}

/// Split documents into overlapping fixed-size chunks.
///
/// Documents are split independently; output order is document order, then
/// position within the document. Every character of each document is covered
/// with no gaps, the terminal chunk may be short, and a zero-length document
/// yields no chunks. Boundaries may split sentences.
pub fn split_documents(documents: &[MailDocument], config: &ChunkConfig) -> Vec<Chunk> {
    let mut chunks = Vec::new();

    for (doc_index, document) in documents.iter().enumerate() {
        for text in split_content(&document.content, config) {
            chunks.push(Chunk { text, doc_index });
        }
    }

    chunks
}

/// Split a single document's content into chunk texts.
fn split_content(content: &str, config: &ChunkConfig) -> Vec<String> {
    // Chunk boundaries are measured in characters, not bytes, so a chunk
    // never splits a multi-byte sequence.
    let chars: Vec<char> = content.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + config.chunk_size).min(chars.len());
        out.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += config.stride();
    }

    out
}
