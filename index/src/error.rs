//! Error types for the index system.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors that can occur while building, loading, or searching indices.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Chunking parameters violate `0 <= overlap < chunk_size`.
    #[error("invalid chunking: chunk_size {chunk_size}, overlap {overlap}")]
    InvalidChunking { chunk_size: usize, overlap: usize },

    /// `build` was called with nothing to index. Callers must short-circuit
    /// an empty day before reaching the store.
    #[error("nothing to index")]
    EmptyInput,

    /// Chunk and embedding counts differ.
    #[error("entry mismatch: {chunks} chunks, {embeddings} embeddings")]
    EntryMismatch { chunks: usize, embeddings: usize },

    /// No persisted index for the date.
    #[error("no index for {0}")]
    NotFound(NaiveDate),

    /// Storage exists for the date but cannot be deserialized.
    #[error("index for {date} is corrupt: {reason}")]
    Corrupt { date: NaiveDate, reason: String },

    /// The index was built with a different embedding model than the query.
    #[error("model mismatch: index built with {index_model}, queried with {query_model}")]
    ModelMismatch {
        index_model: String,
        query_model: String,
    },

    /// Embedding error.
    #[error("embedding error: {0}")]
    Embedding(#[from] mailrag_embeddings::EmbeddingError),

    /// Failed to create the storage directory.
    #[error("failed to create directory: {0}")]
    CreateDirectory(String),

    /// Failed to read from storage.
    #[error("failed to read file: {0}")]
    ReadFile(String),

    /// Failed to write to storage.
    #[error("failed to write file: {0}")]
    WriteFile(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
