//! Error types for the RAG pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, RagError>;

/// Errors that can occur while answering questions over a date's mail.
///
/// "Nothing to index" and "no data for that day" are not errors; they are
/// modeled as [`crate::engine::IndexOutcome::NoData`] and
/// [`crate::engine::AskOutcome::NoData`].
#[derive(Error, Debug)]
pub enum RagError {
    /// The question was blank.
    #[error("question is empty")]
    EmptyQuestion,

    /// No generation API key configured.
    #[error("generation API key missing")]
    GenerationNotConfigured,

    /// The generation endpoint failed or returned an unusable response.
    #[error("generation request failed: {0}")]
    GenerationUnavailable(String),

    /// Index error.
    #[error("index error: {0}")]
    Index(#[from] mailrag_index::IndexError),

    /// Embedding error.
    #[error("embedding error: {0}")]
    Embedding(#[from] mailrag_embeddings::EmbeddingError),

    /// Mail fetch error.
    #[error("mail error: {0}")]
    Mail(#[from] mailrag_mail_client::MailError),
}
