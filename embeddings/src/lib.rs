//! # Embeddings
//!
//! Embedding generation and similarity ranking for the mailrag pipeline.
//!
//! A [`EmbeddingProvider`] turns text into dense vectors over an
//! OpenAI-compatible HTTP API. [`rank_top_k`] orders candidate vectors by
//! cosine similarity against a query vector, and [`CachedProvider`] wraps
//! any provider with an in-memory (text, model) cache so repeated chunks
//! are only embedded once.

pub mod cache;
pub mod error;
pub mod provider;
pub mod similarity;

pub use cache::{CachedProvider, EmbeddingCache};
pub use error::{EmbeddingError, Result};
pub use provider::{EmbeddingProvider, OpenAiCompatProvider};
pub use similarity::{RankedMatch, cosine_similarity, rank_top_k};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;
