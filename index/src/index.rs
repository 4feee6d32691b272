//! In-memory similarity search over one date's chunks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use mailrag_embeddings::{Embedding, EmbeddingError, rank_top_k};

use crate::chunker::Chunk;
use crate::error::{IndexError, Result};

/// One indexed chunk with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// The chunk text and its document reference.
    pub chunk: Chunk,

    /// The chunk's embedding vector.
    pub embedding: Embedding,
}

/// A chunk matched by a similarity search.
#[derive(Debug, Clone, Copy)]
pub struct SearchHit<'a> {
    /// The matched chunk.
    pub chunk: &'a Chunk,

    /// Cosine similarity against the query.
    pub score: f32,
}

/// The retrieval index for one calendar date.
///
/// Entries keep their build order, which is the tie-break order for equal
/// similarity scores. The embedding model identifier is recorded so a query
/// embedded with a different model is rejected instead of silently compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateIndex {
    /// The calendar date this index covers.
    date: NaiveDate,

    /// Identifier of the model the entries were embedded with.
    model: String,

    /// Vector dimension.
    dimension: usize,

    /// Indexed chunks in build order.
    entries: Vec<IndexEntry>,
}

impl DateIndex {
    pub(crate) fn new(
        date: NaiveDate,
        model: impl Into<String>,
        dimension: usize,
        entries: Vec<IndexEntry>,
    ) -> Self {
        Self {
            date,
            model: model.into(),
            dimension,
            entries,
        }
    }

    /// The date this index covers.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The embedding model the index was built with.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Vector dimension of the stored embeddings.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Search for the chunks most similar to the query embedding.
    ///
    /// Returns up to `top_k` hits in descending similarity order; ties keep
    /// build order. An index smaller than `top_k` returns everything it has.
    pub fn search(&self, query: &Embedding, top_k: usize) -> Result<Vec<SearchHit<'_>>> {
        if query.len() != self.dimension {
            return Err(IndexError::Embedding(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            }));
        }

        let candidates: Vec<Embedding> = self
            .entries
            .iter()
            .map(|e| e.embedding.clone())
            .collect();

        let ranked = rank_top_k(query, &candidates, top_k).map_err(IndexError::Embedding)?;

        Ok(ranked
            .into_iter()
            .map(|m| SearchHit {
                chunk: &self.entries[m.index].chunk,
                score: m.score,
            })
            .collect())
    }

    /// Search, first verifying the query was embedded with the index's model.
    pub fn search_checked(
        &self,
        query_model: &str,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchHit<'_>>> {
        if query_model != self.model {
            return Err(IndexError::ModelMismatch {
                index_model: self.model.clone(),
                query_model: query_model.to_string(),
            });
        }
        self.search(query, top_k)
    }
}
