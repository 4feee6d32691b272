//! Similarity computation and top-k ranking.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// Compute the cosine similarity between two embeddings.
///
/// Returns a value between -1.0 and 1.0. Zero-magnitude vectors compare as
/// 0.0 rather than producing NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot_product / (magnitude_a * magnitude_b))
}

/// A ranked similarity match: the candidate's position in the input slice
/// and its score against the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    /// Position of the matched candidate in the input order.
    pub index: usize,

    /// Cosine similarity score.
    pub score: f32,
}

/// Rank candidates by cosine similarity against the query, highest first.
///
/// Returns at most `k` matches. Ties keep the candidates' original order:
/// the sort is stable and only compares scores.
pub fn rank_top_k(query: &Embedding, candidates: &[Embedding], k: usize) -> Result<Vec<RankedMatch>> {
    let mut scores: Vec<(OrderedFloat<f32>, usize)> = Vec::with_capacity(candidates.len());

    for (index, embedding) in candidates.iter().enumerate() {
        let score = cosine_similarity(query, embedding)?;
        scores.push((OrderedFloat(score), index));
    }

    // Stable sort by score descending; equal scores retain input order.
    scores.sort_by(|a, b| b.0.cmp(&a.0));

    Ok(scores
        .into_iter()
        .take(k)
        .map(|(score, index)| RankedMatch {
            index,
            score: score.0,
        })
        .collect())
}
