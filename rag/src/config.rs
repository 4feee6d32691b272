//! Configuration for the RAG pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use mailrag_index::ChunkConfig;

/// Configuration for [`crate::RagEngine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Root directory for per-date index storage.
    pub store_root: PathBuf,

    /// Chunking parameters used when building an index.
    pub chunking: ChunkConfig,

    /// Number of chunks retrieved per question.
    pub top_k: usize,
}

impl RagConfig {
    /// Create a configuration with default chunking and retrieval settings.
    pub fn new(store_root: impl Into<PathBuf>) -> Self {
        Self {
            store_root: store_root.into(),
            chunking: ChunkConfig::default(),
            top_k: 4,
        }
    }

    /// Set the chunking parameters.
    pub fn with_chunking(mut self, chunking: ChunkConfig) -> Self {
        self.chunking = chunking;
        self
    }

    /// Set the number of chunks retrieved per question.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

impl Default for RagConfig {
    fn default() -> Self {
        Self::new("vector_store")
    }
}
