//! Persistent storage for per-date indices.
//!
//! One directory per calendar date under a stable root, with a canonical
//! `index.json` inside. Presence of that file is the existence check, so a
//! date is "indexed" only once a build has fully committed. Builds write to
//! a temp file, fsync, then rename, which makes the commit atomic: a crash
//! mid-build leaves nothing discoverable for the date.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use mailrag_embeddings::Embedding;

use crate::chunker::Chunk;
use crate::error::{IndexError, Result};
use crate::index::{DateIndex, IndexEntry};

/// Canonical index file name inside a date's directory.
const INDEX_FILE: &str = "index.json";

/// Storage for per-date indices.
pub struct DateIndexStore {
    /// Root directory; one subdirectory per date.
    root: PathBuf,

    /// Per-date build locks. Holding a date's lock across the exists→build
    /// sequence makes get-or-build logically atomic for that date while
    /// leaving other dates free to build concurrently.
    build_locks: Mutex<HashMap<NaiveDate, Arc<Mutex<()>>>>,
}

impl DateIndexStore {
    /// Create a store rooted at the given directory. The directory is only
    /// created once something is persisted.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            build_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn date_dir(&self, date: NaiveDate) -> PathBuf {
        self.root.join(date.to_string())
    }

    fn index_path(&self, date: NaiveDate) -> PathBuf {
        self.date_dir(date).join(INDEX_FILE)
    }

    /// Get the build lock for a date, creating it on first use.
    pub async fn build_lock(&self, date: NaiveDate) -> Arc<Mutex<()>> {
        let mut locks = self.build_locks.lock().await;
        locks
            .entry(date)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Check persisted storage for the date.
    pub async fn exists(&self, date: NaiveDate) -> bool {
        fs::try_exists(self.index_path(date)).await.unwrap_or(false)
    }

    /// Load the persisted index for the date.
    pub async fn load(&self, date: NaiveDate) -> Result<DateIndex> {
        let path = self.index_path(date);

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(IndexError::NotFound(date));
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| IndexError::ReadFile(format!("{}: {e}", path.display())))?;

        let index: DateIndex = serde_json::from_str(&content).map_err(|e| IndexError::Corrupt {
            date,
            reason: e.to_string(),
        })?;

        debug!("Loaded index for {date} with {} entries", index.len());
        Ok(index)
    }

    /// Build and persist the index for the date.
    ///
    /// Fails with [`IndexError::EmptyInput`] when there are no chunks; an
    /// empty day must be short-circuited by the caller before reaching the
    /// store. The write is durable before this returns.
    pub async fn build(
        &self,
        date: NaiveDate,
        chunks: Vec<Chunk>,
        embeddings: Vec<Embedding>,
        model: &str,
    ) -> Result<DateIndex> {
        if chunks.is_empty() {
            return Err(IndexError::EmptyInput);
        }
        if chunks.len() != embeddings.len() {
            return Err(IndexError::EntryMismatch {
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }

        let dimension = embeddings[0].len();
        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();

        let index = DateIndex::new(date, model, dimension, entries);
        self.persist(&index).await?;

        info!("Built index for {date} with {} entries", index.len());
        Ok(index)
    }

    /// Write the index to its date directory: temp file, fsync, rename.
    async fn persist(&self, index: &DateIndex) -> Result<()> {
        let dir = self.date_dir(index.date());
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| IndexError::CreateDirectory(format!("{}: {e}", dir.display())))?;

        let path = self.index_path(index.date());
        let temp_path = path.with_extension("json.tmp");
        let content = serde_json::to_string(index)?;

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| IndexError::WriteFile(format!("{}: {e}", temp_path.display())))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| IndexError::WriteFile(format!("{}: {e}", temp_path.display())))?;
        file.sync_all()
            .await
            .map_err(|e| IndexError::WriteFile(format!("{}: {e}", temp_path.display())))?;
        drop(file);

        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| IndexError::WriteFile(format!("{}: {e}", path.display())))?;

        debug!("Persisted index to {}", path.display());
        Ok(())
    }
}
