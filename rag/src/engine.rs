//! The retrieval-augmented answering engine.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use mailrag_embeddings::EmbeddingProvider;
use mailrag_index::{DateIndex, DateIndexStore, SearchHit, normalize, split_documents};
use mailrag_mail_client::MessageRecord;

use crate::config::RagConfig;
use crate::error::{RagError, Result};
use crate::generation::GenerationClient;

/// How an index for a date was obtained.
#[derive(Debug)]
pub enum IndexOutcome {
    /// A persisted index existed and was loaded, not rebuilt.
    Loaded(DateIndex),

    /// No index existed; one was built and persisted.
    Built(DateIndex),

    /// No index existed and there were no messages to index. Nothing was
    /// persisted; this is a valid terminal state, not an error.
    NoData,
}

impl IndexOutcome {
    /// The index, if this outcome carries one.
    pub fn index(&self) -> Option<&DateIndex> {
        match self {
            Self::Loaded(index) | Self::Built(index) => Some(index),
            Self::NoData => None,
        }
    }
}

/// Result of asking a question about a date's mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    /// The generated answer, returned verbatim from the model.
    Answer(String),

    /// There was no mail to index for the date.
    NoData,
}

/// Coordinates the per-date index lifecycle and question answering.
///
/// Holds no mutable global state: callers pass the date and that day's
/// records into each entry point.
pub struct RagEngine {
    config: RagConfig,

    /// Per-date index storage.
    store: DateIndexStore,

    /// Embedding provider; the same provider embeds chunks at build time
    /// and questions at query time.
    embeddings: Arc<dyn EmbeddingProvider>,

    /// Chat-completion client.
    generation: GenerationClient,
}

impl RagEngine {
    /// Create an engine over the configured store root.
    pub fn new(
        config: RagConfig,
        embeddings: Arc<dyn EmbeddingProvider>,
        generation: GenerationClient,
    ) -> Self {
        let store = DateIndexStore::new(&config.store_root);
        Self {
            config,
            store,
            embeddings,
            generation,
        }
    }

    /// The underlying index store.
    pub fn store(&self) -> &DateIndexStore {
        &self.store
    }

    /// Load the date's index if one is persisted, otherwise build it from
    /// the given records.
    ///
    /// The exists→build sequence runs under a per-date lock, so two
    /// concurrent calls for the same date result in exactly one build;
    /// different dates proceed independently. An empty day short-circuits
    /// to [`IndexOutcome::NoData`] before touching the store.
    pub async fn get_or_build(
        &self,
        date: NaiveDate,
        records: &[MessageRecord],
    ) -> Result<IndexOutcome> {
        let lock = self.store.build_lock(date).await;
        let _guard = lock.lock().await;

        if self.store.exists(date).await {
            debug!("Reusing persisted index for {date}");
            return Ok(IndexOutcome::Loaded(self.store.load(date).await?));
        }

        if records.is_empty() {
            info!("No messages for {date}, nothing to index");
            return Ok(IndexOutcome::NoData);
        }

        let documents: Vec<_> = records.iter().map(normalize).collect();
        let chunks = split_documents(&documents, &self.config.chunking);

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embeddings.embed_batch(&texts).await?;

        let index = self
            .store
            .build(date, chunks, embeddings, self.embeddings.model())
            .await?;

        info!(
            "Indexed {} chunks from {} messages for {date}",
            index.len(),
            records.len()
        );
        Ok(IndexOutcome::Built(index))
    }

    /// Answer a question from the given index.
    ///
    /// Embeds the question with the same provider the index was built with,
    /// retrieves the top-k chunks, and sends one prompt to the generation
    /// endpoint. The model's response is returned unmodified.
    pub async fn answer(&self, question: &str, index: &DateIndex) -> Result<String> {
        if question.trim().is_empty() {
            return Err(RagError::EmptyQuestion);
        }

        let query = self.embeddings.embed(question).await?;
        let hits = index.search_checked(self.embeddings.model(), &query, self.config.top_k)?;

        debug!("Retrieved {} chunks for question", hits.len());

        let prompt = compose_prompt(&hits, question);
        self.generation.complete(&prompt).await
    }

    /// Get-or-build the date's index and answer the question from it.
    pub async fn ask(
        &self,
        date: NaiveDate,
        records: &[MessageRecord],
        question: &str,
    ) -> Result<AskOutcome> {
        if question.trim().is_empty() {
            return Err(RagError::EmptyQuestion);
        }

        match self.get_or_build(date, records).await? {
            IndexOutcome::NoData => Ok(AskOutcome::NoData),
            IndexOutcome::Loaded(index) | IndexOutcome::Built(index) => {
                let answer = self.answer(question, &index).await?;
                Ok(AskOutcome::Answer(answer))
            }
        }
    }
}

/// Stuff the retrieved excerpts and the question into one prompt.
fn compose_prompt(hits: &[SearchHit<'_>], question: &str) -> String {
    let mut prompt = String::from(
        "Use the following email excerpts to answer the question. \
         If the excerpts do not contain the answer, say so.\n\n",
    );

    for hit in hits {
        prompt.push_str(&hit.chunk.text);
        prompt.push_str("\n---\n");
    }

    prompt.push_str("\nQuestion: ");
    prompt.push_str(question);
    prompt.push_str("\nAnswer:");
    prompt
}
