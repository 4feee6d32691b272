//! Integration tests for the per-date index lifecycle and answering flow.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mailrag_embeddings::{Embedding, EmbeddingProvider};
use mailrag_index::ChunkConfig;
use mailrag_mail_client::MessageRecord;
use mailrag_rag::{AskOutcome, GenerationClient, IndexOutcome, RagConfig, RagEngine, RagError};

/// Deterministic embedding provider with build-count probes.
///
/// Vectors are keyword-count based so similarity ordering is predictable
/// without any network access.
struct ProbeProvider {
    model: String,
    embed_calls: AtomicUsize,
    batch_calls: AtomicUsize,
}

impl ProbeProvider {
    fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            embed_calls: AtomicUsize::new(0),
            batch_calls: AtomicUsize::new(0),
        }
    }

    fn vector_for(text: &str) -> Embedding {
        let lower = text.to_lowercase();
        let count = |needle: &str| lower.matches(needle).count() as f32;
        vec![count("meeting"), count("3pm"), count("lunch"), 1.0]
    }
}

#[async_trait]
impl EmbeddingProvider for ProbeProvider {
    fn name(&self) -> &str {
        "probe"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        4
    }

    async fn embed(&self, text: &str) -> mailrag_embeddings::Result<Embedding> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector_for(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> mailrag_embeddings::Result<Vec<Embedding>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn meeting_record() -> MessageRecord {
    MessageRecord::new(
        "Meeting",
        "a@x.com",
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
        "Project sync at 3pm",
    )
}

fn engine_with(
    store_root: &std::path::Path,
    provider: Arc<ProbeProvider>,
    generation: GenerationClient,
) -> RagEngine {
    RagEngine::new(RagConfig::new(store_root), provider, generation)
}

fn offline_generation() -> GenerationClient {
    // Tests that never reach the generation call still need a client.
    GenerationClient::new()
        .with_api_key("unused")
        .with_base_url("http://localhost:1")
}

#[tokio::test]
async fn test_first_call_builds_second_call_loads() {
    let temp_dir = TempDir::new().unwrap();
    let provider = Arc::new(ProbeProvider::new("probe-model"));
    let engine = engine_with(temp_dir.path(), provider.clone(), offline_generation());

    let records = vec![meeting_record()];

    let first = engine.get_or_build(test_date(), &records).await.unwrap();
    assert!(matches!(first, IndexOutcome::Built(_)));
    assert!(engine.store().exists(test_date()).await);

    let second = engine.get_or_build(test_date(), &records).await.unwrap();
    assert!(matches!(second, IndexOutcome::Loaded(_)));

    // Exactly one build: the chunk batch was embedded once.
    assert_eq!(provider.batch_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_day_short_circuits_and_leaves_storage_absent() {
    let temp_dir = TempDir::new().unwrap();
    let provider = Arc::new(ProbeProvider::new("probe-model"));
    let engine = engine_with(temp_dir.path(), provider.clone(), offline_generation());

    let outcome = engine.get_or_build(test_date(), &[]).await.unwrap();
    assert!(matches!(outcome, IndexOutcome::NoData));
    assert!(!engine.store().exists(test_date()).await);
    assert_eq!(provider.batch_calls.load(Ordering::SeqCst), 0);

    // A later call with real records for the same date still builds.
    let outcome = engine
        .get_or_build(test_date(), &[meeting_record()])
        .await
        .unwrap();
    assert!(matches!(outcome, IndexOutcome::Built(_)));
    assert!(engine.store().exists(test_date()).await);
}

#[tokio::test]
async fn test_concurrent_get_or_build_builds_exactly_once() {
    let temp_dir = TempDir::new().unwrap();
    let provider = Arc::new(ProbeProvider::new("probe-model"));
    let engine = Arc::new(engine_with(
        temp_dir.path(),
        provider.clone(),
        offline_generation(),
    ));

    let barrier = Arc::new(tokio::sync::Barrier::new(2));
    let mut handles = Vec::new();

    for _ in 0..2 {
        let engine = engine.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            let records = vec![meeting_record()];
            barrier.wait().await;
            engine.get_or_build(test_date(), &records).await
        }));
    }

    let mut built = 0;
    let mut loaded = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            IndexOutcome::Built(_) => built += 1,
            IndexOutcome::Loaded(_) => loaded += 1,
            IndexOutcome::NoData => panic!("unexpected NoData"),
        }
    }

    assert_eq!(built, 1);
    assert_eq!(loaded, 1);
    assert_eq!(provider.batch_calls.load(Ordering::SeqCst), 1);

    // Exactly one committed index file, no leftover temp files.
    let dir = temp_dir.path().join(test_date().to_string());
    let names: Vec<String> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["index.json".to_string()]);
}

#[tokio::test]
async fn test_end_to_end_meeting_question() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start().await;

    // The prompt sent to the model must carry the retrieved excerpt.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("3pm"))
        .and(body_string_contains("When is the meeting?"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "The project sync is at 3pm." } }
            ]
        })))
        .mount(&server)
        .await;

    let provider = Arc::new(ProbeProvider::new("probe-model"));
    let generation = GenerationClient::new()
        .with_api_key("test-key")
        .with_base_url(server.uri());
    let engine = engine_with(temp_dir.path(), provider.clone(), generation);

    let records = vec![meeting_record()];

    // One short message with size 1000 / overlap 100 yields exactly one chunk.
    let outcome = engine.get_or_build(test_date(), &records).await.unwrap();
    let index = outcome.index().expect("index should have been built");
    assert_eq!(index.len(), 1);

    let answer = engine.ask(test_date(), &records, "When is the meeting?").await.unwrap();
    assert_eq!(
        answer,
        AskOutcome::Answer("The project sync is at 3pm.".to_string())
    );
}

#[tokio::test]
async fn test_blank_question_is_rejected_before_any_work() {
    let temp_dir = TempDir::new().unwrap();
    let provider = Arc::new(ProbeProvider::new("probe-model"));
    let engine = engine_with(temp_dir.path(), provider.clone(), offline_generation());

    let result = engine.ask(test_date(), &[meeting_record()], "   ").await;
    assert!(matches!(result, Err(RagError::EmptyQuestion)));

    // The blank question must not have triggered an index build.
    assert!(!engine.store().exists(test_date()).await);
    assert_eq!(provider.batch_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_generation_failure_surfaces_as_unavailable() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model melted"))
        .mount(&server)
        .await;

    let provider = Arc::new(ProbeProvider::new("probe-model"));
    let generation = GenerationClient::new()
        .with_api_key("test-key")
        .with_base_url(server.uri());
    let engine = engine_with(temp_dir.path(), provider, generation);

    let result = engine
        .ask(test_date(), &[meeting_record()], "When is the meeting?")
        .await;
    assert!(matches!(result, Err(RagError::GenerationUnavailable(_))));
}

#[tokio::test]
async fn test_query_with_different_model_is_rejected() {
    let temp_dir = TempDir::new().unwrap();

    // Build with model A.
    let builder = Arc::new(ProbeProvider::new("model-a"));
    let engine_a = engine_with(temp_dir.path(), builder, offline_generation());
    engine_a
        .get_or_build(test_date(), &[meeting_record()])
        .await
        .unwrap();

    // Query with model B over the same store root.
    let querier = Arc::new(ProbeProvider::new("model-b"));
    let engine_b = engine_with(temp_dir.path(), querier, offline_generation());

    let outcome = engine_b.get_or_build(test_date(), &[]).await.unwrap();
    let index = outcome.index().expect("persisted index should load");

    let result = engine_b.answer("When is the meeting?", index).await;
    match result {
        Err(RagError::Index(mailrag_index::IndexError::ModelMismatch { .. })) => {}
        other => panic!("expected ModelMismatch, got {other:?}"),
    }
}
