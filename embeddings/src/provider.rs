//! Embedding providers.
//!
//! The pipeline only ever talks to the [`EmbeddingProvider`] trait; the
//! concrete implementation here targets any OpenAI-compatible `/embeddings`
//! endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// Trait for embedding providers.
///
/// Implementations must return exactly one vector per input text, in input
/// order, with a fixed dimensionality per model. A failed call surfaces as
/// an error; providers never substitute zero vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Name of this provider.
    fn name(&self) -> &str;

    /// Identifier of the model used for embedding.
    fn model(&self) -> &str;

    /// Dimension of the vectors this provider produces.
    fn dimension(&self) -> usize;

    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Generate embeddings for multiple texts, one vector per input in the
    /// same order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Check if the provider is usable (API key set, etc.).
    fn is_available(&self) -> bool;
}

/// Provider for OpenAI-compatible embedding APIs.
pub struct OpenAiCompatProvider {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Model identifier.
    model: String,

    /// Vector dimension for the model.
    dimension: usize,
}

impl OpenAiCompatProvider {
    /// Create a provider with the stock OpenAI endpoint and model, reading
    /// the key from `EMBEDDINGS_API_KEY`.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("EMBEDDINGS_API_KEY").ok(),
            base_url: "https://api.openai.com/v1".to_string(),
            client: reqwest::Client::new(),
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model and its vector dimension.
    pub fn with_model(mut self, model: impl Into<String>, dimension: usize) -> Self {
        self.model = model.into();
        self.dimension = dimension;
        self
    }

    async fn request(&self, input: serde_json::Value) -> Result<ApiEmbeddingResponse> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(EmbeddingError::ProviderNotConfigured)?;

        let body = serde_json::json!({
            "input": input,
            "model": self.model,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(EmbeddingError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(error_text));
        }

        Ok(response.json().await?)
    }

    fn check_dimension(&self, embedding: &Embedding) -> Result<()> {
        if embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }
        Ok(())
    }
}

impl Default for OpenAiCompatProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        "openai-compat"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        debug!("Generating embedding with model: {}", self.model);

        let result = self.request(serde_json::json!(text)).await?;

        let embedding = result
            .data
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("no embedding in response".to_string()))?
            .embedding;

        self.check_dimension(&embedding)?;
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            "Generating batch embeddings for {} texts with model: {}",
            texts.len(),
            self.model
        );

        let result = self.request(serde_json::json!(texts)).await?;

        if result.data.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                result.data.len()
            )));
        }

        // The API reports each vector's input position; re-order defensively
        // before trusting response order.
        let mut data = result.data;
        data.sort_by_key(|item| item.index);

        let embeddings: Vec<Embedding> = data.into_iter().map(|item| item.embedding).collect();
        for embedding in &embeddings {
            self.check_dimension(embedding)?;
        }

        Ok(embeddings)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

/// OpenAI-compatible API response format.
#[derive(Debug, Deserialize)]
struct ApiEmbeddingResponse {
    data: Vec<ApiEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct ApiEmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenAiCompatProvider {
        OpenAiCompatProvider::new()
            .with_api_key("test-key")
            .with_base_url(server.uri())
            .with_model("test-embed", 3)
    }

    #[tokio::test]
    async fn test_embed_batch_preserves_order() {
        let server = MockServer::start().await;

        // Out-of-order response entries must be re-ordered by index.
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    { "embedding": [0.0, 1.0, 0.0], "index": 1 },
                    { "embedding": [1.0, 0.0, 0.0], "index": 0 },
                ],
                "model": "test-embed"
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let texts = vec!["first".to_string(), "second".to_string()];
        let embeddings = provider.embed_batch(&texts).await.unwrap();

        assert_eq!(embeddings[0], vec![1.0, 0.0, 0.0]);
        assert_eq!(embeddings[1], vec![0.0, 1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_embed_batch_count_mismatch_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "embedding": [1.0, 0.0, 0.0], "index": 0 }],
                "model": "test-embed"
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let texts = vec!["first".to_string(), "second".to_string()];
        let result = provider.embed_batch(&texts).await;

        assert!(matches!(result, Err(EmbeddingError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_embed_server_error_surfaces() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let result = provider.embed("hello").await;

        assert!(matches!(result, Err(EmbeddingError::Api(_))));
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let provider = OpenAiCompatProvider {
            api_key: None,
            base_url: "http://localhost:1".to_string(),
            client: reqwest::Client::new(),
            model: "test-embed".to_string(),
            dimension: 3,
        };

        assert!(!provider.is_available());
        let result = provider.embed("hello").await;
        assert!(matches!(result, Err(EmbeddingError::ProviderNotConfigured)));
    }

    #[tokio::test]
    async fn test_empty_batch_short_circuits() {
        // No server: an empty batch must not hit the network at all.
        let provider = OpenAiCompatProvider::new()
            .with_api_key("test-key")
            .with_base_url("http://localhost:1");
        let embeddings = provider.embed_batch(&[]).await.unwrap();
        assert!(embeddings.is_empty());
    }
}
