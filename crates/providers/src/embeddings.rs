//! Embedding client for OpenAI-compatible endpoints.
//!
//! Splits input into batches of at most 100 texts (the endpoint's
//! practical ceiling), issues one sequential call per batch, and
//! concatenates the results in input order — position i of the output is
//! the embedding of text i, and everything downstream depends on that.
//!
//! No retry at this layer. The chat path retries because a conversation
//! can tolerate a delayed reply; an index build that loses a batch must
//! fail loudly instead of producing a silently incomplete artifact.

use async_trait::async_trait;
use cornerman_config::RemoteSettings;
use cornerman_core::error::EmbedError;
use cornerman_core::model::Embedder;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Maximum texts per network call.
const BATCH_SIZE: usize = 100;

/// Timeout for a full batch request.
const BATCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for the single-query path (interactive retrieval).
const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Embedding client over an OpenAI-compatible `/embeddings` endpoint.
#[derive(Clone)]
pub struct OpenAiEmbeddingClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiEmbeddingClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: "text-embedding-3-small".into(),
        }
    }

    /// Build a client from resolved configuration.
    pub fn from_settings(remote: &RemoteSettings, model: impl Into<String>) -> Self {
        Self::new(remote.embeddings_base_url.clone(), remote.api_key.clone()).with_model(model)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Returns the embedding model name (for the artifact manifest).
    pub fn model(&self) -> &str {
        &self.model
    }

    /// One call against the endpoint; validates shape and count.
    async fn request(
        &self,
        inputs: &[String],
        timeout: Duration,
    ) -> Result<Vec<Vec<f32>>, EmbedError> {
        let url = format!("{}/embeddings", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "input": inputs,
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbedError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = crate::body_snippet(&response.text().await.unwrap_or_default());
            return Err(EmbedError::RemoteService { status, body });
        }

        let parsed: EmbeddingApiResponse = response
            .json()
            .await
            .map_err(|e| EmbedError::Malformed(e.to_string()))?;

        if parsed.data.len() != inputs.len() {
            return Err(EmbedError::Malformed(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                parsed.data.len()
            )));
        }

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAiEmbeddingClient {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let batch_count = texts.len().div_ceil(BATCH_SIZE);
        let mut all = Vec::with_capacity(texts.len());

        for (i, batch) in texts.chunks(BATCH_SIZE).enumerate() {
            debug!(
                batch = i + 1,
                batch_count,
                size = batch.len(),
                model = %self.model,
                "embedding batch"
            );
            let vectors = self.request(batch, BATCH_TIMEOUT).await?;
            all.extend(vectors);
        }

        info!(
            count = all.len(),
            dimension = all.first().map(|v| v.len()).unwrap_or(0),
            "embedding batch run complete"
        );
        Ok(all)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vectors = self
            .request(std::slice::from_ref(&text.to_string()), QUERY_TIMEOUT)
            .await?;
        vectors
            .pop()
            .ok_or_else(|| EmbedError::Malformed("empty embedding response".into()))
    }
}

// --- Embedding API types (internal) ---

#[derive(Debug, Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_http::{http_response, spawn_script};

    fn embeddings_json(vectors: &[Vec<f32>]) -> String {
        let data: Vec<_> = vectors
            .iter()
            .enumerate()
            .map(|(i, v)| serde_json::json!({"embedding": v, "index": i}))
            .collect();
        serde_json::json!({"data": data}).to_string()
    }

    #[tokio::test]
    async fn embed_batch_preserves_order() {
        let base_url = spawn_script(vec![http_response(
            "200 OK",
            &embeddings_json(&[vec![0.1, 0.2], vec![0.3, 0.4]]),
        )])
        .await;
        let client = OpenAiEmbeddingClient::new(base_url, "test-token");
        let vectors = client
            .embed_batch(&["uno".to_string(), "dos".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[tokio::test]
    async fn embed_batch_empty_input_is_a_noop() {
        // No scripted responses: any network call would fail the test.
        let client = OpenAiEmbeddingClient::new("http://127.0.0.1:9", "test-token");
        let vectors = client.embed_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }

    #[tokio::test]
    async fn non_success_status_carries_status_and_body() {
        let base_url = spawn_script(vec![http_response("500 Internal Server Error", "boom")]).await;
        let client = OpenAiEmbeddingClient::new(base_url, "test-token");
        let err = client
            .embed_batch(&["uno".to_string()])
            .await
            .unwrap_err();
        match err {
            EmbedError::RemoteService { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected RemoteService, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn count_mismatch_is_malformed() {
        let base_url =
            spawn_script(vec![http_response("200 OK", &embeddings_json(&[vec![0.1]]))]).await;
        let client = OpenAiEmbeddingClient::new(base_url, "test-token");
        let err = client
            .embed_batch(&["uno".to_string(), "dos".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, EmbedError::Malformed(_)));
    }

    #[tokio::test]
    async fn embed_query_returns_single_vector() {
        let base_url = spawn_script(vec![http_response(
            "200 OK",
            &embeddings_json(&[vec![1.0, 0.0]]),
        )])
        .await;
        let client = OpenAiEmbeddingClient::new(base_url, "test-token");
        let vector = client.embed_query("guantes de boxeo").await.unwrap();
        assert_eq!(vector, vec![1.0, 0.0]);
    }
}
