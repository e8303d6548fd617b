//! Embedding client
//!
//! The embedding service is an external collaborator: text in, one
//! 3072-dimensional multilingual vector out. The client enforces the
//! dimension contract: a mismatched vector is a hard failure, never
//! silently truncated or padded, because the index mappings are fixed at
//! 3072 and a shorter vector would score as garbage rather than fail.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use abhilekh_store::EMBEDDING_DIM;

/// Configuration for the OpenAI-compatible embedding endpoint
#[derive(Debug, Clone)]
pub struct EmbedderConfig {
    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,
    /// API key (optional for local gateways)
    pub api_key: Option<String>,
    /// Embedding model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "text-embedding-3-large".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Text-to-vector collaborator.
///
/// Injected into the query analyzer so tests can substitute a double.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one text into a vector of [`dimension`](Embedder::dimension) length
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// The vector length this embedder guarantees
    fn dimension(&self) -> usize;
}

/// Request body for the /v1/embeddings endpoint
#[derive(Debug, Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: Vec<String>,
}

/// Single embedding in the response
#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Response from the /v1/embeddings endpoint
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

/// OpenAI-compatible embedding client
pub struct OpenAiEmbedder {
    client: Client,
    config: EmbedderConfig,
}

impl OpenAiEmbedder {
    /// Create a new embedding client
    pub fn new(config: EmbedderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SearchError::Embedding(format!("HTTP client error: {e}")))?;

        Ok(Self { client, config })
    }

    fn embeddings_url(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{base}/embeddings")
        } else {
            format!("{base}/v1/embeddings")
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request_body = EmbeddingsRequest {
            model: self.config.model.clone(),
            input: vec![text.to_string()],
        };

        let mut request = self
            .client
            .post(self.embeddings_url())
            .header("Content-Type", "application/json")
            .json(&request_body);

        if let Some(ref api_key) = self.config.api_key {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Embedding("embedding request timed out".into())
            } else {
                SearchError::Embedding(format!("embedding request failed: {e}"))
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::Embedding("embedding quota exceeded".into()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Embedding(format!(
                "embedding request failed with status {status}: {body}"
            )));
        }

        let decoded: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Embedding(format!("invalid embedding response: {e}")))?;

        let vector = decoded
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| SearchError::Embedding("no embedding returned".into()))?;

        if vector.len() != EMBEDDING_DIM {
            return Err(SearchError::EmbeddingDimension {
                expected: EMBEDDING_DIM,
                actual: vector.len(),
            });
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }
}
