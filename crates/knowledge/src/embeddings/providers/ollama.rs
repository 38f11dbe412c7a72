//! Ollama embedding provider.
//!
//! Serves sentence-transformer models such as `all-minilm` (384 dimensions)
//! through a local Ollama daemon, so ingestion and queries use the same
//! neural model without linking an inference runtime into the binary.
//!
//! # Example
//! ```no_run
//! use docrag_knowledge::embeddings::{EmbeddingConfig, EmbeddingProvider};
//! use docrag_knowledge::embeddings::providers::ollama::OllamaProvider;
//!
//! # async fn run() -> docrag_knowledge::RagResult<()> {
//! let provider = OllamaProvider::new(EmbeddingConfig::ollama_minilm()).await?;
//! let embedding = provider.embed("Quarterly revenue").await?;
//! assert_eq!(embedding.len(), 384);
//! # Ok(())
//! # }
//! ```

use crate::embeddings::EmbeddingConfig;
use crate::embeddings::EmbeddingProvider;
use crate::error::{RagError, RagResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const EMBED_ENDPOINT: &str = "/api/embed";

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 100;
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
    batch_size: usize,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaProvider {
    /// Create a provider and verify the model answers with the configured
    /// dimension.
    ///
    /// Without a configured endpoint the local daemon is used.
    pub async fn new(config: EmbeddingConfig) -> RagResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| RagError::EmbeddingFailed {
                provider: "ollama".to_string(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        let provider = Self {
            client,
            base_url: base_url(config.endpoint.as_deref()),
            model: config.model,
            dimensions: config.dimensions,
            batch_size: config.batch_size.max(1),
        };

        provider.verify_connection().await?;
        Ok(provider)
    }

    #[instrument(skip(self), fields(model = %self.model))]
    async fn verify_connection(&self) -> RagResult<()> {
        debug!("Verifying Ollama connection at {}", self.base_url);

        let probe = vec!["connection check".to_string()];
        let vectors = self.embed_with_retries(&probe).await.map_err(|e| {
            RagError::EmbeddingFailed {
                provider: "ollama".to_string(),
                message: format!(
                    "Ollama not available at {} ({}). Ensure it is running and run: ollama pull {}",
                    self.base_url, e, self.model
                ),
            }
        })?;

        let actual = vectors.first().map(Vec::len).unwrap_or(0);
        if actual != self.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.dimensions,
                actual,
            });
        }

        debug!("Ollama model '{}' ready", self.model);
        Ok(())
    }

    #[instrument(skip(self, texts), fields(batch = texts.len(), model = %self.model))]
    async fn embed_with_retries(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        let mut attempt = 0;

        loop {
            match self.embed_request(texts).await {
                Ok(vectors) => return Ok(vectors),
                Err(e) => {
                    attempt += 1;
                    if attempt >= MAX_RETRIES {
                        return Err(e);
                    }

                    let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt);
                    warn!(
                        "Embedding failed (attempt {}/{}), retrying in {}ms: {}",
                        attempt, MAX_RETRIES, backoff_ms, e
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
            }
        }
    }

    async fn embed_request(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        let url = format!("{}{}", self.base_url, EMBED_ENDPOINT);
        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| failure(format!("Failed to send request to Ollama: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(failure(format!("Ollama API error ({}): {}", status, message)));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| failure(format!("Failed to parse Ollama response: {}", e)))?;

        if body.embeddings.len() != texts.len() {
            return Err(failure(format!(
                "Ollama returned {} embeddings for {} inputs",
                body.embeddings.len(),
                texts.len()
            )));
        }

        Ok(body.embeddings)
    }
}

fn failure(message: String) -> RagError {
    RagError::EmbeddingFailed {
        provider: "ollama".to_string(),
        message,
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, texts), fields(batch = texts.len(), provider = "ollama", model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.embed_with_retries(batch).await?);
        }
        Ok(vectors)
    }
}

fn base_url(endpoint: Option<&str>) -> String {
    endpoint
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_OLLAMA_URL)
        .trim_end_matches('/')
        .to_string()
}
