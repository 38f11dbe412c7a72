//! Embedding of chunks and queries.
//!
//! [`Embedder`] is built once per pipeline and shared by ingestion and
//! question answering, so both sides always use the same model.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};

use crate::error::{RagError, RagResult};
use std::sync::Arc;

/// Provider wrapper that enforces the configured dimension.
#[derive(Debug, Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    dimensions: usize,
    batch_size: usize,
}

impl Embedder {
    /// Create the configured provider. Failure here is fatal to the pipeline.
    pub async fn new(config: &EmbeddingConfig) -> RagResult<Self> {
        tracing::debug!(
            "Creating embedding provider: provider={}, model={}, dimensions={}",
            config.provider,
            config.model,
            config.dimensions
        );

        let provider = create_provider(config).await?;
        Self::with_provider(provider, config.dimensions, config.batch_size)
    }

    /// Wrap an existing provider.
    pub fn with_provider(
        provider: Arc<dyn EmbeddingProvider>,
        dimensions: usize,
        batch_size: usize,
    ) -> RagResult<Self> {
        if provider.dimensions() != dimensions {
            return Err(RagError::DimensionMismatch {
                expected: dimensions,
                actual: provider.dimensions(),
            });
        }

        Ok(Self {
            provider,
            dimensions,
            batch_size: batch_size.max(1),
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Embed texts in order, one vector per text.
    pub async fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            "Embedding {} texts using provider '{}' (model: {})",
            texts.len(),
            self.provider.provider_name(),
            self.provider.model_name()
        );

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let embedded = self
                .provider
                .embed_batch(batch)
                .await
                .map_err(|e| self.as_embedding_failure(e))?;

            if embedded.len() != batch.len() {
                return Err(RagError::EmbeddingFailed {
                    provider: self.provider.provider_name().to_string(),
                    message: format!(
                        "expected {} vectors, got {}",
                        batch.len(),
                        embedded.len()
                    ),
                });
            }

            for vector in &embedded {
                self.check_dimensions(vector)?;
            }
            vectors.extend(embedded);
        }

        Ok(vectors)
    }

    /// Embed a single query or chunk.
    pub async fn embed_one(&self, text: &str) -> RagResult<Vec<f32>> {
        let vector = self
            .provider
            .embed(text)
            .await
            .map_err(|e| self.as_embedding_failure(e))?;
        self.check_dimensions(&vector)?;
        Ok(vector)
    }

    fn check_dimensions(&self, vector: &[f32]) -> RagResult<()> {
        if vector.len() != self.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    fn as_embedding_failure(&self, err: RagError) -> RagError {
        match err {
            RagError::EmbeddingFailed { .. } | RagError::DimensionMismatch { .. } => err,
            other => RagError::EmbeddingFailed {
                provider: self.provider.provider_name().to_string(),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::trigram::TrigramProvider;

    /// Provider that returns vectors of the wrong length.
    #[derive(Debug)]
    struct ShortProvider;

    #[async_trait::async_trait]
    impl EmbeddingProvider for ShortProvider {
        fn provider_name(&self) -> &str {
            "short"
        }

        fn model_name(&self) -> &str {
            "short-v1"
        }

        fn dimensions(&self) -> usize {
            4
        }

        async fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    #[tokio::test]
    async fn test_embed_batch_in_small_batches() {
        let embedder =
            Embedder::with_provider(Arc::new(TrigramProvider::new(384)), 384, 2).unwrap();
        let texts: Vec<String> = (0..5).map(|i| format!("document number {}", i)).collect();

        let vectors = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(vectors.len(), 5);
        assert!(vectors.iter().all(|v| v.len() == 384));

        let single = embedder.embed_one(&texts[3]).await.unwrap();
        assert_eq!(single, vectors[3]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let embedder = Embedder::new(&EmbeddingConfig::default()).await.unwrap();
        assert!(embedder.embed_batch(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_provider_dimension_must_match_config() {
        let result = Embedder::with_provider(Arc::new(TrigramProvider::new(128)), 384, 10);
        assert!(matches!(
            result,
            Err(RagError::DimensionMismatch {
                expected: 384,
                actual: 128
            })
        ));
    }

    #[tokio::test]
    async fn test_wrong_length_vectors_are_rejected() {
        let embedder = Embedder::with_provider(Arc::new(ShortProvider), 4, 10).unwrap();

        let err = embedder.embed_one("hello").await.unwrap_err();
        assert!(matches!(
            err,
            RagError::DimensionMismatch {
                expected: 4,
                actual: 2
            }
        ));

        let err = embedder.embed_batch(&["hello".to_string()]).await.unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { .. }));
    }
}
