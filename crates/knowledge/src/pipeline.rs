//! Retrieval pipeline orchestration.
//!
//! [`DocumentRag`] owns every collaborator (extractors, chunker, embedder,
//! vector index, answer composer). It is constructed once, after which
//! `add_document` and `answer_question` may be called repeatedly and
//! concurrently through a shared reference.

use crate::chunker::Chunker;
use crate::config::RagConfig;
use crate::embeddings::Embedder;
use crate::error::{RagError, RagResult};
use crate::extract::{extension_of, DocumentFormat, ExtractorRegistry};
use crate::rag::{Answer, AnswerComposer, GenerationOptions};
use crate::types::{IndexPoint, IndexStats, IngestOutcome, SearchHit};
use crate::vector_index::{connect_index, IndexHandle};
use chrono::Utc;
use std::path::Path;
use tracing::instrument;

/// Document question-answering pipeline in the Ready state.
#[derive(Debug)]
pub struct DocumentRag {
    config: RagConfig,
    extractors: ExtractorRegistry,
    chunker: Chunker,
    embedder: Embedder,
    index: IndexHandle,
    composer: AnswerComposer,
}

impl DocumentRag {
    /// Build the pipeline from configuration.
    ///
    /// Embedder failures and dimension conflicts are fatal; an unreachable
    /// vector service is not (the in-process index is used instead).
    pub async fn new(config: RagConfig) -> RagResult<Self> {
        config.validate()?;

        let embedder = Embedder::new(&config.embedding).await?;
        let index = connect_index(&config.vector_store).await;

        Self::with_components(config, embedder, index, ExtractorRegistry::default()).await
    }

    /// Build the pipeline around injected collaborators.
    pub async fn with_components(
        config: RagConfig,
        embedder: Embedder,
        index: IndexHandle,
        extractors: ExtractorRegistry,
    ) -> RagResult<Self> {
        config.validate()?;

        if embedder.dimensions() != config.embedding.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: config.embedding.dimensions,
                actual: embedder.dimensions(),
            });
        }

        let chunker = Chunker::new(config.chunk_size, config.chunk_overlap)?;

        index
            .index
            .ensure_collection(&config.collection, embedder.dimensions())
            .await?;

        tracing::info!(
            "Pipeline ready: collection '{}' on {} backend, embeddings by {} ({} dims)",
            config.collection,
            index.index.backend_name(),
            embedder.provider_name(),
            embedder.dimensions()
        );

        let composer = AnswerComposer::new(config.generation.clone());

        Ok(Self {
            config,
            extractors,
            chunker,
            embedder,
            index,
            composer,
        })
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Whether the networked vector service is in use.
    pub fn is_remote(&self) -> bool {
        self.index.remote
    }

    /// Ingest one document. Every outcome, including failures, is reported
    /// as an [`IngestOutcome`]; nothing is indexed unless all chunks are.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn add_document(&self, path: &Path) -> IngestOutcome {
        let source = source_name(path);

        let format = match DocumentFormat::from_path(path) {
            Some(format) if self.extractors.supports(format) => format,
            _ => {
                let extension = extension_of(path);
                tracing::info!("Skipping {}: unsupported format '{}'", source, extension);
                return IngestOutcome::UnsupportedFormat { extension };
            }
        };

        match self.ingest(path, &source, format).await {
            Ok(outcome) => {
                tracing::info!("{}", outcome);
                outcome
            }
            Err(e) => {
                tracing::error!("Failed to ingest {}: {}", source, e);
                IngestOutcome::Failed {
                    source,
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn ingest(
        &self,
        path: &Path,
        source: &str,
        format: DocumentFormat,
    ) -> RagResult<IngestOutcome> {
        let extractors = self.extractors.clone();
        let owned = path.to_path_buf();
        let text = tokio::task::spawn_blocking(move || extractors.extract(&owned, format))
            .await
            .map_err(|e| RagError::extraction(path, e))??;

        if text.trim().is_empty() {
            return Ok(IngestOutcome::EmptyDocument {
                source: source.to_string(),
            });
        }

        let chunks = self.chunker.chunk_document(source, &text);
        if chunks.is_empty() {
            return Ok(IngestOutcome::NoChunks {
                source: source.to_string(),
            });
        }

        tracing::debug!("Embedding {} chunks from {}", chunks.len(), source);
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        let ingested_at = Utc::now();
        let count = chunks.len();
        let points: Vec<IndexPoint> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexPoint::from_chunk(chunk, vector, ingested_at))
            .collect();

        self.index
            .index
            .upsert(&self.config.collection, points)
            .await?;

        Ok(IngestOutcome::Indexed {
            source: source.to_string(),
            chunks: count,
        })
    }

    /// Retrieve the `top_k` chunks most similar to `query`.
    pub async fn search(&self, query: &str, top_k: usize) -> RagResult<Vec<SearchHit>> {
        let vector = self.embedder.embed_one(query).await?;
        self.index
            .index
            .search(&self.config.collection, &vector, top_k)
            .await
    }

    /// Answer a question from the indexed documents.
    ///
    /// Never fails: retrieval errors yield the no-information answer and
    /// generation errors yield the verbatim context.
    #[instrument(skip(self, question, options))]
    pub async fn answer_question(&self, question: &str, options: &GenerationOptions) -> Answer {
        let hits = match self.search(question, self.config.top_k).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::error!("Search failed, treating as no results: {}", e);
                Vec::new()
            }
        };

        tracing::debug!(
            "Retrieved {} chunks (best score: {:.3})",
            hits.len(),
            hits.first().map(|h| h.score).unwrap_or(0.0)
        );

        self.composer.compose(question, &hits, options).await
    }

    /// Snapshot of the backing collection.
    pub async fn stats(&self) -> RagResult<IndexStats> {
        let points = self.index.index.count(&self.config.collection).await?;
        Ok(IndexStats {
            collection: self.config.collection.clone(),
            backend: self.index.index.backend_name().to_string(),
            remote: self.index.remote,
            points,
        })
    }
}

/// Base name of a document, as stored in chunk payloads.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_source_name_is_base_name() {
        assert_eq!(source_name(Path::new("/data/in/Q1 Report.pdf")), "Q1 Report.pdf");
        assert_eq!(source_name(&PathBuf::from("notes.docx")), "notes.docx");
    }

    #[tokio::test]
    async fn test_new_rejects_invalid_chunk_config() {
        let config = RagConfig {
            chunk_size: 50,
            chunk_overlap: 60,
            ..Default::default()
        };
        assert!(matches!(
            DocumentRag::new(config).await,
            Err(RagError::InvalidChunkConfig { .. })
        ));
    }

    #[tokio::test]
    async fn test_pipeline_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DocumentRag>();

        let rag = DocumentRag::new(RagConfig::default()).await.unwrap();
        assert!(!rag.is_remote());
        let stats = rag.stats().await.unwrap();
        assert_eq!(stats.points, 0);
        assert_eq!(stats.backend, "memory");
    }
}
