//! Vector index abstraction for document chunks.
//!
//! Defines a trait for backend-agnostic vector storage and retrieval, and
//! the connection policy that picks a backend: the networked service when
//! it answers a liveness probe in time, the in-process index otherwise.

use crate::config::VectorStoreConfig;
use crate::error::RagResult;
use crate::memory_index::InMemoryIndex;
use crate::qdrant_index::QdrantIndex;
use crate::types::{IndexPoint, SearchHit};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for vector index backends.
///
/// Implementations must make `upsert` and `search` individually atomic with
/// respect to each other: a concurrent search sees either none or all of an
/// upsert's points.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Backend name used in logs and errors.
    fn backend_name(&self) -> &str;

    /// Create the collection if absent; verify its dimension if present.
    async fn ensure_collection(&self, collection: &str, dimensions: usize) -> RagResult<()>;

    /// Insert or replace points by id, all or nothing.
    async fn upsert(&self, collection: &str, points: Vec<IndexPoint>) -> RagResult<()>;

    /// Search for the top-k points most similar to `query` by cosine
    /// similarity, in descending order. An empty collection yields no hits.
    async fn search(&self, collection: &str, query: &[f32], top_k: usize)
        -> RagResult<Vec<SearchHit>>;

    /// Number of points stored in the collection.
    async fn count(&self, collection: &str) -> RagResult<u64>;
}

/// The index a pipeline ended up with.
#[derive(Clone)]
pub struct IndexHandle {
    pub index: Arc<dyn VectorIndex>,

    /// Whether the networked service is in use
    pub remote: bool,
}

impl IndexHandle {
    /// Fresh in-process index.
    pub fn memory() -> Self {
        Self {
            index: Arc::new(InMemoryIndex::new()),
            remote: false,
        }
    }
}

impl std::fmt::Debug for IndexHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexHandle")
            .field("backend", &self.index.backend_name())
            .field("remote", &self.remote)
            .finish()
    }
}

/// Resolve the vector index location.
///
/// Never fails: when the networked service is disabled, unreachable, or
/// slower than the probe timeout, the in-process index is used and the
/// degradation is logged.
pub async fn connect_index(config: &VectorStoreConfig) -> IndexHandle {
    if !config.use_remote {
        tracing::debug!("Networked vector service disabled, using in-memory index");
        return IndexHandle::memory();
    }

    match QdrantIndex::connect(config).await {
        Ok(index) => {
            tracing::info!("Connected to vector service at {}", config.url());
            IndexHandle {
                index: Arc::new(index),
                remote: true,
            }
        }
        Err(e) => {
            tracing::warn!(
                "Vector service at {} unavailable, falling back to in-memory index (data will not persist): {}",
                config.url(),
                e
            );
            IndexHandle::memory()
        }
    }
}
