//! In-process vector index using cosine similarity.
//!
//! Points live only as long as the process. Used whenever the networked
//! service is disabled or unreachable.

use crate::error::{RagError, RagResult};
use crate::types::{ChunkPayload, IndexPoint, SearchHit};
use crate::vector_index::VectorIndex;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

const BACKEND: &str = "memory";

#[derive(Debug)]
struct StoredPoint {
    vector: Vec<f32>,
    payload: ChunkPayload,
}

/// Points kept in insertion order; replacing an id keeps its slot.
#[derive(Debug)]
struct Collection {
    dimensions: usize,
    points: Vec<StoredPoint>,
    slots: HashMap<String, usize>,
}

impl Collection {
    fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            points: Vec::new(),
            slots: HashMap::new(),
        }
    }
}

/// Vector index held in memory behind a single `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Cosine similarity, or 0.0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn rank_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    fn backend_name(&self) -> &str {
        BACKEND
    }

    async fn ensure_collection(&self, collection: &str, dimensions: usize) -> RagResult<()> {
        let mut collections = self.collections.write().await;
        match collections.get(collection) {
            Some(existing) if existing.dimensions != dimensions => {
                Err(RagError::DimensionMismatch {
                    expected: existing.dimensions,
                    actual: dimensions,
                })
            }
            Some(_) => Ok(()),
            None => {
                collections.insert(collection.to_string(), Collection::new(dimensions));
                tracing::debug!(collection, dimensions, "created in-memory collection");
                Ok(())
            }
        }
    }

    async fn upsert(&self, collection: &str, points: Vec<IndexPoint>) -> RagResult<()> {
        let mut collections = self.collections.write().await;
        let store = collections
            .get_mut(collection)
            .ok_or_else(|| RagError::UpsertFailed {
                backend: BACKEND.to_string(),
                message: format!("collection '{}' does not exist", collection),
            })?;

        // Validate the whole batch before touching the collection.
        if let Some(bad) = points.iter().find(|p| p.vector.len() != store.dimensions) {
            return Err(RagError::DimensionMismatch {
                expected: store.dimensions,
                actual: bad.vector.len(),
            });
        }

        let count = points.len();
        for point in points {
            let stored = StoredPoint {
                vector: point.vector,
                payload: point.payload,
            };
            match store.slots.get(&point.id) {
                Some(&slot) => store.points[slot] = stored,
                None => {
                    store.slots.insert(point.id, store.points.len());
                    store.points.push(stored);
                }
            }
        }

        tracing::debug!(collection, count, "upserted points into memory");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        top_k: usize,
    ) -> RagResult<Vec<SearchHit>> {
        let collections = self.collections.read().await;
        let store = collections
            .get(collection)
            .ok_or_else(|| RagError::SearchFailed {
                backend: BACKEND.to_string(),
                message: format!("collection '{}' does not exist", collection),
            })?;

        if query.len() != store.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: store.dimensions,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(f32, &StoredPoint)> = store
            .points
            .iter()
            .map(|point| (cosine_similarity(&point.vector, query), point))
            .collect();

        // Stable sort keeps insertion order among equal scores; NaN ranks last.
        scored.sort_by(|a, b| rank_key(b.0).total_cmp(&rank_key(a.0)));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(score, point)| SearchHit {
                payload: point.payload.clone(),
                score,
            })
            .collect())
    }

    async fn count(&self, collection: &str) -> RagResult<u64> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|c| c.points.len() as u64)
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn point(id: &str, vector: Vec<f32>, text: &str) -> IndexPoint {
        IndexPoint {
            id: id.to_string(),
            vector,
            payload: ChunkPayload {
                text: text.to_string(),
                source: "doc.pdf".to_string(),
                position: 0,
                ingested_at: Utc::now(),
            },
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_ensure_collection_is_idempotent() {
        let index = InMemoryIndex::new();
        index.ensure_collection("documents", 3).await.unwrap();
        index
            .upsert("documents", vec![point("a", vec![1.0, 0.0, 0.0], "alpha")])
            .await
            .unwrap();

        index.ensure_collection("documents", 3).await.unwrap();
        assert_eq!(index.count("documents").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ensure_collection_rejects_other_dimension() {
        let index = InMemoryIndex::new();
        index.ensure_collection("documents", 3).await.unwrap();
        assert!(matches!(
            index.ensure_collection("documents", 4).await,
            Err(RagError::DimensionMismatch {
                expected: 3,
                actual: 4
            })
        ));
    }

    #[tokio::test]
    async fn test_empty_collection_search_is_empty() {
        let index = InMemoryIndex::new();
        index.ensure_collection("documents", 2).await.unwrap();
        let hits = index.search("documents", &[1.0, 0.0], 3).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_orders_by_score_then_insertion() {
        let index = InMemoryIndex::new();
        index.ensure_collection("documents", 2).await.unwrap();
        index
            .upsert(
                "documents",
                vec![
                    point("1", vec![0.0, 1.0], "orthogonal"),
                    point("2", vec![1.0, 1.0], "diagonal-first"),
                    point("3", vec![1.0, 0.0], "exact"),
                    point("4", vec![1.0, 1.0], "diagonal-second"),
                ],
            )
            .await
            .unwrap();

        let hits = index.search("documents", &[1.0, 0.0], 3).await.unwrap();
        let texts: Vec<&str> = hits.iter().map(|h| h.payload.text.as_str()).collect();
        assert_eq!(texts, vec!["exact", "diagonal-first", "diagonal-second"]);
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn test_nan_scores_rank_last() {
        let index = InMemoryIndex::new();
        index.ensure_collection("documents", 2).await.unwrap();
        index
            .upsert(
                "documents",
                vec![
                    point("1", vec![f32::NAN, 1.0], "broken"),
                    point("2", vec![0.0, 1.0], "orthogonal"),
                    point("3", vec![1.0, 0.0], "exact"),
                ],
            )
            .await
            .unwrap();

        let hits = index.search("documents", &[1.0, 0.0], 3).await.unwrap();
        let texts: Vec<&str> = hits.iter().map(|h| h.payload.text.as_str()).collect();
        assert_eq!(texts, vec!["exact", "orthogonal", "broken"]);
        assert!(hits[2].score.is_nan());
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let index = InMemoryIndex::new();
        index.ensure_collection("documents", 2).await.unwrap();
        index
            .upsert("documents", vec![point("a", vec![1.0, 0.0], "old")])
            .await
            .unwrap();
        index
            .upsert("documents", vec![point("a", vec![1.0, 0.0], "new")])
            .await
            .unwrap();

        assert_eq!(index.count("documents").await.unwrap(), 1);
        let hits = index.search("documents", &[1.0, 0.0], 1).await.unwrap();
        assert_eq!(hits[0].payload.text, "new");
    }

    #[tokio::test]
    async fn test_upsert_is_all_or_nothing() {
        let index = InMemoryIndex::new();
        index.ensure_collection("documents", 2).await.unwrap();

        let result = index
            .upsert(
                "documents",
                vec![
                    point("a", vec![1.0, 0.0], "fine"),
                    point("b", vec![1.0, 0.0, 0.0], "wrong size"),
                ],
            )
            .await;

        assert!(matches!(result, Err(RagError::DimensionMismatch { .. })));
        assert_eq!(index.count("documents").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_collection_errors() {
        let index = InMemoryIndex::new();
        assert!(matches!(
            index.upsert("nope", vec![]).await,
            Err(RagError::UpsertFailed { .. })
        ));
        assert!(matches!(
            index.search("nope", &[1.0], 1).await,
            Err(RagError::SearchFailed { .. })
        ));
        assert_eq!(index.count("nope").await.unwrap(), 0);
    }
}
