//! Qdrant vector index backend.
//!
//! Talks to a Qdrant service over gRPC through `qdrant-client`. Collections
//! use cosine distance; chunk payloads are stored as Qdrant payload.

use crate::config::VectorStoreConfig;
use crate::error::{RagError, RagResult};
use crate::types::{ChunkPayload, IndexPoint, SearchHit};
use crate::vector_index::VectorIndex;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    vectors_config, CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant, QdrantError};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

const BACKEND: &str = "qdrant";

/// Bound for data calls once the service has answered the probe.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct QdrantIndex {
    client: Qdrant,
}

impl QdrantIndex {
    /// Build a client and probe the service by listing collections.
    ///
    /// Fails with `IndexUnavailable` when the probe errors or exceeds the
    /// configured probe timeout.
    #[instrument(skip(config), fields(url = %config.url()))]
    pub async fn connect(config: &VectorStoreConfig) -> RagResult<Self> {
        let probe_timeout = config.probe_timeout();

        let mut builder = Qdrant::from_url(&config.url())
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(probe_timeout)
            .skip_compatibility_check();
        if let Some(api_key) = &config.api_key {
            builder = builder.api_key(api_key.clone());
        }
        let client = builder.build().map_err(unavailable)?;

        match tokio::time::timeout(probe_timeout, client.list_collections()).await {
            Ok(Ok(_)) => Ok(Self { client }),
            Ok(Err(e)) => Err(unavailable(e)),
            Err(_) => Err(RagError::IndexUnavailable {
                backend: BACKEND.to_string(),
                message: format!("liveness probe timed out after {:?}", probe_timeout),
            }),
        }
    }

    /// Vector size of an existing collection, if it has a single unnamed
    /// vector config.
    async fn collection_dimensions(&self, collection: &str) -> RagResult<Option<u64>> {
        let info = self
            .client
            .collection_info(collection)
            .await
            .map_err(unavailable)?;

        let size = info
            .result
            .and_then(|r| r.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|v| v.config)
            .and_then(|config| match config {
                vectors_config::Config::Params(params) => Some(params.size),
                vectors_config::Config::ParamsMap(_) => None,
            });

        Ok(size)
    }
}

fn unavailable(e: QdrantError) -> RagError {
    RagError::IndexUnavailable {
        backend: BACKEND.to_string(),
        message: e.to_string(),
    }
}

fn string_field(payload: &HashMap<String, QdrantValue>, key: &str) -> Option<String> {
    match payload.get(key).and_then(|v| v.kind.as_ref()) {
        Some(Kind::StringValue(s)) => Some(s.clone()),
        _ => None,
    }
}

fn integer_field(payload: &HashMap<String, QdrantValue>, key: &str) -> Option<i64> {
    match payload.get(key).and_then(|v| v.kind.as_ref()) {
        Some(Kind::IntegerValue(i)) => Some(*i),
        Some(Kind::DoubleValue(d)) => Some(*d as i64),
        _ => None,
    }
}

/// Rebuild a chunk payload; missing fields fall back to empty values.
fn chunk_payload(payload: &HashMap<String, QdrantValue>) -> ChunkPayload {
    let ingested_at = string_field(payload, "ingested_at")
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_default();

    ChunkPayload {
        text: string_field(payload, "text").unwrap_or_default(),
        source: string_field(payload, "source").unwrap_or_default(),
        position: integer_field(payload, "position")
            .and_then(|p| u32::try_from(p).ok())
            .unwrap_or(0),
        ingested_at,
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    fn backend_name(&self) -> &str {
        BACKEND
    }

    async fn ensure_collection(&self, collection: &str, dimensions: usize) -> RagResult<()> {
        let exists = self
            .client
            .collection_exists(collection)
            .await
            .map_err(unavailable)?;

        if exists {
            if let Some(size) = self.collection_dimensions(collection).await? {
                if size as usize != dimensions {
                    return Err(RagError::DimensionMismatch {
                        expected: size as usize,
                        actual: dimensions,
                    });
                }
            }
            debug!(collection, "qdrant collection already exists");
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(collection)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(unavailable)?;

        debug!(collection, dimensions, "created qdrant collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<IndexPoint>) -> RagResult<()> {
        if points.is_empty() {
            return Ok(());
        }

        let count = points.len();
        let mut structs = Vec::with_capacity(count);
        for point in points {
            let json = serde_json::to_value(&point.payload).map_err(|e| RagError::UpsertFailed {
                backend: BACKEND.to_string(),
                message: format!("payload serialization failed: {}", e),
            })?;
            let payload = Payload::try_from(json).map_err(|e| RagError::UpsertFailed {
                backend: BACKEND.to_string(),
                message: e.to_string(),
            })?;
            structs.push(PointStruct::new(point.id, point.vector, payload));
        }

        // One call with wait=true: the batch is applied as a single operation.
        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, structs).wait(true))
            .await
            .map_err(|e| RagError::UpsertFailed {
                backend: BACKEND.to_string(),
                message: e.to_string(),
            })?;

        debug!(collection, count, "upserted points to qdrant");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        top_k: usize,
    ) -> RagResult<Vec<SearchHit>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, query.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| RagError::SearchFailed {
                backend: BACKEND.to_string(),
                message: e.to_string(),
            })?;

        Ok(response
            .result
            .into_iter()
            .map(|scored| SearchHit {
                payload: chunk_payload(&scored.payload),
                score: scored.score,
            })
            .collect())
    }

    async fn count(&self, collection: &str) -> RagResult<u64> {
        let response = self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
            .map_err(unavailable)?;

        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(kind: Kind) -> QdrantValue {
        QdrantValue { kind: Some(kind) }
    }

    #[test]
    fn test_chunk_payload_from_qdrant_fields() {
        let mut payload = HashMap::new();
        payload.insert(
            "text".to_string(),
            value(Kind::StringValue("Revenue grew".to_string())),
        );
        payload.insert(
            "source".to_string(),
            value(Kind::StringValue("q1.pdf".to_string())),
        );
        payload.insert("position".to_string(), value(Kind::IntegerValue(2)));
        payload.insert(
            "ingested_at".to_string(),
            value(Kind::StringValue("2026-01-02T03:04:05Z".to_string())),
        );

        let chunk = chunk_payload(&payload);
        assert_eq!(chunk.text, "Revenue grew");
        assert_eq!(chunk.source, "q1.pdf");
        assert_eq!(chunk.position, 2);
        assert_eq!(chunk.ingested_at.to_rfc3339(), "2026-01-02T03:04:05+00:00");
    }

    #[test]
    fn test_chunk_payload_tolerates_missing_fields() {
        let chunk = chunk_payload(&HashMap::new());
        assert!(chunk.text.is_empty());
        assert!(chunk.source.is_empty());
        assert_eq!(chunk.position, 0);
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_is_unavailable() {
        let config = VectorStoreConfig {
            use_remote: true,
            host: "127.0.0.1".to_string(),
            port: 9,
            probe_timeout_ms: 500,
            api_key: None,
        };

        assert!(matches!(
            QdrantIndex::connect(&config).await,
            Err(RagError::IndexUnavailable { .. })
        ));
    }
}
