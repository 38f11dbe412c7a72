//! Retrieval pipeline type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A chunk of document text, created during ingestion.
///
/// Immutable once built; owned by the vector index after upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Opaque unique identifier (UUID v4)
    pub id: String,

    /// Text content
    pub text: String,

    /// Base name of the originating document
    pub source: String,

    /// Window index within the document
    pub position: u32,
}

/// Payload stored next to each vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkPayload {
    pub text: String,
    pub source: String,
    #[serde(default)]
    pub position: u32,
    pub ingested_at: DateTime<Utc>,
}

/// A point written to the vector index.
#[derive(Debug, Clone)]
pub struct IndexPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: ChunkPayload,
}

impl IndexPoint {
    /// Pair a chunk with its embedding.
    pub fn from_chunk(chunk: DocumentChunk, vector: Vec<f32>, ingested_at: DateTime<Utc>) -> Self {
        Self {
            id: chunk.id,
            vector,
            payload: ChunkPayload {
                text: chunk.text,
                source: chunk.source,
                position: chunk.position,
                ingested_at,
            },
        }
    }
}

/// A scored match returned by the vector index.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub payload: ChunkPayload,

    /// Cosine similarity in [-1, 1]
    pub score: f32,
}

/// Outcome of `add_document`, rendered as a status line by `Display`.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Extension outside the supported set; nothing was read.
    UnsupportedFormat { extension: String },

    /// Extraction produced no text.
    EmptyDocument { source: String },

    /// Text was present but chunking produced nothing.
    NoChunks { source: String },

    /// Every chunk of the document was indexed.
    Indexed { source: String, chunks: usize },

    /// Extraction, embedding or indexing failed; nothing was indexed.
    Failed { source: String, reason: String },
}

impl IngestOutcome {
    /// Whether the document's chunks are now searchable.
    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed { .. })
    }
}

impl fmt::Display for IngestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat { extension } => {
                let shown = if extension.is_empty() {
                    "(none)"
                } else {
                    extension.as_str()
                };
                write!(f, "Unsupported format: {}", shown)
            }
            Self::EmptyDocument { source } => {
                write!(f, "Document {} is empty or its text could not be extracted", source)
            }
            Self::NoChunks { source } => {
                write!(f, "Could not split {} into chunks", source)
            }
            Self::Indexed { source, chunks } => {
                write!(f, "Indexed {} chunks from {}", chunks, source)
            }
            Self::Failed { source, reason } => {
                write!(f, "Failed to process {}: {}", source, reason)
            }
        }
    }
}

/// Snapshot of the collection backing a pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub collection: String,

    /// Backend name ("qdrant" or "memory")
    pub backend: String,

    /// Whether the networked vector service is in use
    pub remote: bool,

    pub points: u64,
}
