//! Error taxonomy of the retrieval pipeline.

use docrag_core::AppError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by extraction, chunking, embedding, indexing and
/// answer composition.
///
/// `add_document` and `answer_question` recover every one of these into a
/// status line or a fallback answer; they only escape from construction and
/// from the lower-level building blocks.
#[derive(Debug, Error)]
pub enum RagError {
    /// The file extension is not one of pdf, docx, xlsx, xls.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The file could not be read or parsed.
    #[error("Failed to extract text from {path:?}: {message}")]
    ExtractionFailed { path: PathBuf, message: String },

    /// Extraction succeeded but yielded only whitespace.
    #[error("Document is empty: {0}")]
    EmptyDocument(String),

    /// Stride `size - overlap` would be non-positive.
    #[error("Invalid chunk configuration: overlap {overlap} must be smaller than size {size}")]
    InvalidChunkConfig { size: usize, overlap: usize },

    #[error("Embedding failed ({provider}): {message}")]
    EmbeddingFailed { provider: String, message: String },

    /// A vector's length disagrees with the configured dimension.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Vector index unavailable ({backend}): {message}")]
    IndexUnavailable { backend: String, message: String },

    #[error("Upsert failed ({backend}): {message}")]
    UpsertFailed { backend: String, message: String },

    #[error("Search failed ({backend}): {message}")]
    SearchFailed { backend: String, message: String },

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RagError {
    pub(crate) fn extraction(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::ExtractionFailed {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl From<RagError> for AppError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::Config(message) => AppError::Config(message),
            other => AppError::Knowledge(other.to_string()),
        }
    }
}

/// Convenience result type for retrieval operations.
pub type RagResult<T> = Result<T, RagError>;
