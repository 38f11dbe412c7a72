//! Document question answering by retrieval.
//!
//! Ingests PDF, Word and spreadsheet files into a vector index of
//! overlapping word-window chunks, then answers questions from the most
//! similar chunks, optionally rephrased by a generative model.
//!
//! # Example
//! ```no_run
//! use docrag_knowledge::{DocumentRag, GenerationOptions, RagConfig};
//! use std::path::Path;
//!
//! # async fn run() -> docrag_knowledge::RagResult<()> {
//! let rag = DocumentRag::new(RagConfig::default()).await?;
//! println!("{}", rag.add_document(Path::new("report.pdf")).await);
//!
//! let answer = rag
//!     .answer_question("What was Q1 revenue?", &GenerationOptions::disabled())
//!     .await;
//! println!("{}", answer.answer);
//! # Ok(())
//! # }
//! ```

pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod extract;
pub mod memory_index;
pub mod pipeline;
pub mod qdrant_index;
pub mod rag;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

pub use chunker::Chunker;
pub use config::{load_config, save_config, GenerationConfig, RagConfig, VectorStoreConfig};
pub use embeddings::{Embedder, EmbeddingConfig, EmbeddingProvider};
pub use error::{RagError, RagResult};
pub use extract::{DocumentFormat, ExtractorRegistry, TextExtractor};
pub use pipeline::DocumentRag;
pub use rag::{Answer, AnswerComposer, AnswerMode, GenerationOptions, SourceRef};
pub use types::{DocumentChunk, IndexStats, IngestOutcome, SearchHit};
pub use vector_index::{connect_index, IndexHandle, VectorIndex};
