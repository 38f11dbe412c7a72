//! Grounded question answering over retrieved chunks.
//!
//! Retrieval itself lives in the pipeline; this module turns ranked chunks
//! into an [`Answer`], optionally rephrased by a generative model.

pub mod compose;
pub mod types;

pub use compose::AnswerComposer;
pub use types::{Answer, AnswerMode, GenerationOptions, SourceRef};
