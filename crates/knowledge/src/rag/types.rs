//! Answer types returned to the front-end.

use crate::types::SearchHit;
use serde::{Deserialize, Serialize};

/// Canned answer when retrieval finds nothing.
pub const NO_INFORMATION_ANSWER: &str =
    "I could not find relevant information in the uploaded documents.";

/// Label prefixed to the verbatim context dump.
pub const VERBATIM_LABEL: &str = "Found information:";

/// A retrieved chunk shown as evidence for an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Full chunk text
    pub text: String,

    /// Cosine similarity to the question
    pub score: f32,

    /// Base name of the originating document
    pub source: String,
}

impl SourceRef {
    /// First `max_chars` characters of the text, with an ellipsis when cut.
    pub fn snippet(&self, max_chars: usize) -> String {
        match self.text.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &self.text[..cut]),
            None => self.text.clone(),
        }
    }

    /// Score as a whole percentage for display.
    pub fn score_percent(&self) -> f32 {
        (self.score * 100.0).round()
    }
}

impl From<&SearchHit> for SourceRef {
    fn from(hit: &SearchHit) -> Self {
        Self {
            text: hit.payload.text.clone(),
            score: hit.score,
            source: hit.payload.source.clone(),
        }
    }
}

/// How the answer text was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMode {
    NoInformation,
    Verbatim,
    Generated,
}

/// Answer to a question plus the chunks it is grounded on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,

    /// Retrieved chunks in descending score order
    pub sources: Vec<SourceRef>,

    /// Internal: answer provenance, for logging and tests
    #[serde(skip_serializing, default = "default_mode")]
    pub mode: AnswerMode,

    /// Internal: why generation fell back to the verbatim context
    #[serde(skip_serializing, default)]
    pub generation_error: Option<String>,
}

fn default_mode() -> AnswerMode {
    AnswerMode::Verbatim
}

impl Answer {
    /// Answer for a question with no retrieved chunks.
    pub fn no_information() -> Self {
        Self {
            answer: NO_INFORMATION_ANSWER.to_string(),
            sources: Vec::new(),
            mode: AnswerMode::NoInformation,
            generation_error: None,
        }
    }

    /// Labeled dump of the retrieved context.
    pub fn verbatim(context: &str, sources: Vec<SourceRef>) -> Self {
        Self {
            answer: format!("{}\n\n{}", VERBATIM_LABEL, context),
            sources,
            mode: AnswerMode::Verbatim,
            generation_error: None,
        }
    }

    pub fn generated(answer: String, sources: Vec<SourceRef>) -> Self {
        Self {
            answer,
            sources,
            mode: AnswerMode::Generated,
            generation_error: None,
        }
    }
}

/// Per-question switches for the generative step.
#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    pub enabled: bool,
    pub credential: Option<String>,
}

impl GenerationOptions {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn enabled(credential: Option<String>) -> Self {
        Self {
            enabled: true,
            credential,
        }
    }

    /// Credential trimmed, or `None` when absent or blank.
    pub fn credential(&self) -> Option<&str> {
        self.credential
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
