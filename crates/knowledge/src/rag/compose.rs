//! Answer composition from retrieved chunks.
//!
//! Either returns the retrieved context verbatim or asks a generative model
//! to answer from it. Generation is optional: any failure degrades to the
//! verbatim answer and is only logged.

use crate::config::GenerationConfig;
use crate::error::{RagError, RagResult};
use crate::rag::types::{Answer, GenerationOptions, SourceRef};
use crate::types::SearchHit;
use docrag_llm::{LlmRequest, ProviderType};
use tracing::instrument;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions about the user's documents. \
Answer concisely and only from the provided context. \
If the context does not contain the answer, say that the documents do not cover it.";

/// Builds answers with a fixed generation configuration.
#[derive(Debug, Clone)]
pub struct AnswerComposer {
    config: GenerationConfig,
}

impl AnswerComposer {
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Compose an answer for `question` from `hits` (best first).
    #[instrument(skip(self, question, hits, options), fields(hits = hits.len(), generation = options.enabled))]
    pub async fn compose(
        &self,
        question: &str,
        hits: &[SearchHit],
        options: &GenerationOptions,
    ) -> Answer {
        if hits.is_empty() {
            tracing::info!("No chunks retrieved, returning no-information answer");
            return Answer::no_information();
        }

        let context = build_context(hits);
        let sources: Vec<SourceRef> = hits.iter().map(SourceRef::from).collect();

        if !self.should_generate(options) {
            return Answer::verbatim(&context, sources);
        }

        match self.generate(question, &context, options.credential()).await {
            Ok(text) => Answer::generated(text, sources),
            Err(e) => {
                tracing::warn!("Generation failed, answering with retrieved context: {}", e);
                let mut answer = Answer::verbatim(&context, sources);
                answer.generation_error = Some(e.to_string());
                answer
            }
        }
    }

    /// Generation needs the switch on and, for hosted providers, a
    /// non-blank credential.
    fn should_generate(&self, options: &GenerationOptions) -> bool {
        if !options.enabled {
            return false;
        }

        let needs_credential = ProviderType::parse(&self.config.provider)
            .map(|p| p.requires_credential())
            .unwrap_or(true);

        !needs_credential || options.credential().is_some()
    }

    async fn generate(
        &self,
        question: &str,
        context: &str,
        credential: Option<&str>,
    ) -> RagResult<String> {
        tracing::debug!(
            "Generating answer with {} (model: {})",
            self.config.provider,
            self.config.model
        );

        let client = docrag_llm::create_client(
            &self.config.provider,
            self.config.endpoint.as_deref(),
            credential,
            self.config.request_timeout(),
        )
        .map_err(RagError::GenerationFailed)?;

        let request = LlmRequest::new(build_user_prompt(question, context), &self.config.model)
            .with_system(SYSTEM_PROMPT)
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        // The client timeout bounds the request; this guards connection setup too.
        let response = tokio::time::timeout(self.config.request_timeout(), client.complete(&request))
            .await
            .map_err(|_| {
                RagError::GenerationFailed(format!(
                    "request timed out after {}s",
                    self.config.request_timeout_secs
                ))
            })?
            .map_err(|e| RagError::GenerationFailed(e.to_string()))?;

        let text = response.content.trim().to_string();
        if text.is_empty() {
            return Err(RagError::GenerationFailed(
                "model returned an empty answer".to_string(),
            ));
        }
        Ok(text)
    }
}

/// Chunk texts joined by blank lines, best first.
pub fn build_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| hit.payload.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn build_user_prompt(question: &str, context: &str) -> String {
    format!(
        "Context from the documents:\n{}\n\nQuestion: {}\n\nAnswer:",
        context, question
    )
}
