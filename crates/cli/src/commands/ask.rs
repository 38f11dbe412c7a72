//! Ask command handler.
//!
//! One-shot ingest of the given documents followed by a single answer.

use super::session::{print_answer, Session};
use clap::Args;
use docrag_core::{config::AppConfig, AppError, AppResult};
use docrag_knowledge::GenerationOptions;
use std::path::PathBuf;

/// Ingest documents and answer a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// Files or directories to ingest
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Question to answer
    #[arg(short, long)]
    pub question: String,

    /// Rephrase the answer with the generative model (needs a credential)
    #[arg(long)]
    pub llm: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command over {} paths", self.files.len());

        let question = self.question.trim();
        if question.is_empty() {
            return Err(AppError::Other("Question must not be empty".to_string()));
        }

        let mut session = Session::open(config).await?;
        let indexed = session.ingest(&self.files).await;
        tracing::debug!("{} documents indexed", indexed);

        let options = if self.llm {
            GenerationOptions::enabled(config.credential().map(str::to_string))
        } else {
            GenerationOptions::disabled()
        };

        let answer = session.rag().answer_question(question, &options).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&answer)?);
        } else {
            print_answer(&answer);
        }

        Ok(())
    }
}
