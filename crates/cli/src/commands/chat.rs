//! Chat command handler.
//!
//! Interactive loop: ingest documents, then answer questions until EOF.

use super::session::{print_answer, Session};
use clap::Args;
use docrag_core::{config::AppConfig, AppResult};
use docrag_knowledge::GenerationOptions;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Ingest documents and start an interactive question session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Files or directories to ingest before the session starts
    pub files: Vec<PathBuf>,

    /// Rephrase answers with the generative model (needs a credential)
    #[arg(long)]
    pub llm: bool,
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command with {} paths", self.files.len());

        let mut session = Session::open(config).await?;
        session.ingest(&self.files).await;

        let options = if self.llm {
            if config.credential().is_none() {
                eprintln!("No API key configured; answers will quote the documents directly");
            }
            GenerationOptions::enabled(config.credential().map(str::to_string))
        } else {
            GenerationOptions::disabled()
        };

        println!();
        println!("Ask a question, ':add <path>' to ingest more documents, or ':quit' to exit.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();

            match line {
                "" => continue,
                ":quit" | ":q" | "exit" => break,
                ":stats" => {
                    let stats = session.rag().stats().await?;
                    println!(
                        "{} points in '{}' ({} backend)",
                        stats.points, stats.collection, stats.backend
                    );
                }
                _ if line.starts_with(":add ") => {
                    let path = PathBuf::from(line.trim_start_matches(":add ").trim());
                    session.ingest(&[path]).await;
                }
                _ if line.starts_with(':') => {
                    println!("Unknown command: {}", line);
                }
                question => {
                    let answer = session.rag().answer_question(question, &options).await;
                    print_answer(&answer);
                    println!();
                }
            }
        }

        Ok(())
    }
}
