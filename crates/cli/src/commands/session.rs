//! Document session shared by `chat` and `ask`.
//!
//! Owns the pipeline and remembers which files were already ingested, keyed
//! by file name and size, so the same upload is not indexed twice.

use docrag_core::{config::AppConfig, AppResult};
use docrag_knowledge::rag::types::SourceRef;
use docrag_knowledge::{
    load_config, Answer, DocumentFormat, DocumentRag, IngestOutcome, RagConfig,
};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Characters of chunk text shown per source.
pub const SNIPPET_CHARS: usize = 300;

/// Status lines go here, never to stdout, which carries answers only.
pub type StatusWriter = Box<dyn Write + Send>;

pub struct Session {
    rag: DocumentRag,
    seen: HashSet<(String, u64)>,
    status: StatusWriter,
}

impl Session {
    /// Build the pipeline, reporting progress on stderr.
    pub async fn open(config: &AppConfig) -> AppResult<Self> {
        Self::open_with_status(config, Box::new(std::io::stderr())).await
    }

    pub async fn open_with_status(config: &AppConfig, status: StatusWriter) -> AppResult<Self> {
        let rag = DocumentRag::new(pipeline_config(config)?).await?;

        let mut session = Self {
            rag,
            seen: HashSet::new(),
            status,
        };
        if session.rag.is_remote() {
            session.status_line("Connected to the vector service");
        } else {
            session.status_line("Using in-memory index");
        }

        Ok(session)
    }

    fn status_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.status, "{}", line) {
            tracing::debug!("Could not write status line: {}", e);
        }
    }

    pub fn rag(&self) -> &DocumentRag {
        &self.rag
    }

    /// Ingest every document under `paths`, printing one status line each.
    ///
    /// Returns the number of documents newly indexed.
    pub async fn ingest(&mut self, paths: &[PathBuf]) -> usize {
        let mut indexed = 0;

        for path in collect_documents(paths) {
            if let Some(key) = upload_key(&path) {
                if self.seen.contains(&key) {
                    tracing::debug!("Already processed {:?}, skipping", path);
                    continue;
                }

                let outcome = self.rag.add_document(&path).await;
                self.report(&outcome);
                if outcome.is_indexed() {
                    self.seen.insert(key);
                    indexed += 1;
                }
            } else {
                let outcome = self.rag.add_document(&path).await;
                self.report(&outcome);
            }
        }

        indexed
    }

    fn report(&mut self, outcome: &IngestOutcome) {
        let mark = if outcome.is_indexed() { "✓" } else { "✗" };
        self.status_line(&format!("{} {}", mark, outcome));
    }
}

/// Pipeline config from the workspace file plus front-end overrides.
fn pipeline_config(config: &AppConfig) -> AppResult<RagConfig> {
    let mut rag_config = load_config(&config.config_path())?;
    if config.use_remote_index {
        rag_config.vector_store.use_remote = true;
    }
    if rag_config.embedding.endpoint.is_none() {
        rag_config.embedding.endpoint = config.ollama_url.clone();
    }
    Ok(rag_config)
}

/// Name and size of a file, the identity of an upload.
fn upload_key(path: &Path) -> Option<(String, u64)> {
    let name = path.file_name()?.to_string_lossy().into_owned();
    let size = std::fs::metadata(path).ok()?.len();
    Some((name, size))
}

/// Expand directories into the supported documents they contain.
///
/// Explicit file arguments are kept as given so unsupported ones are still
/// reported by the pipeline.
pub fn collect_documents(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut documents = Vec::new();

    for path in paths {
        if !path.is_dir() {
            documents.push(path.clone());
            continue;
        }

        let mut found: Vec<PathBuf> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|p| DocumentFormat::from_path(p).is_some())
            .collect();
        found.sort();
        documents.extend(found);
    }

    documents
}

/// Print an answer followed by its sources.
pub fn print_answer(answer: &Answer) {
    println!();
    println!("{}", answer.answer);

    if let Some(reason) = &answer.generation_error {
        tracing::debug!("Generation unavailable: {}", reason);
    }

    if answer.sources.is_empty() {
        return;
    }

    println!();
    println!("Sources:");
    for (i, source) in answer.sources.iter().enumerate() {
        print_source(i + 1, source);
    }
}

fn print_source(rank: usize, source: &SourceRef) {
    println!(
        "{}. {} (relevance: {:.0}%)",
        rank,
        source.source,
        source.score_percent()
    );
    println!("   {}", source.snippet(SNIPPET_CHARS));
}
