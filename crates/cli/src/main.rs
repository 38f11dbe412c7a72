//! DocRAG CLI
//!
//! Main entry point for the docrag command-line tool.
//! Ingests office documents and answers questions from their content.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, InitCommand};
use docrag_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// DocRAG - ask questions about your documents
#[derive(Parser, Debug)]
#[command(name = "docrag")]
#[command(about = "Question answering over PDF, Word and spreadsheet files", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "DOCRAG_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "DOCRAG_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Try the networked vector service before the in-memory index
    #[arg(long, global = true)]
    remote: bool,

    /// Credential for the generative model
    #[arg(long, global = true, hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest documents and start an interactive question session
    Chat(ChatCommand),

    /// Ingest documents and answer a single question
    Ask(AskCommand),

    /// Write a default configuration file
    Init(InitCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.api_key,
        cli.remote,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("DocRAG CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Remote index requested: {}", config.use_remote_index);

    config.ensure_state_dir()?;

    let command_name = match &cli.command {
        Commands::Chat(_) => "chat",
        Commands::Ask(_) => "ask",
        Commands::Init(_) => "init",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Init(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
