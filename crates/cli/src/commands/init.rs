//! Init command handler.

use clap::Args;
use docrag_core::{config::AppConfig, AppError, AppResult};
use docrag_knowledge::{save_config, RagConfig};

/// Write a default configuration file
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let path = config.config_path();

        if path.exists() && !self.force {
            return Err(AppError::Config(format!(
                "Config file {:?} already exists (use --force to overwrite)",
                path
            )));
        }

        save_config(&path, &RagConfig::default())?;
        println!("Wrote default configuration to {}", path.display());

        Ok(())
    }
}
