//! DocRAG Core Library
//!
//! This crate provides the foundational utilities shared by the DocRAG crates:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Front-end configuration (workspace, logging, credentials)

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};
