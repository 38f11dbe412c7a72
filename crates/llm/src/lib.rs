//! LLM integration crate for DocRAG.
//!
//! This crate provides a provider-agnostic abstraction for the optional
//! generative step of question answering. One request produces one complete
//! answer; there is no token streaming.
//!
//! # Providers
//! - **Groq**: hosted, OpenAI-compatible chat completions (credential required)
//! - **Ollama**: local LLM runtime (no credential)
//!
//! # Example
//! ```no_run
//! use docrag_llm::{create_client, LlmRequest};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_client("groq", None, Some("gsk_..."), Duration::from_secs(20))?;
//! let request = LlmRequest::new("What is in the report?", "llama-3.1-8b-instant")
//!     .with_system("Answer concisely.")
//!     .with_temperature(0.3)
//!     .with_max_tokens(500);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{GroqClient, OllamaClient};
pub use types::ProviderType;
