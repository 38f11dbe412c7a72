//! Pipeline configuration management.
//!
//! The pipeline only ever receives a [`RagConfig`]. Loading it from
//! `.docrag/config.yaml` (the `rag:` section) is a convenience for the
//! front-end.

use crate::embeddings::EmbeddingConfig;
use crate::error::{RagError, RagResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for the vector-service liveness probe.
pub const MAX_PROBE_TIMEOUT_MS: u64 = 2_000;

/// Full pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Name of the single logical collection
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Window size in whitespace-delimited words
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Words repeated between consecutive windows
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

fn default_collection() -> String {
    "documents".to_string()
}

fn default_chunk_size() -> usize {
    500
}

fn default_chunk_overlap() -> usize {
    50
}

fn default_top_k() -> usize {
    3
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            embedding: EmbeddingConfig::default(),
            vector_store: VectorStoreConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl RagConfig {
    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> RagResult<()> {
        if self.chunk_size == 0 || self.chunk_overlap >= self.chunk_size {
            return Err(RagError::InvalidChunkConfig {
                size: self.chunk_size,
                overlap: self.chunk_overlap,
            });
        }

        if self.collection.trim().is_empty() {
            return Err(RagError::Config("collection name must not be empty".to_string()));
        }

        if self.top_k == 0 {
            return Err(RagError::Config("top_k must be positive".to_string()));
        }

        if self.embedding.dimensions == 0 {
            return Err(RagError::Config(
                "embedding dimensions must be positive".to_string(),
            ));
        }

        if self.vector_store.probe_timeout_ms == 0
            || self.vector_store.probe_timeout_ms > MAX_PROBE_TIMEOUT_MS
        {
            return Err(RagError::Config(format!(
                "vector store probe timeout must be within 1..={} ms, got {}",
                MAX_PROBE_TIMEOUT_MS, self.vector_store.probe_timeout_ms
            )));
        }

        Ok(())
    }
}

/// Location of the networked vector service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorStoreConfig {
    /// Try the networked service before the in-process index
    #[serde(default)]
    pub use_remote: bool,

    #[serde(default = "default_host")]
    pub host: String,

    /// gRPC port of the service
    #[serde(default = "default_port")]
    pub port: u16,

    /// Liveness probe bound; falls back to memory when exceeded
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    6334
}

fn default_probe_timeout_ms() -> u64 {
    MAX_PROBE_TIMEOUT_MS
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            use_remote: false,
            host: default_host(),
            port: default_port(),
            probe_timeout_ms: default_probe_timeout_ms(),
            api_key: None,
        }
    }
}

impl VectorStoreConfig {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// Settings of the optional generative step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Provider name ("groq" or "ollama")
    #[serde(default = "default_generation_provider")]
    pub provider: String,

    #[serde(default = "default_generation_model")]
    pub model: String,

    /// API base URL override
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound for one generation request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_generation_provider() -> String {
    "groq".to_string()
}

fn default_generation_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    500
}

fn default_request_timeout_secs() -> u64 {
    20
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_generation_provider(),
            model: default_generation_model(),
            endpoint: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl GenerationConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Layout of the on-disk config file; other top-level sections are ignored.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    rag: Option<RagConfig>,
}

/// Load pipeline configuration from a YAML file's `rag:` section.
///
/// Missing file or missing section yields defaults.
pub fn load_config(path: &Path) -> RagResult<RagConfig> {
    if !path.exists() {
        tracing::debug!("No config file at {:?}, using default pipeline config", path);
        return Ok(RagConfig::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| RagError::Config(format!("Failed to read config at {:?}: {}", path, e)))?;

    if content.trim().is_empty() {
        return Ok(RagConfig::default());
    }

    let file: ConfigFile = serde_yaml::from_str(&content)
        .map_err(|e| RagError::Config(format!("Failed to parse config at {:?}: {}", path, e)))?;

    let config = file.rag.unwrap_or_default();
    tracing::debug!("Loaded pipeline config from {:?}", path);
    Ok(config)
}

/// Save pipeline configuration under the `rag:` section of a YAML file.
pub fn save_config(path: &Path, config: &RagConfig) -> RagResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            RagError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }

    let file = ConfigFile {
        rag: Some(config.clone()),
    };
    let yaml = serde_yaml::to_string(&file)
        .map_err(|e| RagError::Config(format!("Failed to serialize config: {}", e)))?;

    fs::write(path, yaml)
        .map_err(|e| RagError::Config(format!("Failed to write config to {:?}: {}", path, e)))?;

    tracing::debug!("Saved pipeline config to {:?}", path);
    Ok(())
}

/// Default config path inside a workspace.
pub fn get_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".docrag").join("config.yaml")
}
