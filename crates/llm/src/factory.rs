//! LLM provider factory.
//!
//! Creates LLM clients from a provider name, an optional endpoint override,
//! an optional credential and a request timeout.

use crate::client::LlmClient;
use crate::providers::{GroqClient, OllamaClient};
use crate::types::ProviderType;
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("groq", "ollama")
/// * `endpoint` - Optional custom API base URL
/// * `api_key` - Credential, required by hosted providers
/// * `timeout` - Upper bound for each request
///
/// # Errors
/// Returns error if:
/// - Provider is unknown
/// - Required credential is missing or blank
/// - HTTP client initialization fails
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> Result<Arc<dyn LlmClient>, String> {
    let provider_type =
        ProviderType::parse(provider).ok_or_else(|| format!("Unknown provider: {}", provider))?;

    let base_url = endpoint.unwrap_or(provider_type.default_endpoint());
    let api_key = api_key.map(str::trim).filter(|key| !key.is_empty());

    match provider_type {
        ProviderType::Groq => {
            let api_key =
                api_key.ok_or_else(|| "Groq provider requires API key".to_string())?;
            let client = GroqClient::new(base_url, api_key, timeout)
                .map_err(|e| format!("Failed to create Groq client: {}", e))?;
            Ok(Arc::new(client))
        }
        ProviderType::Ollama => {
            let client = OllamaClient::new(base_url, timeout)
                .map_err(|e| format!("Failed to create Ollama client: {}", e))?;
            Ok(Arc::new(client))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_create_groq_client() {
        let client = create_client("groq", None, Some("gsk_test"), TIMEOUT).unwrap();
        assert_eq!(client.provider_name(), "groq");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client("ollama", Some("http://localhost:8080"), None, TIMEOUT);
        assert!(client.is_ok());
    }

    #[test]
    fn test_groq_requires_api_key() {
        match create_client("groq", None, None, TIMEOUT) {
            Err(err) => assert!(err.contains("requires API key")),
            Ok(_) => panic!("Expected error for Groq without API key"),
        }
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        assert!(create_client("groq", None, Some("   "), TIMEOUT).is_err());
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None, TIMEOUT) {
            Err(err) => assert!(err.contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
