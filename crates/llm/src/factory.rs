//! LLM provider factory.
//!
//! Builds a client from a provider name, optional endpoint, API key and
//! timeout. The caller owns the returned `Arc` and passes it on explicitly.

use crate::client::LlmClient;
use crate::providers::{ollama, openai, OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use std::sync::Arc;
use std::time::Duration;

/// Default request timeout for providers that have none configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Create an LLM client based on the provider name.
///
/// # Errors
/// Returns a message if the provider is unknown, a required API key is
/// missing, or the HTTP client cannot be built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Option<Duration>,
) -> Result<Arc<dyn LlmClient>, String> {
    let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);

    match ProviderType::parse(provider) {
        Some(ProviderType::Ollama) => {
            let base_url = endpoint.unwrap_or(ollama::DEFAULT_OLLAMA_URL);
            let client = OllamaClient::with_timeout(base_url, timeout).map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
        Some(ProviderType::OpenAI) => {
            let api_key = api_key.ok_or_else(|| "OpenAI provider requires API key".to_string())?;
            let base_url = endpoint.unwrap_or(openai::DEFAULT_OPENAI_URL);
            let client =
                OpenAiClient::new(base_url, api_key, timeout).map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
        None => Err(format!("Unknown provider: {}", provider)),
    }
}
