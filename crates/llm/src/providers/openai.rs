//! OpenAI-compatible chat completions provider.
//!
//! Works against any server exposing `POST /v1/chat/completions` with
//! bearer authentication.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use kbchat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// OpenAI-compatible LLM client.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client for `base_url` authenticating with `api_key`.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    fn to_chat_request(&self, request: &LlmRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: Some(system.clone()),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: Some(request.prompt.clone()),
        });

        ChatRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens,
        }
    }

    fn convert_response(&self, response: ChatResponse) -> AppResult<LlmResponse> {
        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Llm("Chat completion returned no choices".to_string()))?;

        let done = choice.finish_reason.as_deref() != Some("length");

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            model: response.model,
            usage,
            done,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(model = %request.model, "Sending chat completion request");

        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.to_chat_request(request))
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send chat request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Chat completions API error ({}): {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse chat response: {}", e)))?;

        self.convert_response(chat_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiClient {
        OpenAiClient::new("https://llm.internal/", "sk-test", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_chat_request_messages() {
        let request = LlmRequest::new("Is this in scope?", "gpt-4o-mini")
            .with_system("Answer with one label")
            .with_temperature(0.0)
            .with_max_tokens(16);

        let chat = client().to_chat_request(&request);
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, "system");
        assert_eq!(chat.messages[1].role, "user");
        assert_eq!(chat.messages[1].content.as_deref(), Some("Is this in scope?"));
        assert_eq!(chat.max_tokens, Some(16));
    }

    #[test]
    fn test_chat_request_without_system() {
        let chat = client().to_chat_request(&LlmRequest::new("hi", "m"));
        assert_eq!(chat.messages.len(), 1);
    }

    #[test]
    fn test_convert_response() {
        let raw: ChatResponse = serde_json::from_str(
            r#"{
                "model": "gpt-4o-mini",
                "choices": [{"message": {"role": "assistant", "content": "Category E"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 300, "completion_tokens": 3, "total_tokens": 303}
            }"#,
        )
        .unwrap();

        let response = client().convert_response(raw).unwrap();
        assert_eq!(response.content, "Category E");
        assert_eq!(response.usage.total_tokens, 303);
        assert!(response.done);
    }

    #[test]
    fn test_convert_response_no_choices() {
        let raw: ChatResponse =
            serde_json::from_str(r#"{"model": "gpt-4o-mini", "choices": []}"#).unwrap();
        assert!(client().convert_response(raw).is_err());
    }

    #[test]
    fn test_base_url_trimmed() {
        assert_eq!(client().base_url, "https://llm.internal");
    }
}
