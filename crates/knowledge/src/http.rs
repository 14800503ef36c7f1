//! HTTP client for a retrieve-and-generate endpoint.
//!
//! Request:
//! ```json
//! {"input": {"text": "..."},
//!  "retrieveAndGenerateConfiguration": {
//!    "type": "KNOWLEDGE_BASE",
//!    "knowledgeBaseConfiguration": {"knowledgeBaseId": "...", "modelArn": "..."}}}
//! ```
//!
//! Response:
//! ```json
//! {"output": {"text": "..."},
//!  "citations": [{"retrievedReferences": [
//!    {"content": {"text": "..."}, "location": {"s3Location": {"uri": "..."}}}]}]}
//! ```

use crate::backend::KnowledgeBackend;
use crate::types::{BackendAnswer, Citation};
use kbchat_core::config::KnowledgeConfig;
use kbchat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default timeout for one retrieve-and-generate round trip.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveAndGenerateRequest<'a> {
    input: InputText<'a>,
    retrieve_and_generate_configuration: RetrieveAndGenerateConfiguration<'a>,
}

#[derive(Debug, Serialize)]
struct InputText<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveAndGenerateConfiguration<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    knowledge_base_configuration: KnowledgeBaseConfiguration<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KnowledgeBaseConfiguration<'a> {
    knowledge_base_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_arn: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct RetrieveAndGenerateResponse {
    output: OutputText,
    #[serde(default)]
    citations: Vec<WireCitation>,
}

#[derive(Debug, Deserialize)]
struct OutputText {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCitation {
    #[serde(default)]
    retrieved_references: Vec<RetrievedReference>,
}

#[derive(Debug, Deserialize)]
struct RetrievedReference {
    #[serde(default)]
    content: Option<ReferenceContent>,
    #[serde(default)]
    location: Option<ReferenceLocation>,
}

#[derive(Debug, Deserialize)]
struct ReferenceContent {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReferenceLocation {
    #[serde(default)]
    s3_location: Option<UriLocation>,
    #[serde(default)]
    web_location: Option<UrlLocation>,
}

#[derive(Debug, Deserialize)]
struct UriLocation {
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UrlLocation {
    url: Option<String>,
}

impl ReferenceLocation {
    fn into_uri(self) -> Option<String> {
        self.s3_location
            .and_then(|l| l.uri)
            .or_else(|| self.web_location.and_then(|l| l.url))
    }
}

impl RetrieveAndGenerateResponse {
    /// Flatten nested references into citations, preserving order.
    fn into_answer(self) -> BackendAnswer {
        let citations = self
            .citations
            .into_iter()
            .flat_map(|c| c.retrieved_references)
            .map(|reference| Citation {
                excerpt: reference.content.map(|c| c.text).unwrap_or_default(),
                uri: reference.location.and_then(ReferenceLocation::into_uri),
            })
            .collect();

        BackendAnswer {
            text: self.output.text,
            citations,
        }
    }
}

/// Retrieve-and-generate backend over HTTP.
pub struct HttpKnowledgeBackend {
    endpoint: String,
    model_arn: Option<String>,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpKnowledgeBackend {
    /// Create a backend client for `endpoint`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Knowledge(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            model_arn: None,
            token: None,
            client,
        })
    }

    /// Build from configuration; the token is resolved by the caller.
    pub fn from_config(config: &KnowledgeConfig, token: Option<String>) -> AppResult<Self> {
        let endpoint = config.endpoint.as_deref().ok_or_else(|| {
            AppError::Config("knowledge.endpoint is not configured".to_string())
        })?;
        let timeout = config
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_BACKEND_TIMEOUT);

        let mut backend = Self::new(endpoint, timeout)?;
        backend.model_arn = config.model_arn.clone();
        backend.token = token;
        Ok(backend)
    }

    /// Set the generation model the backend should use.
    pub fn with_model_arn(mut self, model_arn: impl Into<String>) -> Self {
        self.model_arn = Some(model_arn.into());
        self
    }

    fn build_request<'a>(
        &'a self,
        query: &'a str,
        knowledge_base_id: &'a str,
    ) -> RetrieveAndGenerateRequest<'a> {
        RetrieveAndGenerateRequest {
            input: InputText { text: query },
            retrieve_and_generate_configuration: RetrieveAndGenerateConfiguration {
                kind: "KNOWLEDGE_BASE",
                knowledge_base_configuration: KnowledgeBaseConfiguration {
                    knowledge_base_id,
                    model_arn: self.model_arn.as_deref(),
                },
            },
        }
    }
}

#[async_trait::async_trait]
impl KnowledgeBackend for HttpKnowledgeBackend {
    fn backend_name(&self) -> &str {
        "http"
    }

    async fn retrieve_and_generate(
        &self,
        query: &str,
        knowledge_base_id: &str,
    ) -> AppResult<BackendAnswer> {
        tracing::debug!(
            endpoint = %self.endpoint,
            knowledge_base_id,
            "Sending retrieve-and-generate request"
        );

        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&self.build_request(query, knowledge_base_id));

        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            AppError::Knowledge(format!("Failed to reach knowledge backend: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Knowledge(format!(
                "Knowledge backend error ({}): {}",
                status, error_text
            )));
        }

        let body: RetrieveAndGenerateResponse = response.json().await.map_err(|e| {
            AppError::Knowledge(format!("Failed to parse knowledge backend response: {}", e))
        })?;

        let answer = body.into_answer();
        tracing::debug!(
            citations = answer.citations.len(),
            "Received retrieve-and-generate response"
        );

        Ok(answer)
    }
}
