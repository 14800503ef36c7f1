//! Delegated semantic classification gate.
//!
//! Asks a text-generation model to sort the query into one of the
//! [`Category`] rubric labels. Any failure of that call rejects the query.

use crate::category::{Category, Classification};
use crate::PromptGate;
use kbchat_core::AppResult;
use kbchat_llm::{LlmClient, LlmRequest};
use kbchat_prompt::{render_prompt, PromptDefinition};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Default bound on a single classifier round trip.
pub const DEFAULT_CLASSIFIER_TIMEOUT: Duration = Duration::from_secs(3);

/// Output budget when the prompt definition does not set one.
const DEFAULT_LABEL_TOKENS: u32 = 16;

#[derive(Serialize)]
struct RubricEntry {
    label: &'static str,
    description: String,
}

#[derive(Serialize)]
struct ClassifierVariables<'a> {
    query: &'a str,
    domain: &'a str,
    categories: Vec<RubricEntry>,
}

/// Gate backed by an external classifier model.
pub struct ClassifierGate {
    client: Arc<dyn LlmClient>,
    model: String,
    domain: String,
    prompt: PromptDefinition,
    timeout: Duration,
}

impl ClassifierGate {
    /// Create a classifier gate using `model` on `client`.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self {
            client,
            model: model.into(),
            domain: "heavy machinery".to_string(),
            prompt,
            timeout: DEFAULT_CLASSIFIER_TIMEOUT,
        }
    }

    /// Set the domain named in the rubric.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the classifier call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Render the classification instruction for one query.
    pub fn build_instruction(&self, query: &str) -> AppResult<String> {
        let variables = ClassifierVariables {
            query,
            domain: &self.domain,
            categories: Category::ALL
                .iter()
                .map(|category| RubricEntry {
                    label: category.label(),
                    description: category.description(&self.domain),
                })
                .collect(),
        };

        render_prompt(&self.prompt, &variables)
    }

    fn build_request(&self, instruction: String) -> LlmRequest {
        LlmRequest::new(instruction, &self.model)
            .with_temperature(0.0)
            .with_max_tokens(self.prompt.output.max_tokens.unwrap_or(DEFAULT_LABEL_TOKENS))
    }
}

#[async_trait::async_trait]
impl PromptGate for ClassifierGate {
    fn name(&self) -> &str {
        "classifier"
    }

    async fn classify(&self, query: &str) -> Classification {
        let instruction = match self.build_instruction(query) {
            Ok(instruction) => instruction,
            Err(e) => {
                tracing::warn!(error = %e, "Classifier prompt could not be rendered; rejecting");
                return Classification::Failed;
            }
        };

        let request = self.build_request(instruction);

        let response =
            match tokio::time::timeout(self.timeout, self.client.complete(&request)).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    tracing::warn!(
                        provider = self.client.provider_name(),
                        model = %self.model,
                        error = %e,
                        "Classifier call failed; rejecting"
                    );
                    return Classification::Failed;
                }
                Err(_) => {
                    tracing::warn!(
                        provider = self.client.provider_name(),
                        model = %self.model,
                        timeout_ms = self.timeout.as_millis() as u64,
                        "Classifier call timed out; rejecting"
                    );
                    return Classification::Failed;
                }
            };

        let classification = Classification::from_label(&response.content);
        if let Classification::Unrecognized(ref raw) = classification {
            tracing::debug!(label = %raw, "Classifier returned an unrecognized label");
        }

        classification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbchat_prompt::builtin_prompt;

    struct NoopClient;

    #[async_trait::async_trait]
    impl LlmClient for NoopClient {
        fn provider_name(&self) -> &str {
            "noop"
        }

        async fn complete(&self, _request: &LlmRequest) -> AppResult<kbchat_llm::LlmResponse> {
            Err(kbchat_core::AppError::Llm("noop".to_string()))
        }
    }

    fn gate() -> ClassifierGate {
        ClassifierGate::new(
            Arc::new(NoopClient),
            "llama3.2",
            builtin_prompt("gate.classify.default").unwrap(),
        )
    }

    #[test]
    fn test_instruction_embeds_query_and_rubric() {
        let instruction = gate()
            .with_domain("farm equipment")
            .build_instruction("How much does the T7 tractor weigh?")
            .unwrap();

        assert!(instruction.contains("How much does the T7 tractor weigh?"));
        assert!(instruction.contains("farm equipment"));
        for category in Category::ALL {
            assert!(instruction.contains(category.label()));
        }
    }

    #[test]
    fn test_request_is_deterministic_and_short() {
        let gate = gate();
        let request = gate.build_request("instruction".to_string());
        assert_eq!(request.model, "llama3.2");
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.max_tokens, Some(16));
    }
}
