//! Chat turn orchestration: gate, then backend, then citation display.

use crate::backend::KnowledgeBackend;
use crate::sources::dedupe_citations;
use crate::types::{ChatReply, RagResponse, MAX_SNIPPET_LENGTH};
use kbchat_core::{AppError, AppResult};
use kbchat_gate::PromptGate;
use kbchat_llm::{LlmClient, LlmRequest};
use std::sync::Arc;

/// Answers user queries behind a prompt gate.
///
/// Holds shared, explicitly constructed collaborators and no per-query
/// state, so one service can answer concurrent requests.
pub struct ChatService {
    gate: Arc<dyn PromptGate>,
    knowledge: Option<(Arc<dyn KnowledgeBackend>, String)>,
    generator: Option<(Arc<dyn LlmClient>, String)>,
}

impl ChatService {
    /// Create a service with only a gate; add collaborators with the builders.
    pub fn new(gate: Arc<dyn PromptGate>) -> Self {
        Self {
            gate,
            knowledge: None,
            generator: None,
        }
    }

    /// Answer from `knowledge_base_id` on `backend`.
    pub fn with_knowledge_base(
        mut self,
        backend: Arc<dyn KnowledgeBackend>,
        knowledge_base_id: impl Into<String>,
    ) -> Self {
        self.knowledge = Some((backend, knowledge_base_id.into()));
        self
    }

    /// Enable plain generation through `client` using `model`.
    pub fn with_generator(mut self, client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        self.generator = Some((client, model.into()));
        self
    }

    pub fn knowledge_base_id(&self) -> Option<&str> {
        self.knowledge.as_ref().map(|(_, id)| id.as_str())
    }

    /// Answer one query from the knowledge base.
    ///
    /// Rejected queries never reach the backend. Backend failures are
    /// returned as errors; gate failures have already become rejections.
    pub async fn respond(&self, query: &str) -> AppResult<ChatReply> {
        let (backend, knowledge_base_id) = self.knowledge.as_ref().ok_or_else(|| {
            AppError::Config("No knowledge base configured".to_string())
        })?;

        if !self.admitted(query).await {
            return Ok(ChatReply::Deflected);
        }

        tracing::debug!(
            backend = backend.backend_name(),
            knowledge_base_id = %knowledge_base_id,
            "Forwarding admitted query"
        );
        let answer = backend
            .retrieve_and_generate(query, knowledge_base_id)
            .await?;

        if answer.text.trim().is_empty() {
            tracing::info!("Backend returned an empty answer");
            return Ok(ChatReply::Answered(RagResponse::no_information()));
        }

        let sources = dedupe_citations(&answer.citations, MAX_SNIPPET_LENGTH);
        tracing::info!(
            citations = answer.citations.len(),
            sources = sources.len(),
            "Answered from knowledge base"
        );

        Ok(ChatReply::Answered(RagResponse::new(answer.text, sources)))
    }

    /// Gated plain generation without retrieval.
    pub async fn generate(&self, prompt: &str) -> AppResult<ChatReply> {
        let (client, model) = self.generator.as_ref().ok_or_else(|| {
            AppError::Config("No generation model configured".to_string())
        })?;

        if !self.admitted(prompt).await {
            return Ok(ChatReply::Deflected);
        }

        let request = LlmRequest::new(prompt, model.as_str())
            .with_temperature(0.5)
            .with_top_p(0.9)
            .with_max_tokens(512);

        let response = client.complete(&request).await?;
        tracing::debug!(
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "Generated answer"
        );

        Ok(ChatReply::Answered(RagResponse::new(response.content, Vec::new())))
    }

    async fn admitted(&self, query: &str) -> bool {
        let classification = self.gate.classify(query).await;
        if classification.is_admitted() {
            return true;
        }

        // Operator-only; the user sees the generic deflection.
        tracing::info!(
            gate = self.gate.name(),
            classification = %classification,
            "Query rejected by prompt gate"
        );
        false
    }
}
