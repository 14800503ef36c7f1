//! Retrieval/generation backend abstraction.

use crate::types::BackendAnswer;
use kbchat_core::AppResult;

/// A managed service that retrieves from a knowledge base and generates
/// an answer with supporting citations.
#[async_trait::async_trait]
pub trait KnowledgeBackend: Send + Sync {
    /// Backend name for logs.
    fn backend_name(&self) -> &str;

    /// Answer `query` from the knowledge base `knowledge_base_id`.
    async fn retrieve_and_generate(
        &self,
        query: &str,
        knowledge_base_id: &str,
    ) -> AppResult<BackendAnswer>;
}
