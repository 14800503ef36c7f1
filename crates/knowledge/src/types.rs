//! Answer, citation and chat reply types.

use serde::{Deserialize, Serialize};

/// Fixed reply for rejected queries. Never carries the rejection reason.
pub const DEFLECTION_MESSAGE: &str =
    "Unfortunately, I am unable to assist you with this question.";

/// Maximum snippet length for source references.
pub const MAX_SNIPPET_LENGTH: usize = 200;

/// A supporting excerpt returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Retrieved excerpt
    pub excerpt: String,

    /// Source locator, if the backend reported one
    pub uri: Option<String>,
}

/// Raw answer from the retrieval/generation backend, citations in backend order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendAnswer {
    pub text: String,
    pub citations: Vec<Citation>,
}

/// A user-facing source reference, unique per URI within one response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source URI
    pub uri: String,

    /// Short snippet of the supporting excerpt
    pub snippet: String,
}

/// Generated answer with its deduplicated sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResponse {
    pub answer: String,
    pub sources: Vec<SourceRef>,
}

impl RagResponse {
    pub fn new(answer: String, sources: Vec<SourceRef>) -> Self {
        Self { answer, sources }
    }

    /// Response when the backend generated nothing for an admitted query.
    pub fn no_information() -> Self {
        Self {
            answer: "I could not find this information in the knowledge base.".to_string(),
            sources: Vec::new(),
        }
    }
}

/// Result of one chat turn.
#[derive(Debug, Clone)]
pub enum ChatReply {
    /// The query was admitted and answered
    Answered(RagResponse),
    /// The query was rejected by the gate
    Deflected,
}

impl ChatReply {
    /// Text shown to the end user.
    pub fn message(&self) -> &str {
        match self {
            ChatReply::Answered(response) => &response.answer,
            ChatReply::Deflected => DEFLECTION_MESSAGE,
        }
    }

    /// Sources to display; empty when deflected.
    pub fn sources(&self) -> &[SourceRef] {
        match self {
            ChatReply::Answered(response) => &response.sources,
            ChatReply::Deflected => &[],
        }
    }

    pub fn is_deflected(&self) -> bool {
        matches!(self, ChatReply::Deflected)
    }

    /// JSON shape for `--json` output.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "answer": self.message(),
            "sources": self.sources(),
        })
    }
}
