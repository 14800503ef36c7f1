//! Knowledge-base chat for kbchat.
//!
//! - [`KnowledgeBackend`]: retrieval/generation service abstraction
//! - [`HttpKnowledgeBackend`]: retrieve-and-generate over HTTP
//! - [`ChatService`]: gate, then backend, then deduplicated citations
//!
//! # Example
//! ```no_run
//! use kbchat_gate::KeywordGate;
//! use kbchat_knowledge::{ChatService, HttpKnowledgeBackend};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gate = Arc::new(KeywordGate::new(["excavator"]));
//! let backend = Arc::new(HttpKnowledgeBackend::new(
//!     "http://localhost:9000/retrieveAndGenerate",
//!     Duration::from_secs(30),
//! )?);
//! let service = ChatService::new(gate).with_knowledge_base(backend, "KB-123");
//!
//! let reply = service.respond("How deep can the x950 excavator dig?").await?;
//! println!("{}", reply.message());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod chat;
pub mod http;
pub mod sources;
pub mod types;

#[cfg(test)]
mod tests;

pub use backend::KnowledgeBackend;
pub use chat::ChatService;
pub use http::HttpKnowledgeBackend;
pub use sources::{dedupe_citations, truncate_snippet};
pub use types::{
    BackendAnswer, ChatReply, Citation, RagResponse, SourceRef, DEFLECTION_MESSAGE,
};
