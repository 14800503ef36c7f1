//! LLM integration crate for kbchat.
//!
//! A provider-agnostic text-generation interface used by the classifier
//! gate and by plain generation.
//!
//! # Providers
//! - **Ollama**: local LLM runtime (default)
//! - **OpenAI-compatible**: any `/v1/chat/completions` server
//!
//! # Example
//! ```no_run
//! use kbchat_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
pub use types::ProviderType;
