//! Prompt admission gate for kbchat.
//!
//! Decides whether a user query may consume the retrieval/generation
//! backend. Two interchangeable strategies implement [`PromptGate`]:
//!
//! - [`KeywordGate`]: local, case-insensitive keyword membership
//! - [`ClassifierGate`]: asks an LLM for a category label, failing closed
//!
//! Gates hold no per-query state; one instance serves concurrent callers.
//!
//! # Example
//! ```no_run
//! use kbchat_gate::{KeywordGate, PromptGate};
//!
//! # async fn example() {
//! let gate = KeywordGate::new(["excavator", "engine"]);
//! assert!(gate.admit("What engine does the x950 excavator use?").await);
//! # }
//! ```

pub mod category;
pub mod classifier;
pub mod keyword;

#[cfg(test)]
mod tests;

use kbchat_core::config::{canonical_strategy, GateConfig};
use kbchat_core::{AppError, AppResult};
use kbchat_llm::LlmClient;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub use category::{Category, Classification};
pub use classifier::ClassifierGate;
pub use keyword::KeywordGate;

/// Classify-then-decide contract shared by all gate strategies.
#[async_trait::async_trait]
pub trait PromptGate: Send + Sync {
    /// Strategy name ("keyword", "classifier").
    fn name(&self) -> &str;

    /// Assign exactly one classification to the query. Never errors.
    async fn classify(&self, query: &str) -> Classification;

    /// Admission decision for the query.
    async fn admit(&self, query: &str) -> bool {
        self.classify(query).await.is_admitted()
    }
}

/// Gate strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStrategy {
    Keyword,
    Classifier,
}

impl GateStrategy {
    /// Parse strategy from string, with the same aliases config validation accepts.
    pub fn parse(s: &str) -> Option<Self> {
        match canonical_strategy(s)? {
            "keyword" => Some(Self::Keyword),
            _ => Some(Self::Classifier),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Classifier => "classifier",
        }
    }
}

/// Build the configured gate.
///
/// The classifier strategy needs an explicitly constructed client and a
/// model identifier; without a client it is a configuration error here,
/// never a runtime admission error.
pub fn build_gate(
    config: &GateConfig,
    workspace: &Path,
    classifier: Option<(Arc<dyn LlmClient>, String)>,
) -> AppResult<Arc<dyn PromptGate>> {
    let strategy = GateStrategy::parse(&config.strategy).ok_or_else(|| {
        AppError::Gate(format!("Unknown gate strategy: {}", config.strategy))
    })?;

    tracing::debug!(strategy = strategy.as_str(), "Building prompt gate");

    match strategy {
        GateStrategy::Keyword => {
            let gate = KeywordGate::new(&config.keywords);
            if gate.keywords().is_empty() {
                return Err(AppError::Gate(
                    "Keyword gate requires at least one keyword".to_string(),
                ));
            }
            Ok(Arc::new(gate))
        }
        GateStrategy::Classifier => {
            if config.timeout_secs == 0 {
                return Err(AppError::Gate(
                    "Classifier gate timeout must be greater than zero".to_string(),
                ));
            }

            let (client, model) = classifier.ok_or_else(|| {
                AppError::Gate("Classifier gate requires an LLM client".to_string())
            })?;
            let prompt = kbchat_prompt::load_prompt_or_builtin(workspace, &config.prompt_id)?;

            let gate = ClassifierGate::new(client, model, prompt)
                .with_domain(config.domain.clone())
                .with_timeout(Duration::from_secs(config.timeout_secs));
            Ok(Arc::new(gate))
        }
    }
}
