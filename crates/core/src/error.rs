//! Error types for kbchat.
//!
//! A single error enum covers configuration, I/O, LLM transport, knowledge
//! backend, prompt and gate failures.

use thiserror::Error;

/// Unified error type for kbchat.
///
/// All fallible functions return `Result<T, AppError>`. The prompt gate is
/// the one place that never surfaces these to its caller.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Retrieval/generation backend errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt loading and rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Gate construction errors
    #[error("Gate error: {0}")]
    Gate(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
