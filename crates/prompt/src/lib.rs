//! Prompt system for kbchat.
//!
//! - YAML prompt definitions, overridable per workspace
//! - Built-in definitions compiled into the binary
//! - Handlebars rendering

pub mod builder;
pub mod loader;
pub mod types;

pub use builder::render_prompt;
pub use loader::{builtin_prompt, load_prompt, load_prompt_or_builtin};
pub use types::{PromptDefinition, PromptOutputSpec};
