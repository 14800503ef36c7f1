//! Template rendering for prompt definitions.

use crate::types::PromptDefinition;
use handlebars::Handlebars;
use kbchat_core::{AppError, AppResult};
use serde::Serialize;

/// Render a prompt definition with the given variables.
///
/// Rendering is strict: a template that references a variable missing
/// from `variables` is an error rather than an empty substitution.
///
/// # Example
/// ```no_run
/// use kbchat_prompt::{builtin_prompt, render_prompt};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = builtin_prompt("gate.classify.default")?;
/// let vars = serde_json::json!({"query": "engine specs?", "domain": "heavy machinery", "categories": []});
/// println!("{}", render_prompt(&def, &vars)?);
/// # Ok(())
/// # }
/// ```
pub fn render_prompt<T: Serialize>(definition: &PromptDefinition, variables: &T) -> AppResult<String> {
    tracing::debug!("Rendering prompt: {}", definition.id);

    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);

    // Plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string(&definition.id, &definition.template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render(&definition.id, variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
