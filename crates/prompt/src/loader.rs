//! Prompt loader for YAML prompt definitions.
//!
//! Workspace files under `.kbchat/prompts/<id>.yml` override the built-in
//! definitions compiled into the binary.

use crate::types::PromptDefinition;
use kbchat_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Built-in prompt definitions as `(id, yaml)` pairs.
const BUILTIN_PROMPTS: &[(&str, &str)] = &[(
    "gate.classify.default",
    include_str!("../builtin/gate.classify.default.yml"),
)];

/// Load a prompt definition by ID from the workspace.
///
/// # Example
/// ```no_run
/// use kbchat_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "gate.classify.default")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompt_path(workspace_path, prompt_id);

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition = parse_prompt(&contents)
        .map_err(|e| AppError::Prompt(format!("{:?}: {}", prompt_file, e)))?;

    if definition.id != prompt_id {
        return Err(AppError::Prompt(format!(
            "Prompt file {:?} declares id '{}'",
            prompt_file, definition.id
        )));
    }

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Load a prompt from the workspace, falling back to the built-in definition.
pub fn load_prompt_or_builtin(
    workspace_path: &Path,
    prompt_id: &str,
) -> AppResult<PromptDefinition> {
    if prompt_path(workspace_path, prompt_id).exists() {
        return load_prompt(workspace_path, prompt_id);
    }

    builtin_prompt(prompt_id)
}

/// Get a built-in prompt definition.
pub fn builtin_prompt(prompt_id: &str) -> AppResult<PromptDefinition> {
    let (_, yaml) = BUILTIN_PROMPTS
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)))?;

    tracing::debug!("Using built-in prompt: {}", prompt_id);
    parse_prompt(yaml)
}

fn prompt_path(workspace_path: &Path, prompt_id: &str) -> PathBuf {
    workspace_path
        .join(".kbchat/prompts")
        .join(format!("{}.yml", prompt_id))
}

fn parse_prompt(contents: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt YAML: {}", e)))?;

    validate_prompt(&definition)?;
    Ok(definition)
}

fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, id: &str, body: &str) {
        let prompts_dir = dir.join(".kbchat/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();
        fs::write(prompts_dir.join(format!("{}.yml", id)), body).unwrap();
    }

    fn valid_yaml(id: &str) -> String {
        format!(
            r#"
id: {}
title: "Workspace classifier"
apiVersion: "1.0"
template: "Classify: {{{{query}}}}"
output:
  format: label
"#,
            id
        )
    }

    #[test]
    fn test_builtin_classifier_prompt_parses() {
        let def = builtin_prompt("gate.classify.default").unwrap();
        assert_eq!(def.id, "gate.classify.default");
        assert!(def.template.contains("{{query}}"));
        assert!(def.template.contains("{{#each categories}}"));
        assert_eq!(def.output.max_tokens, Some(16));
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(builtin_prompt("nope").is_err());
    }

    #[test]
    fn test_load_valid_prompt() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "gate.custom", &valid_yaml("gate.custom"));

        let prompt = load_prompt(temp_dir.path(), "gate.custom").unwrap();
        assert_eq!(prompt.title, "Workspace classifier");
        assert_eq!(prompt.template, "Classify: {{query}}");
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_prompt(temp_dir.path(), "nonexistent").is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "broken", "invalid: yaml: content:");
        assert!(load_prompt(temp_dir.path(), "broken").is_err());
    }

    #[test]
    fn test_load_mismatched_id() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "gate.a", &valid_yaml("gate.b"));
        let err = load_prompt(temp_dir.path(), "gate.a").unwrap_err();
        assert!(err.to_string().contains("declares id"));
    }

    #[test]
    fn test_workspace_overrides_builtin() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            "gate.classify.default",
            &valid_yaml("gate.classify.default"),
        );

        let prompt = load_prompt_or_builtin(temp_dir.path(), "gate.classify.default").unwrap();
        assert_eq!(prompt.title, "Workspace classifier");
    }

    #[test]
    fn test_falls_back_to_builtin() {
        let temp_dir = TempDir::new().unwrap();
        let prompt = load_prompt_or_builtin(temp_dir.path(), "gate.classify.default").unwrap();
        assert_eq!(prompt.title, "Query admission classifier");
    }
}
