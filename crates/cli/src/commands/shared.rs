//! Wiring shared by the chat commands.
//!
//! Clients, gates and backends are built here from the loaded
//! configuration for each command invocation and passed down explicitly.

use clap::Args;
use kbchat_core::{config::AppConfig, AppError, AppResult};
use kbchat_gate::{build_gate, GateStrategy, PromptGate};
use kbchat_knowledge::{ChatReply, ChatService, HttpKnowledgeBackend};
use kbchat_llm::{create_client, LlmClient};
use std::sync::Arc;
use std::time::Duration;

/// Gate selection flags.
#[derive(Args, Debug, Clone, Default)]
pub struct GateArgs {
    /// Gate strategy (keyword, classifier); overrides gate.strategy
    #[arg(long)]
    pub strategy: Option<String>,

    /// Classifier timeout in seconds; overrides gate.timeoutSecs
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub gate_timeout: Option<u64>,
}

/// Build the configured LLM client.
pub fn build_llm_client(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    let provider_config = config.get_provider_config(&config.provider);
    let endpoint = provider_config.and_then(|pc| pc.endpoint());
    let timeout = provider_config
        .and_then(|pc| pc.timeout())
        .map(Duration::from_secs);
    let api_key = config.resolve_api_key(&config.provider);

    create_client(&config.provider, endpoint, api_key.as_deref(), timeout)
        .map_err(AppError::Config)
}

/// Build the prompt gate, honoring CLI overrides.
pub fn build_prompt_gate(config: &AppConfig, args: &GateArgs) -> AppResult<Arc<dyn PromptGate>> {
    let mut gate_config = config.gate.clone();
    if let Some(ref strategy) = args.strategy {
        gate_config.strategy = strategy.clone();
    }
    if let Some(timeout) = args.gate_timeout {
        gate_config.timeout_secs = timeout;
    }

    let classifier = match GateStrategy::parse(&gate_config.strategy) {
        Some(GateStrategy::Classifier) => Some((
            build_llm_client(config)?,
            config.classifier_model().to_string(),
        )),
        _ => None,
    };

    let gate = build_gate(&gate_config, &config.workspace, classifier)?;
    tracing::debug!(gate = gate.name(), "Prompt gate ready");
    Ok(gate)
}

/// Build a chat service answering from the knowledge base.
pub fn build_chat_service(
    config: &AppConfig,
    args: &GateArgs,
    knowledge_base: Option<&str>,
) -> AppResult<ChatService> {
    let knowledge_base_id = knowledge_base
        .map(str::to_string)
        .or_else(|| config.knowledge.knowledge_base_id.clone())
        .ok_or_else(|| {
            AppError::Config(
                "No knowledge base id. Pass --kb or set knowledge.knowledgeBaseId".to_string(),
            )
        })?;

    let gate = build_prompt_gate(config, args)?;
    let backend =
        HttpKnowledgeBackend::from_config(&config.knowledge, config.resolve_knowledge_token())?;

    Ok(ChatService::new(gate).with_knowledge_base(Arc::new(backend), knowledge_base_id))
}

/// Print a reply: answer on stdout, then sources.
pub fn print_reply(reply: &ChatReply, json: bool) -> AppResult<()> {
    if json {
        let rendered = serde_json::to_string_pretty(&reply.to_json())?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("{}", reply.message());

    let sources = reply.sources();
    if !sources.is_empty() {
        println!();
        println!("Sources:");
        for (i, source) in sources.iter().enumerate() {
            println!("  [{}] {}", i + 1, source.uri);
            println!("      {}", source.snippet);
        }
    }

    Ok(())
}
