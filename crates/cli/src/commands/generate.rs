//! Generate command handler.
//!
//! Sends an admitted prompt straight to the configured model, without
//! retrieval. Rejected prompts get the same deflection as chat.

use super::shared::{build_llm_client, build_prompt_gate, print_reply, GateArgs};
use clap::Args;
use kbchat_core::{config::AppConfig, AppResult};
use kbchat_knowledge::ChatService;

/// Gated generation without retrieval
#[derive(Args, Debug)]
pub struct GenerateCommand {
    /// The prompt to send
    pub prompt: String,

    #[command(flatten)]
    pub gate: GateArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl GenerateCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing generate command");

        let gate = build_prompt_gate(config, &self.gate)?;
        let client = build_llm_client(config)?;
        tracing::debug!(provider = client.provider_name(), model = %config.model, "Generator ready");

        let service = ChatService::new(gate).with_generator(client, config.model.clone());
        let reply = service.generate(&self.prompt).await?;

        print_reply(&reply, self.json)
    }
}
