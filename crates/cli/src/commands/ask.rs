//! Ask command handler.
//!
//! Answers a single question from the knowledge base behind the prompt gate.

use super::shared::{build_chat_service, print_reply, GateArgs};
use clap::Args;
use kbchat_core::{config::AppConfig, AppResult};

/// Ask one question against the knowledge base
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Knowledge base id (default: knowledge.knowledgeBaseId)
    #[arg(long = "kb")]
    pub knowledge_base: Option<String>,

    #[command(flatten)]
    pub gate: GateArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let service = build_chat_service(config, &self.gate, self.knowledge_base.as_deref())?;
        let reply = service.respond(&self.query).await?;

        print_reply(&reply, self.json)
    }
}
