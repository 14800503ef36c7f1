//! Interactive chat session.
//!
//! Reads one query per line from stdin. Each line is an independent turn;
//! no history is carried between turns.

use super::shared::{build_chat_service, print_reply, GateArgs};
use clap::Args;
use kbchat_core::{config::AppConfig, AppResult};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::Instrument;

/// Interactive chat session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Knowledge base id (default: knowledge.knowledgeBaseId)
    #[arg(long = "kb")]
    pub knowledge_base: Option<String>,

    #[command(flatten)]
    pub gate: GateArgs,

    /// Output each reply as JSON
    #[arg(long)]
    pub json: bool,
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting chat session");

        let service = build_chat_service(config, &self.gate, self.knowledge_base.as_deref())?;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        if !self.json {
            println!("Ask about the knowledge base. Type 'exit' to quit.");
        }

        let mut turns = 0usize;
        loop {
            if !self.json {
                print!("> ");
                std::io::stdout().flush()?;
            }

            let Some(line) = lines.next_line().await? else {
                break;
            };

            let query = line.trim();
            if query.is_empty() {
                continue;
            }
            if is_exit(query) {
                break;
            }

            turns += 1;
            let turn = tracing::debug_span!("turn", n = turns);

            // A failed turn is reported and the session continues.
            match service.respond(query).instrument(turn).await {
                Ok(reply) => print_reply(&reply, self.json)?,
                Err(e) => {
                    tracing::error!("Turn failed: {}", e);
                    eprintln!("Error: {}", e);
                }
            }

            if !self.json {
                println!();
            }
        }

        tracing::info!(turns, "Chat session ended");
        Ok(())
    }
}

fn is_exit(line: &str) -> bool {
    matches!(line.to_lowercase().as_str(), "exit" | "quit" | "/exit" | "/quit")
}
