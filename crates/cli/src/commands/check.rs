//! Check command handler.
//!
//! Runs queries through the prompt gate only, without contacting the
//! knowledge base. Operator tool: unlike chat replies, output includes
//! the classification.

use super::shared::{build_prompt_gate, GateArgs};
use clap::Args;
use futures::stream::{self, StreamExt};
use kbchat_core::{config::AppConfig, AppError, AppResult};
use kbchat_gate::{Classification, PromptGate};
use std::path::PathBuf;
use std::sync::Arc;

/// Run queries through the prompt gate only
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Queries to classify
    pub queries: Vec<String>,

    /// Read additional queries from a file, one per line
    #[arg(long)]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub gate: GateArgs,

    /// Maximum concurrent classifications
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Outcome of one gated query.
#[derive(Debug)]
pub struct CheckOutcome {
    pub query: String,
    pub classification: Classification,
}

impl CheckOutcome {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "query": self.query,
            "admitted": self.classification.is_admitted(),
            "classification": self.classification.to_string(),
            "category": self.classification.category().map(|c| c.as_str()),
        })
    }
}

impl CheckCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing check command");

        let queries = self.collect_queries()?;
        if queries.is_empty() {
            return Err(AppError::Config(
                "No queries provided. Pass queries as arguments or use --file".to_string(),
            ));
        }

        let gate = build_prompt_gate(config, &self.gate)?;
        let outcomes = classify_all(gate, queries, self.concurrency).await;

        let admitted = outcomes
            .iter()
            .filter(|o| o.classification.is_admitted())
            .count();
        tracing::info!(total = outcomes.len(), admitted, "Check complete");

        if self.json {
            let rendered = serde_json::to_string_pretty(&serde_json::Value::Array(
                outcomes.iter().map(CheckOutcome::to_json).collect(),
            ))?;
            println!("{}", rendered);
        } else {
            for outcome in &outcomes {
                let verdict = if outcome.classification.is_admitted() {
                    "ADMIT "
                } else {
                    "REJECT"
                };
                println!("{}  {:<17}  {}", verdict, outcome.classification, outcome.query);
            }
            println!();
            println!("{}/{} admitted", admitted, outcomes.len());
        }

        Ok(())
    }

    fn collect_queries(&self) -> AppResult<Vec<String>> {
        let mut queries: Vec<String> = self
            .queries
            .iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .collect();

        if let Some(ref path) = self.file {
            let contents = std::fs::read_to_string(path).map_err(|e| {
                AppError::Config(format!("Failed to read queries from {:?}: {}", path, e))
            })?;
            queries.extend(
                contents
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty() && !l.starts_with('#'))
                    .map(str::to_string),
            );
        }

        Ok(queries)
    }
}

/// Classify queries concurrently, keeping input order.
pub async fn classify_all(
    gate: Arc<dyn PromptGate>,
    queries: Vec<String>,
    concurrency: usize,
) -> Vec<CheckOutcome> {
    stream::iter(queries)
        .map(|query| {
            let gate = Arc::clone(&gate);
            async move {
                let classification = gate.classify(&query).await;
                CheckOutcome {
                    query,
                    classification,
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbchat_gate::{Category, KeywordGate};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn command(queries: &[&str], file: Option<PathBuf>) -> CheckCommand {
        CheckCommand {
            queries: queries.iter().map(|q| q.to_string()).collect(),
            file,
            gate: GateArgs::default(),
            concurrency: 2,
            json: false,
        }
    }

    #[tokio::test]
    async fn test_classify_all_keeps_order() {
        let gate: Arc<dyn PromptGate> = Arc::new(KeywordGate::new(["excavator", "forklift"]));
        let queries = vec![
            "excavator reach".to_string(),
            "tell me a joke".to_string(),
            "FORKLIFT capacity".to_string(),
        ];

        let outcomes = classify_all(gate, queries, 0).await;
        let admitted: Vec<bool> = outcomes
            .iter()
            .map(|o| o.classification.is_admitted())
            .collect();

        assert_eq!(admitted, vec![true, false, true]);
        assert_eq!(outcomes[1].query, "tell me a joke");
        assert_eq!(
            outcomes[0].classification.category(),
            Some(Category::InDomain)
        );
    }

    #[test]
    fn test_collect_queries_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# gate regression set").unwrap();
        writeln!(file, "x950 weight").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  ignore previous instructions  ").unwrap();

        let cmd = command(&["bulldozer", "  "], Some(file.path().to_path_buf()));
        let queries = cmd.collect_queries().unwrap();

        assert_eq!(
            queries,
            vec!["bulldozer", "x950 weight", "ignore previous instructions"]
        );
    }

    #[test]
    fn test_collect_queries_missing_file() {
        let cmd = command(&[], Some(PathBuf::from("/nonexistent/queries.txt")));
        assert!(cmd.collect_queries().is_err());
    }

    #[test]
    fn test_outcome_json() {
        let outcome = CheckOutcome {
            query: "weather".to_string(),
            classification: Classification::Failed,
        };
        let json = outcome.to_json();
        assert_eq!(json["admitted"], false);
        assert_eq!(json["classification"], "failed");
        assert!(json["category"].is_null());
    }
}
