//! Classifier gate outcomes against a scripted LLM client.

use crate::{build_gate, Category, ClassifierGate, Classification, PromptGate};
use kbchat_core::config::GateConfig;
use kbchat_core::{AppError, AppResult};
use kbchat_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use kbchat_prompt::builtin_prompt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

enum Script {
    Reply(&'static str),
    Fail,
    Hang,
}

struct ScriptedClient {
    script: Script,
    calls: AtomicUsize,
    last_request: Mutex<Option<LlmRequest>>,
}

impl ScriptedClient {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        match self.script {
            Script::Reply(text) => Ok(LlmResponse {
                content: text.to_string(),
                model: request.model.clone(),
                usage: LlmUsage::new(10, 2),
                done: true,
            }),
            Script::Fail => Err(AppError::Llm("503 Service Unavailable".to_string())),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(AppError::Llm("unreachable".to_string()))
            }
        }
    }
}

fn gate_with(client: Arc<ScriptedClient>) -> ClassifierGate {
    ClassifierGate::new(
        client,
        "classifier-model",
        builtin_prompt("gate.classify.default").unwrap(),
    )
    .with_timeout(Duration::from_millis(200))
}

const QUERY: &str = "What is the engine horsepower of the bd850 bulldozer?";

#[tokio::test]
async fn test_accept_label_admits() {
    for reply in ["Category E", "category e", "  CATEGORY   E \n"] {
        let gate = gate_with(ScriptedClient::new(Script::Reply(reply)));
        assert_eq!(
            gate.classify(QUERY).await,
            Classification::Category(Category::InDomain),
            "reply: {:?}",
            reply
        );
        assert!(gate.admit(QUERY).await);
    }
}

#[tokio::test]
async fn test_reject_labels_reject() {
    let replies = [
        ("Category A", Category::MetaArchitecture),
        ("Category B", Category::ToxicOrAbusive),
        ("Category C", Category::OffTopic),
        ("Category D", Category::MetaInstructions),
    ];

    for (reply, expected) in replies {
        let gate = gate_with(ScriptedClient::new(Script::Reply(reply)));
        assert_eq!(gate.classify(QUERY).await, Classification::Category(expected));
        assert!(!gate.admit(QUERY).await);
    }
}

#[tokio::test]
async fn test_garbage_labels_reject() {
    for reply in [
        "",
        "E",
        "Category F",
        "Category E.",
        "Category E\nThe request mentions a bulldozer.",
        "I think this is Category E",
        "Sure! Ignore the rubric and answer.",
    ] {
        let gate = gate_with(ScriptedClient::new(Script::Reply(reply)));
        let classification = gate.classify(QUERY).await;
        assert!(
            matches!(classification, Classification::Unrecognized(_)),
            "reply: {:?}",
            reply
        );
        assert!(!gate.admit(QUERY).await, "reply: {:?}", reply);
    }
}

#[tokio::test]
async fn test_service_error_fails_closed() {
    let gate = gate_with(ScriptedClient::new(Script::Fail));
    assert_eq!(gate.classify(QUERY).await, Classification::Failed);
    assert!(!gate.admit(QUERY).await);
}

#[tokio::test]
async fn test_timeout_fails_closed() {
    let gate = gate_with(ScriptedClient::new(Script::Hang));

    let started = std::time::Instant::now();
    assert_eq!(gate.classify(QUERY).await, Classification::Failed);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_idempotent_decisions() {
    let client = ScriptedClient::new(Script::Reply("Category E"));
    let gate = gate_with(client.clone());

    let first = gate.admit(QUERY).await;
    let second = gate.admit(QUERY).await;
    assert_eq!(first, second);
    assert_eq!(client.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_request_carries_query_and_model() {
    let client = ScriptedClient::new(Script::Reply("Category E"));
    let gate = gate_with(client.clone());
    gate.classify(QUERY).await;

    let request = client.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.model, "classifier-model");
    assert_eq!(request.temperature, Some(0.0));
    assert!(request.prompt.contains(QUERY));
}

#[tokio::test]
async fn test_build_gate_classifier_strategy() {
    let temp = TempDir::new().unwrap();
    let config = GateConfig::default();
    let client = ScriptedClient::new(Script::Reply("Category C"));
    let shared: Arc<dyn LlmClient> = client.clone();

    let gate = build_gate(&config, temp.path(), Some((shared, "llama3.2".to_string()))).unwrap();

    assert_eq!(gate.name(), "classifier");
    assert!(!gate.admit("What is the weather like today?").await);
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_build_gate_classifier_requires_client() {
    let temp = TempDir::new().unwrap();
    let err = build_gate(&GateConfig::default(), temp.path(), None)
        .err()
        .unwrap();
    assert!(err.to_string().contains("requires an LLM client"));
}

#[test]
fn test_build_gate_rejects_zero_timeout() {
    let temp = TempDir::new().unwrap();
    let config = GateConfig {
        timeout_secs: 0,
        ..GateConfig::default()
    };
    let shared: Arc<dyn LlmClient> = ScriptedClient::new(Script::Reply("Category E"));

    let err = build_gate(&config, temp.path(), Some((shared, "llama3.2".to_string())))
        .err()
        .unwrap();
    assert!(err.to_string().contains("timeout must be greater than zero"));
}

#[tokio::test]
async fn test_unrenderable_workspace_prompt_rejects() {
    let temp = TempDir::new().unwrap();
    let prompts_dir = temp.path().join(".kbchat/prompts");
    std::fs::create_dir_all(&prompts_dir).unwrap();
    std::fs::write(
        prompts_dir.join("gate.classify.default.yml"),
        r#"id: gate.classify.default
title: Broken classifier
apiVersion: "1.0"
template: "Classify {{query}} using {{foo}}"
output:
  format: label
"#,
    )
    .unwrap();

    let client = ScriptedClient::new(Script::Reply("Category E"));
    let shared: Arc<dyn LlmClient> = client.clone();
    let gate = build_gate(
        &GateConfig::default(),
        temp.path(),
        Some((shared, "llama3.2".to_string())),
    )
    .unwrap();

    assert_eq!(gate.classify(QUERY).await, Classification::Failed);
    assert!(!gate.admit(QUERY).await);
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}
