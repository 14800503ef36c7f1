//! Every rejection path produces the same user-visible reply.

use crate::{BackendAnswer, ChatService, Citation, KnowledgeBackend, DEFLECTION_MESSAGE};
use kbchat_core::AppResult;
use kbchat_gate::{Category, Classification, PromptGate};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct FixedGate(Classification);

#[async_trait::async_trait]
impl PromptGate for FixedGate {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn classify(&self, _query: &str) -> Classification {
        self.0.clone()
    }
}

#[derive(Default)]
struct CountingBackend {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl KnowledgeBackend for CountingBackend {
    fn backend_name(&self) -> &str {
        "counting"
    }

    async fn retrieve_and_generate(
        &self,
        _query: &str,
        _knowledge_base_id: &str,
    ) -> AppResult<BackendAnswer> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(BackendAnswer {
            text: "The dt1000 hauls 100 t.".to_string(),
            citations: vec![Citation {
                excerpt: "Payload 100 t".to_string(),
                uri: Some("s3://kb/dt1000.pdf".to_string()),
            }],
        })
    }
}

fn rejections() -> Vec<Classification> {
    vec![
        Classification::Category(Category::MetaArchitecture),
        Classification::Category(Category::ToxicOrAbusive),
        Classification::Category(Category::OffTopic),
        Classification::Category(Category::MetaInstructions),
        Classification::Unrecognized("I think this is Category B".to_string()),
        Classification::Failed,
    ]
}

#[tokio::test]
async fn test_all_rejections_look_identical() {
    let mut rendered = Vec::new();

    for classification in rejections() {
        let backend = Arc::new(CountingBackend::default());
        let service = ChatService::new(Arc::new(FixedGate(classification.clone())))
            .with_knowledge_base(backend.clone(), "KB-1");

        let reply = service.respond("What does the dt1000 carry?").await.unwrap();
        assert!(reply.is_deflected(), "{:?} should deflect", classification);
        assert_eq!(reply.message(), DEFLECTION_MESSAGE);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);

        rendered.push(reply.to_json().to_string());
    }

    rendered.dedup();
    assert_eq!(rendered.len(), 1);
}

#[tokio::test]
async fn test_in_domain_reaches_backend() {
    let backend = Arc::new(CountingBackend::default());
    let service = ChatService::new(Arc::new(FixedGate(Classification::Category(
        Category::InDomain,
    ))))
    .with_knowledge_base(backend.clone(), "KB-1");

    let reply = service.respond("What does the dt1000 carry?").await.unwrap();
    assert!(!reply.is_deflected());
    assert_eq!(reply.sources()[0].uri, "s3://kb/dt1000.pdf");
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}
