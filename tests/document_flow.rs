use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use documind::{
    completion::{CompletionClient, CompletionError, CompletionRequest},
    extraction::{ExtractionError, TextExtractor},
    processing::{DocumentService, ProcessingError, ValidationError},
    store::SessionId,
};

/// Treats the upload bytes as UTF-8 with pages separated by form feeds.
struct FormFeedPages;

impl TextExtractor for FormFeedPages {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|error| ExtractionError::Malformed(error.to_string()))?;
        Ok(text.split('\u{c}').map(str::to_string).collect())
    }
}

/// Echoes the system instruction back so tests can see the grounding context.
#[derive(Clone, Default)]
struct EchoCompletion {
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl EchoCompletion {
    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl CompletionClient for EchoCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        Ok(request.system)
    }
}

fn service(completion: &EchoCompletion) -> DocumentService {
    DocumentService::with_components(Arc::new(FormFeedPages), Box::new(completion.clone()))
}

#[tokio::test]
async fn two_page_upload_then_question() {
    let completion = EchoCompletion::default();
    let service = service(&completion);
    let session = SessionId::shared();

    service
        .ingest(&session, b"Hello world.\x0cSecond page.".to_vec(), "two.pdf")
        .await
        .expect("ingest");
    assert_eq!(
        service.document_text(&session).as_deref(),
        Some("Hello world.\nSecond page.\n")
    );

    let outcome = service
        .ask(&session, "What is on page 2?")
        .await
        .expect("answer");

    assert!(outcome.answer.contains("Hello world.\nSecond page.\n"));
    let requests = completion.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].user, "Hello world.\nSecond page.\n");
    assert_eq!(requests[1].user, "What is on page 2?");
}

#[tokio::test]
async fn ask_requires_a_prior_successful_ingest() {
    let completion = EchoCompletion::default();
    let service = service(&completion);
    let session = SessionId::shared();

    let before = service.ask(&session, "hi").await.expect_err("no document");
    assert!(matches!(
        before,
        ProcessingError::Validation(ValidationError::NoDocument)
    ));

    let rejected = service
        .ingest(&session, b"text".to_vec(), "notes.md")
        .await
        .expect_err("not a pdf");
    assert!(rejected.is_client_error());
    assert!(service.ask(&session, "hi").await.is_err());

    service
        .ingest(&session, b"Real content".to_vec(), "real.pdf")
        .await
        .expect("ingest");
    assert!(service.ask(&session, "hi").await.is_ok());
}

#[tokio::test]
async fn prompts_are_truncated_regardless_of_document_size() {
    let completion = EchoCompletion::default();
    let service = service(&completion);
    let session = SessionId::shared();
    let long_page = "ß".repeat(40_000);

    service
        .ingest(&session, long_page.clone().into_bytes(), "long.pdf")
        .await
        .expect("ingest");
    service.ask(&session, "Summarize?").await.expect("answer");

    let requests = completion.requests();
    assert_eq!(requests[0].user.chars().count(), 12_000);
    let context = requests[1]
        .system
        .strip_prefix("Answer based ONLY on this text:\n\n")
        .expect("instruction prefix");
    assert_eq!(context.chars().count(), 15_000);
    assert_eq!(
        service.document_text(&session).map(|text| text.chars().count()),
        Some(40_001)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ask_sees_one_whole_document() {
    let doc_a = format!("{}\n", "A".repeat(5_000));
    let doc_b = format!("{}\n", "B".repeat(5_000));

    for _ in 0..25 {
        let completion = EchoCompletion::default();
        let service = Arc::new(service(&completion));
        let session = SessionId::shared();
        service
            .ingest(&session, doc_a.trim_end().as_bytes().to_vec(), "a.pdf")
            .await
            .expect("ingest A");

        let asker = {
            let service = Arc::clone(&service);
            let session = session.clone();
            tokio::spawn(async move { service.ask(&session, "Which letter?").await })
        };
        let ingester = {
            let service = Arc::clone(&service);
            let session = session.clone();
            let bytes = doc_b.trim_end().as_bytes().to_vec();
            tokio::spawn(async move { service.ingest(&session, bytes, "b.pdf").await })
        };

        let answer = asker.await.expect("ask task").expect("ask result").answer;
        ingester.await.expect("ingest task").expect("ingest B");

        let grounded_in_a = answer.ends_with(&doc_a);
        let grounded_in_b = answer.ends_with(&doc_b);
        assert!(grounded_in_a ^ grounded_in_b, "answer mixed documents");
        assert_eq!(service.document_text(&session).as_deref(), Some(doc_b.as_str()));
    }
}
