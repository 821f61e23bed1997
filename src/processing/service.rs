//! Document service coordinating extraction, the document store, and completions.

use crate::{
    completion::{CompletionClient, CompletionError, get_completion_client},
    extraction::{PdfTextExtractor, TextExtractor, has_pdf_extension, join_pages},
    metrics::{MetricsSnapshot, ServiceMetrics},
    processing::{
        prompts::{build_answer_request, build_summary_request},
        types::{AnswerOutcome, IngestOutcome, ProcessingError, ValidationError},
    },
    store::{DocumentStore, SessionId},
};
use async_trait::async_trait;
use std::sync::Arc;

const ANSWER_FAILURE_MESSAGE: &str = "AI service error";

/// Owns the extractor, completion client, document store, and metrics behind both endpoints.
///
/// Construct the service once near process start and share it through an `Arc`.
pub struct DocumentService {
    extractor: Arc<dyn TextExtractor>,
    completion: Box<dyn CompletionClient>,
    store: DocumentStore,
    metrics: Arc<ServiceMetrics>,
}

/// Abstraction over the document pipeline used by the HTTP surface.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Extract a PDF, store its text for the session, and summarize it.
    async fn ingest(
        &self,
        session: &SessionId,
        file_bytes: Vec<u8>,
        filename: &str,
    ) -> Result<IngestOutcome, ProcessingError>;

    /// Answer a question grounded in the session's stored document.
    async fn ask(
        &self,
        session: &SessionId,
        question: &str,
    ) -> Result<AnswerOutcome, ProcessingError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl DocumentService {
    /// Build the production service from the global configuration.
    pub fn new() -> Result<Self, ProcessingError> {
        tracing::info!("Initializing completion client");
        let completion = get_completion_client().map_err(summary_error)?;
        Ok(Self::with_components(
            Arc::new(PdfTextExtractor::new()),
            completion,
        ))
    }

    /// Build a service from explicit components.
    pub fn with_components(
        extractor: Arc<dyn TextExtractor>,
        completion: Box<dyn CompletionClient>,
    ) -> Self {
        Self {
            extractor,
            completion,
            store: DocumentStore::new(),
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }

    /// Snapshot the text currently stored for the session.
    pub fn document_text(&self, session: &SessionId) -> Option<Arc<str>> {
        self.store.get(session)
    }

    /// Extract, store, and summarize an uploaded PDF.
    ///
    /// The extracted text is committed before the completion call and stays resident when the
    /// summary fails.
    pub async fn ingest(
        &self,
        session: &SessionId,
        file_bytes: Vec<u8>,
        filename: &str,
    ) -> Result<IngestOutcome, ProcessingError> {
        if !has_pdf_extension(filename) {
            return Err(ValidationError::UnsupportedFileType.into());
        }

        tracing::info!(%session, filename, bytes = file_bytes.len(), "Extracting document");
        let extractor = Arc::clone(&self.extractor);
        let pages = tokio::task::spawn_blocking(move || extractor.extract_pages(&file_bytes))
            .await
            .map_err(|error| {
                ProcessingError::Service(format!("text extraction task failed: {error}"))
            })?
            .map_err(|error| ProcessingError::Service(error.to_string()))?;

        let text = join_pages(&pages);
        if text.trim().is_empty() {
            tracing::info!(%session, pages = pages.len(), "No extractable text in document");
            return Err(ValidationError::NoExtractableText.into());
        }

        let char_count = text.chars().count();
        let request = build_summary_request(&text);
        self.store.replace(session, text);
        self.metrics.record_document(char_count as u64);
        tracing::debug!(%session, pages = pages.len(), chars = char_count, "Document stored");

        match self.completion.complete(request).await {
            Ok(summary) => {
                tracing::info!(%session, summary_chars = summary.len(), "Document summarized");
                Ok(IngestOutcome { summary })
            }
            Err(error) => {
                self.metrics.record_completion_failure();
                tracing::error!(%session, error = %error, "Summary generation failed");
                Err(summary_error(error))
            }
        }
    }

    /// Answer a question against the session's stored document.
    pub async fn ask(
        &self,
        session: &SessionId,
        question: &str,
    ) -> Result<AnswerOutcome, ProcessingError> {
        let document = self
            .store
            .get(session)
            .ok_or(ValidationError::NoDocument)?;

        let request = build_answer_request(&document, question);
        match self.completion.complete(request).await {
            Ok(answer) => {
                self.metrics.record_answer();
                tracing::info!(%session, answer_chars = answer.len(), "Question answered");
                Ok(AnswerOutcome { answer })
            }
            Err(error) => {
                self.metrics.record_completion_failure();
                tracing::error!(%session, error = %error, "Answer generation failed");
                Err(ProcessingError::Service(ANSWER_FAILURE_MESSAGE.to_string()))
            }
        }
    }

    /// Return the current metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

fn summary_error(error: CompletionError) -> ProcessingError {
    match error {
        CompletionError::MissingApiKey(_) => ProcessingError::Configuration(error.to_string()),
        other => ProcessingError::Service(other.to_string()),
    }
}

#[async_trait]
impl DocumentApi for DocumentService {
    async fn ingest(
        &self,
        session: &SessionId,
        file_bytes: Vec<u8>,
        filename: &str,
    ) -> Result<IngestOutcome, ProcessingError> {
        DocumentService::ingest(self, session, file_bytes, filename).await
    }

    async fn ask(
        &self,
        session: &SessionId,
        question: &str,
    ) -> Result<AnswerOutcome, ProcessingError> {
        DocumentService::ask(self, session, question).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        DocumentService::metrics_snapshot(self)
    }
}
