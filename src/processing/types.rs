//! Outcome and error types for the document pipeline.

use thiserror::Error;

/// Client input problems. Reported verbatim with a client-error status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Uploaded filename does not carry a `.pdf` extension.
    #[error("Only PDF files are allowed")]
    UnsupportedFileType,
    /// Every page of the PDF yielded empty or whitespace-only text.
    #[error("Could not extract text. Is it a scanned image?")]
    NoExtractableText,
    /// A question arrived before any document was ingested.
    #[error("Please upload a PDF first")]
    NoDocument,
}

/// Errors emitted by the document pipeline.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// The request itself was unacceptable.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Extraction or the completion service failed.
    #[error("{0}")]
    Service(String),
    /// The completion service is not configured (missing API key).
    #[error("{0}")]
    Configuration(String),
}

impl ProcessingError {
    /// Whether the failure is attributable to the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result of a successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Bullet-point summary produced by the completion service.
    pub summary: String,
}

/// Result of a successfully answered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// Answer produced by the completion service.
    pub answer: String,
}
