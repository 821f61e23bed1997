//! Document pipeline: PDF ingestion, summarization, and grounded question answering.

pub mod prompts;
mod service;
pub mod types;

pub use service::{DocumentApi, DocumentService};
pub use types::{AnswerOutcome, IngestOutcome, ProcessingError, ValidationError};
