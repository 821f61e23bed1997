#![deny(missing_docs)]

//! Core library for the DocuMind PDF summarization and question-answering server.

/// HTTP routing and REST handlers.
pub mod api;
/// Chat-completion client abstraction and the OpenAI-compatible adapter.
pub mod completion;
/// Environment-driven configuration management.
pub mod config;
/// PDF text extraction.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Service counters.
pub mod metrics;
/// Upload, summarize, and ask pipeline.
pub mod processing;
/// Session-keyed in-memory document store.
pub mod store;
