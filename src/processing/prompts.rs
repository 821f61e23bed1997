//! Prompt assembly for summaries and answers.

use crate::completion::CompletionRequest;

/// Maximum characters of document text sent for summarization.
pub const SUMMARY_CHAR_LIMIT: usize = 12_000;
/// Maximum characters of document text embedded as answer context.
pub const ANSWER_CONTEXT_CHAR_LIMIT: usize = 15_000;
/// Sampling temperature for summaries.
pub const SUMMARY_TEMPERATURE: f32 = 0.3;
/// Sampling temperature for answers.
pub const ANSWER_TEMPERATURE: f32 = 0.2;

const SUMMARY_INSTRUCTION: &str = "Summarize the document in 3-5 clear bullet points.";
const ANSWER_INSTRUCTION: &str = "Answer based ONLY on this text:";

/// Borrow at most `limit` characters from the start of `text`.
///
/// Counts Unicode scalar values, so the cut never splits a code point.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Build the summarization request for a freshly ingested document.
pub fn build_summary_request(document: &str) -> CompletionRequest {
    CompletionRequest {
        system: SUMMARY_INSTRUCTION.to_string(),
        user: truncate_chars(document, SUMMARY_CHAR_LIMIT).to_string(),
        temperature: SUMMARY_TEMPERATURE,
    }
}

/// Build the grounded question-answering request.
pub fn build_answer_request(document: &str, question: &str) -> CompletionRequest {
    let context = truncate_chars(document, ANSWER_CONTEXT_CHAR_LIMIT);
    CompletionRequest {
        system: format!("{ANSWER_INSTRUCTION}\n\n{context}"),
        user: question.to_string(),
        temperature: ANSWER_TEMPERATURE,
    }
}
