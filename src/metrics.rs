use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing ingestion and question activity.
#[derive(Default)]
pub struct ServiceMetrics {
    documents_ingested: AtomicU64,
    questions_answered: AtomicU64,
    completion_failures: AtomicU64,
    last_document_chars: AtomicU64,
}

impl ServiceMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document whose text was committed to the store.
    pub fn record_document(&self, char_count: u64) {
        self.documents_ingested.fetch_add(1, Ordering::Relaxed);
        self.last_document_chars
            .store(char_count, Ordering::Relaxed);
    }

    /// Record a successfully answered question.
    pub fn record_answer(&self) {
        self.questions_answered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed completion call.
    pub fn record_completion_failure(&self) {
        self.completion_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let last = self.last_document_chars.load(Ordering::Relaxed);
        MetricsSnapshot {
            documents_ingested: self.documents_ingested.load(Ordering::Relaxed),
            questions_answered: self.questions_answered.load(Ordering::Relaxed),
            completion_failures: self.completion_failures.load(Ordering::Relaxed),
            last_document_chars: (last > 0).then_some(last),
        }
    }
}

/// Immutable view of service counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of documents committed to the store since startup.
    pub documents_ingested: u64,
    /// Number of questions answered since startup.
    pub questions_answered: u64,
    /// Number of completion calls that failed.
    pub completion_failures: u64,
    /// Character length of the last committed document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_document_chars: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_documents_and_answers() {
        let metrics = ServiceMetrics::new();
        metrics.record_document(120);
        metrics.record_document(40);
        metrics.record_answer();
        metrics.record_completion_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_ingested, 2);
        assert_eq!(snapshot.questions_answered, 1);
        assert_eq!(snapshot.completion_failures, 1);
        assert_eq!(snapshot.last_document_chars, Some(40));
    }

    #[test]
    fn fresh_snapshot_is_empty() {
        let snapshot = ServiceMetrics::new().snapshot();
        assert_eq!(snapshot.documents_ingested, 0);
        assert_eq!(snapshot.questions_answered, 0);
        assert_eq!(snapshot.last_document_chars, None);
    }
}
