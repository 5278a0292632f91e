//! Result types for bulk operations.

/// A single document that the search engine did not accept.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkFailure {
    /// Key of the rejected document.
    pub document_id: String,
    /// HTTP status reported for the item, when known.
    pub status: Option<u16>,
    /// Human-readable failure reason.
    pub reason: String,
}

impl std::fmt::Display for BulkFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {}): {}", self.document_id, status, self.reason),
            None => write!(f, "{}: {}", self.document_id, self.reason),
        }
    }
}

/// Summary of a bulk upsert: how many documents were accepted and which were not.
///
/// Partial failure is a normal outcome; callers decide what to do with
/// `failures`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkUpsertSummary {
    /// Number of documents submitted.
    pub total: usize,
    /// Number of documents the engine accepted.
    pub succeeded: usize,
    /// One entry per rejected document.
    pub failures: Vec<BulkFailure>,
}

impl BulkUpsertSummary {
    /// Number of rejected documents.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: BulkUpsertSummary) {
        self.total += other.total;
        self.succeeded += other.succeeded;
        self.failures.extend(other.failures);
    }
}
