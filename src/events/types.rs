//! Event types carried on the broadcast bus

use serde::{Deserialize, Serialize};

/// Signal that upstream ingestion finished committing a batch of facts.
///
/// Carries no required payload; the optional fields exist for logging.
/// Must be Clone for `tokio::sync::broadcast`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactsCommitted {
    /// Source document of the batch, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    /// Number of facts in the batch (0 when the notifier does not count)
    #[serde(default)]
    pub fact_count: usize,
    /// ISO 8601 timestamp
    pub timestamp: String,
}

impl FactsCommitted {
    /// Create a new signal with the current timestamp
    pub fn new(fact_count: usize) -> Self {
        Self {
            document_id: None,
            fact_count,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Set the source document id
    pub fn with_document_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }
}
