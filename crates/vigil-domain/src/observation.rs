//! Observations - raw activity records from external collectors

use crate::ids::uuid_v7_id;

uuid_v7_id!(
    /// Unique identifier for a persisted observation
    ObservationId
);

/// A persisted observation
///
/// Immutable once created; only the rows linking it to claims change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Unique identifier
    pub id: ObservationId,

    /// Name of the collector that produced it (e.g. "screen", "keyboard")
    pub source: String,

    /// Raw content
    pub content: String,

    /// Content type (e.g. "input_text")
    pub content_type: String,

    /// Creation time (Unix seconds)
    pub created_at: u64,
}

impl Observation {
    /// Create a new observation with a fresh identifier
    pub fn new(
        source: impl Into<String>,
        content: impl Into<String>,
        content_type: impl Into<String>,
        created_at: u64,
    ) -> Self {
        Self {
            id: ObservationId::new(),
            source: source.into(),
            content: content.into(),
            content_type: content_type.into(),
            created_at,
        }
    }
}

/// An observation waiting in the batcher, not yet persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingObservation {
    /// Batcher-local identifier (not the persisted id)
    pub local_id: u64,

    /// Collector name
    pub source: String,

    /// Raw content
    pub content: String,

    /// Content type
    pub content_type: String,

    /// When it entered the buffer (Unix seconds)
    pub pushed_at: u64,
}

impl PendingObservation {
    /// Tagged form used when a batch is concatenated for drafting
    pub fn tagged(&self) -> String {
        format!("[{}] {}", self.source, self.content)
    }

    /// Persistable observation built from this item
    pub fn to_observation(&self, created_at: u64) -> Observation {
        Observation::new(&self.source, &self.content, &self.content_type, created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> PendingObservation {
        PendingObservation {
            local_id: 7,
            source: "screen".to_string(),
            content: "Editing main.rs".to_string(),
            content_type: "input_text".to_string(),
            pushed_at: 10,
        }
    }

    #[test]
    fn test_tagged() {
        assert_eq!(pending().tagged(), "[screen] Editing main.rs");
    }

    #[test]
    fn test_to_observation_copies_payload() {
        let obs = pending().to_observation(99);
        assert_eq!(obs.source, "screen");
        assert_eq!(obs.content, "Editing main.rs");
        assert_eq!(obs.content_type, "input_text");
        assert_eq!(obs.created_at, 99);
    }

    #[test]
    fn test_each_observation_gets_a_fresh_id() {
        let a = pending().to_observation(1);
        let b = pending().to_observation(1);
        assert_ne!(a.id, b.id);
    }
}
