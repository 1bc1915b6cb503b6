//! Claim module - the fundamental unit of Vigil's user model

use crate::confidence::Confidence;
use crate::ids::uuid_v7_id;

uuid_v7_id!(
    /// Unique identifier for a claim
    ///
    /// # Examples
    ///
    /// ```
    /// use vigil_domain::ClaimId;
    ///
    /// let id = ClaimId::new();
    /// let parsed = ClaimId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    ClaimId
);

uuid_v7_id!(
    /// Lineage identifier shared by the claims of one revision
    ///
    /// Every freshly drafted claim starts its own group; a similar-cluster merge
    /// gives all of its revised claims one new group.
    RevisionGroup
);

/// A claim about the user, as persisted in the corpus
///
/// Claims are never edited in place. A merge deletes the old claims and creates
/// new ones; the only in-place mutation is the `updated_at` touch performed
/// when new supporting observations are linked.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    /// Unique identifier
    pub id: ClaimId,

    /// Natural-language statement about the user
    pub text: String,

    /// Why the inference service believes the statement
    pub reasoning: String,

    /// Confidence on the 1–10 scale, as reported (not clamped)
    pub confidence: Option<i32>,

    /// How quickly the claim is expected to go stale, as reported
    pub decay: Option<i32>,

    /// Lineage identifier
    pub revision_group: RevisionGroup,

    /// Version within the lineage (starts at 1)
    pub version: u32,

    /// Creation time (Unix seconds)
    pub created_at: u64,

    /// Last time a supporting observation was attached (Unix seconds)
    pub updated_at: u64,
}

impl Claim {
    /// Materialize a draft as a version-1 claim in the given lineage
    pub fn from_draft(draft: ClaimDraft, revision_group: RevisionGroup, now: u64) -> Self {
        Self {
            id: ClaimId::new(),
            text: draft.text,
            reasoning: draft.reasoning,
            confidence: draft.confidence,
            decay: draft.decay,
            revision_group,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Confidence clamped to the valid scale, defaulting when absent
    pub fn effective_confidence(&self) -> Confidence {
        Confidence::from_reported(self.confidence)
    }
}

/// A claim proposed by the inference service, not yet persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimDraft {
    /// Proposed statement
    pub text: String,

    /// Supporting rationale
    pub reasoning: String,

    /// Reported confidence (1–10)
    pub confidence: Option<i32>,

    /// Reported decay
    pub decay: Option<i32>,
}

impl ClaimDraft {
    /// Create a draft with no confidence or decay
    pub fn new(text: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reasoning: reasoning.into(),
            confidence: None,
            decay: None,
        }
    }

    /// Set the reported confidence
    pub fn with_confidence(mut self, confidence: i32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Set the reported decay
    pub fn with_decay(mut self, decay: i32) -> Self {
        self.decay = Some(decay);
        self
    }

    /// Text used to look up related claims in the corpus
    pub fn search_text(&self) -> String {
        format!("{}\n{}", self.text, self.reasoning)
    }
}

/// A corpus search hit
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredClaim {
    /// Matching claim
    pub claim: Claim,

    /// Relevance score (higher is better)
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_id_ordering() {
        let id1 = ClaimId::from_value(1000);
        let id2 = ClaimId::from_value(2000);

        assert!(id1 < id2);
        assert!(id2 > id1);
    }

    #[test]
    fn test_claim_id_chronological() {
        let id1 = ClaimId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = ClaimId::new();

        assert!(id1 < id2, "Earlier UUIDv7 should be less than later UUIDv7");
    }

    #[test]
    fn test_claim_id_display_and_parse() {
        let id = ClaimId::new();
        let id_str = id.to_string();

        // 8-4-4-4-12 with hyphens
        assert_eq!(id_str.len(), 36);
        assert_eq!(ClaimId::from_string(&id_str).unwrap(), id);
        assert_eq!(id_str.parse::<ClaimId>().unwrap(), id);
    }

    #[test]
    fn test_claim_id_invalid_string() {
        assert!(ClaimId::from_string("not-a-valid-uuid").is_err());
        assert!(ClaimId::from_string("").is_err());
    }

    #[test]
    fn test_claim_id_bytes() {
        let id = ClaimId::new();
        assert_eq!(ClaimId::from_bytes(&id.to_bytes()).unwrap(), id);
        assert!(ClaimId::from_bytes(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_from_draft_starts_at_version_one() {
        let group = RevisionGroup::new();
        let draft = ClaimDraft::new("Prefers dark mode", "Toggled theme twice")
            .with_confidence(7)
            .with_decay(3);
        let claim = Claim::from_draft(draft, group, 1_700_000_000);

        assert_eq!(claim.version, 1);
        assert_eq!(claim.revision_group, group);
        assert_eq!(claim.confidence, Some(7));
        assert_eq!(claim.decay, Some(3));
        assert_eq!(claim.created_at, claim.updated_at);
    }

    #[test]
    fn test_search_text_joins_text_and_reasoning() {
        let draft = ClaimDraft::new("Writes Rust", "Opens .rs files daily");
        assert_eq!(draft.search_text(), "Writes Rust\nOpens .rs files daily");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: ordering matches u128 ordering
        #[test]
        fn test_id_ordering_property(a: u128, b: u128) {
            let id_a = ClaimId::from_value(a);
            let id_b = ClaimId::from_value(b);

            prop_assert_eq!(id_a < id_b, a < b);
            prop_assert_eq!(id_a == id_b, a == b);
        }

        /// Property: string form round-trips
        #[test]
        fn test_id_string_roundtrip(value: u128) {
            let id = RevisionGroup::from_value(value);
            match RevisionGroup::from_string(&id.to_string()) {
                Ok(parsed) => prop_assert_eq!(id, parsed),
                Err(e) => return Err(TestCaseError::fail(e)),
            }
        }
    }
}
