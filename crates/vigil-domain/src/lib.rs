//! Vigil Domain Layer
//!
//! Core value types and collaborator interfaces for Vigil, a user model that
//! turns a stream of raw observations into a corpus of confidence-scored
//! natural-language claims.
//!
//! ## Key Concepts
//!
//! - **Observation**: an immutable, timestamped record from an external collector
//! - **Claim**: a statement about the user with a 1–10 confidence, linked to the
//!   observations that support it
//! - **Revision group**: lineage identifier shared by claims produced together
//! - **Relation labels**: IDENTICAL / SIMILAR / UNRELATED verdicts used to
//!   reconcile new drafts against the corpus
//! - **Attention snapshot**: a point-in-time estimate of how focused the user is
//!
//! ## Architecture
//!
//! This crate holds no infrastructure. Storage, inference, search and attention
//! sensing are described as traits in [`traits`] and implemented elsewhere in
//! the workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod ids;

pub mod attention;
pub mod claim;
pub mod confidence;
pub mod observation;
pub mod relation;
pub mod traits;

// Re-exports for convenience
pub use attention::AttentionSnapshot;
pub use claim::{Claim, ClaimDraft, ClaimId, RevisionGroup, ScoredClaim};
pub use confidence::Confidence;
pub use observation::{Observation, ObservationId, PendingObservation};
pub use relation::{
    aggregate_relations, identical_groups, RelationBuckets, RelationKind, RelationLabel,
};

/// Current time as Unix seconds.
///
/// A clock set before the epoch reads as 0 rather than failing.
pub fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
