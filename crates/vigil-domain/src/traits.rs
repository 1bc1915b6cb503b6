//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{AttentionSnapshot, Claim, ClaimDraft, ClaimId, Observation, ObservationId};
use crate::{RelationLabel, ScoredClaim};
use async_trait::async_trait;

/// Trait for persisting observations, claims and their links
///
/// Implemented by the infrastructure layer (vigil-store). All mutations made
/// between [`ClaimStore::begin`] and [`ClaimStore::commit`] become visible
/// together or not at all.
pub trait ClaimStore {
    /// Error type for store operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Open a write transaction
    fn begin(&mut self) -> Result<(), Self::Error>;

    /// Commit the open transaction
    fn commit(&mut self) -> Result<(), Self::Error>;

    /// Discard the open transaction
    fn rollback(&mut self) -> Result<(), Self::Error>;

    /// Persist an observation
    fn insert_observation(&mut self, observation: &Observation) -> Result<(), Self::Error>;

    /// Persist a claim
    fn insert_claim(&mut self, claim: &Claim) -> Result<(), Self::Error>;

    /// Get a claim by ID
    fn get_claim(&self, id: ClaimId) -> Result<Option<Claim>, Self::Error>;

    /// Delete a claim and every link attached to it
    ///
    /// Returns `false` when no such claim existed.
    fn delete_claim(&mut self, id: ClaimId) -> Result<bool, Self::Error>;

    /// Link an observation to a claim
    ///
    /// Idempotent: returns `false` when the pair was already linked.
    fn link_observation(
        &mut self,
        observation: ObservationId,
        claim: ClaimId,
    ) -> Result<bool, Self::Error>;

    /// Set a claim's `updated_at`
    fn touch_claim(&mut self, id: ClaimId, now: u64) -> Result<(), Self::Error>;

    /// Observations linked to a claim, oldest first
    fn observations_for_claim(&self, id: ClaimId) -> Result<Vec<Observation>, Self::Error>;

    /// Number of stored claims
    fn count_claims(&self) -> Result<usize, Self::Error>;

    /// Number of observation-claim links
    fn count_links(&self) -> Result<usize, Self::Error>;

    /// Add `by` to a named counter and return the new value
    fn advance_counter(&mut self, name: &str, by: u64) -> Result<u64, Self::Error>;

    /// Reset a named counter to zero
    fn reset_counter(&mut self, name: &str) -> Result<(), Self::Error>;

    /// Most recently updated claims, newest first
    fn recent_claims(&self, limit: usize) -> Result<Vec<Claim>, Self::Error>;
}

/// Trait for the semantic inference service
///
/// Implemented by the infrastructure layer (vigil-llm). Results are untrusted:
/// callers filter labels to known ids and clamp confidences.
#[async_trait]
pub trait SemanticInference: Send + Sync {
    /// Error type for inference operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Propose claims from a block of tagged observations
    async fn draft_claims(&self, observations: &str) -> Result<Vec<ClaimDraft>, Self::Error>;

    /// Label how each claim in the pool relates to the others
    async fn classify_relations(&self, pool: &[Claim]) -> Result<Vec<RelationLabel>, Self::Error>;

    /// Rewrite a cluster of overlapping claims using their supporting observations
    async fn revise_cluster(
        &self,
        cluster: &[Claim],
        observations: &[Observation],
    ) -> Result<Vec<ClaimDraft>, Self::Error>;
}

/// Trait for relevance search over the claim corpus
///
/// Implemented by the infrastructure layer (vigil-store)
#[async_trait]
pub trait CorpusSearch: Send + Sync {
    /// Error type for search operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Up to `limit` claims ranked by relevance to `query`, best first
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ScoredClaim>, Self::Error>;
}

/// Trait for anything that can report the user's current attention
///
/// Implemented by the application layer (vigil-attention)
pub trait AttentionSource: Send + Sync {
    /// A fresh snapshot reflecting all activity recorded so far
    fn current_attention(&self) -> AttentionSnapshot;
}

/// A fixed snapshot, handy for tests and for running without a sampler
impl AttentionSource for AttentionSnapshot {
    fn current_attention(&self) -> AttentionSnapshot {
        self.clone()
    }
}
