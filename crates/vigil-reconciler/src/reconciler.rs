//! Reconciliation of one observation batch against the claim corpus

use crate::config::ReconcilerConfig;
use crate::error::{inference_error, search_error, store_error, ReconcileError};
use crate::report::ReconcileReport;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use vigil_domain::traits::{ClaimStore, CorpusSearch, SemanticInference};
use vigil_domain::{
    aggregate_relations, identical_groups, now_secs, Claim, ClaimDraft, ClaimId, Observation,
    PendingObservation, RelationBuckets, RevisionGroup,
};

/// Turns observation batches into corpus updates without duplicate meanings
///
/// Each batch is drafted into candidate claims, compared against related
/// claims already in the corpus, and then applied: identical claims gain
/// links, similar clusters are merged into revised claims, and unrelated
/// drafts are kept. Every write of a batch happens in one store transaction.
pub struct Reconciler<S, I, Q> {
    store: Arc<Mutex<S>>,
    inference: Arc<I>,
    search: Arc<Q>,
    config: ReconcilerConfig,
}

impl<S, I, Q> Reconciler<S, I, Q>
where
    S: ClaimStore + Send,
    I: SemanticInference,
    Q: CorpusSearch,
{
    /// Create a reconciler after validating the configuration
    pub fn new(
        store: Arc<Mutex<S>>,
        inference: Arc<I>,
        search: Arc<Q>,
        config: ReconcilerConfig,
    ) -> Result<Self, ReconcileError> {
        config.validate()?;
        Ok(Self {
            store,
            inference,
            search,
            config,
        })
    }

    /// Shared handle to the store
    pub fn store(&self) -> &Arc<Mutex<S>> {
        &self.store
    }

    /// Active configuration
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Reconcile one batch
    ///
    /// On error nothing from the batch is persisted; re-queueing the batch is
    /// the caller's job.
    pub async fn reconcile(
        &self,
        batch: &[PendingObservation],
    ) -> Result<ReconcileReport, ReconcileError> {
        if batch.is_empty() {
            return Ok(ReconcileReport::default());
        }

        let mut store = self.store.lock().await;
        store.begin().map_err(store_error)?;

        let result = match self.apply(&mut *store, batch).await {
            Ok(report) => store.commit().map(|_| report).map_err(store_error),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            debug!("Rolling back batch: {}", e);
            if let Err(rollback) = store.rollback() {
                warn!("Rollback failed after '{}': {}", e, rollback);
            }
        }
        result
    }

    async fn apply(
        &self,
        store: &mut S,
        batch: &[PendingObservation],
    ) -> Result<ReconcileReport, ReconcileError> {
        let now = now_secs();
        let mut report = ReconcileReport::default();

        let observations: Vec<Observation> =
            batch.iter().map(|item| item.to_observation(now)).collect();
        for observation in &observations {
            store.insert_observation(observation).map_err(store_error)?;
            report.observations.push(observation.id);
        }

        let blob = batch
            .iter()
            .map(PendingObservation::tagged)
            .collect::<Vec<_>>()
            .join("\n\n");
        let drafts = self
            .bounded("draft_claims", self.inference.draft_claims(&blob))
            .await?
            .map_err(inference_error)?;
        report.drafted = drafts.len();
        debug!("Drafted {} claims from {} observations", drafts.len(), batch.len());

        if drafts.is_empty() {
            return Ok(report);
        }

        let (pool, draft_ids) = self.build_pool(store, drafts, now).await?;
        let (mut buckets, groups) = self.classify(&pool, &draft_ids).await?;
        let by_id: HashMap<ClaimId, &Claim> = pool.iter().map(|c| (c.id, c)).collect();
        let drafted: HashSet<ClaimId> = draft_ids.iter().copied().collect();

        for group in &groups {
            let (known, duplicates): (Vec<ClaimId>, Vec<ClaimId>) =
                group.iter().copied().partition(|id| !drafted.contains(id));
            let mut duplicates = duplicates.into_iter();
            if known.is_empty() {
                // drafts identical only to each other: the first one is new
                if let Some(first) = duplicates.next() {
                    buckets.unrelated.push(first);
                }
            }
            for id in duplicates {
                store.delete_claim(id).map_err(store_error)?;
                report.discarded.push(id);
            }

            for id in known {
                report.links_added += link_all(store, &observations, id)?;
                store.touch_claim(id, now).map_err(store_error)?;
                report.identical.push(id);
            }
        }

        if !buckets.similar.is_empty() {
            self.merge_similar(store, &buckets.similar, &by_id, &observations, now, &mut report)
                .await?;
        }

        for &id in &buckets.unrelated {
            let added = link_all(store, &observations, id)?;
            report.links_added += added;

            if drafted.contains(&id) {
                if let Some(claim) = by_id.get(&id) {
                    report.unrelated.push((*claim).clone());
                }
            } else {
                if added > 0 {
                    store.touch_claim(id, now).map_err(store_error)?;
                }
                report.unrelated_existing.push(id);
            }
        }

        report.consolidation_due =
            self.advance_consolidation(store, report.unrelated.len() as u64)?;
        Ok(report)
    }

    /// Persist the drafts and gather related corpus claims around them
    ///
    /// Drafts come first, then search hits, de-duplicated by id.
    async fn build_pool(
        &self,
        store: &mut S,
        drafts: Vec<ClaimDraft>,
        now: u64,
    ) -> Result<(Vec<Claim>, Vec<ClaimId>), ReconcileError> {
        let mut pool = Vec::with_capacity(drafts.len());
        let mut draft_ids = Vec::with_capacity(drafts.len());
        let mut seen = HashSet::new();
        let mut queries = Vec::with_capacity(drafts.len());

        for draft in drafts {
            queries.push(draft.search_text());
            let claim = Claim::from_draft(draft, RevisionGroup::new(), now);
            store.insert_claim(&claim).map_err(store_error)?;
            seen.insert(claim.id);
            draft_ids.push(claim.id);
            pool.push(claim);
        }

        for query in &queries {
            let hits = self
                .bounded(
                    "search",
                    self.search.search(query, self.config.candidate_limit),
                )
                .await?
                .map_err(search_error)?;
            for hit in hits {
                if seen.insert(hit.claim.id) {
                    pool.push(hit.claim);
                }
            }
        }

        debug!(
            "Candidate pool: {} drafts, {} existing claims",
            draft_ids.len(),
            pool.len() - draft_ids.len()
        );
        Ok((pool, draft_ids))
    }

    /// Bucket the pool by verdict and split IDENTICAL into meaning groups
    async fn classify(
        &self,
        pool: &[Claim],
        draft_ids: &[ClaimId],
    ) -> Result<(RelationBuckets, Vec<Vec<ClaimId>>), ReconcileError> {
        let labels = self
            .bounded("classify_relations", self.inference.classify_relations(pool))
            .await?
            .map_err(inference_error)?;

        let pool_ids: Vec<ClaimId> = pool.iter().map(|c| c.id).collect();
        let mut buckets = aggregate_relations(&labels, &pool_ids);
        buckets.adopt_unlabeled(draft_ids.iter().copied());
        let groups = identical_groups(&labels, &pool_ids);

        debug!(
            "Relations: {} identical, {} similar, {} unrelated",
            buckets.identical.len(),
            buckets.similar.len(),
            buckets.unrelated.len()
        );
        Ok((buckets, groups))
    }

    /// Replace a cluster of similar claims with revised ones
    ///
    /// The revised claims share one new revision group and are linked to every
    /// observation that supported any cluster member, plus the batch.
    async fn merge_similar(
        &self,
        store: &mut S,
        similar: &[ClaimId],
        by_id: &HashMap<ClaimId, &Claim>,
        batch_observations: &[Observation],
        now: u64,
        report: &mut ReconcileReport,
    ) -> Result<(), ReconcileError> {
        let cluster: Vec<Claim> = similar
            .iter()
            .filter_map(|id| by_id.get(id).map(|c| (*c).clone()))
            .collect();

        let mut seen = HashSet::new();
        let mut support: Vec<Observation> = Vec::new();
        for observation in batch_observations {
            if seen.insert(observation.id) {
                support.push(observation.clone());
            }
        }
        for claim in &cluster {
            for observation in store.observations_for_claim(claim.id).map_err(store_error)? {
                if seen.insert(observation.id) {
                    support.push(observation);
                }
            }
        }

        let shown = &support[..support.len().min(self.config.revision_observation_cap)];
        let drafts = self
            .bounded("revise_cluster", self.inference.revise_cluster(&cluster, shown))
            .await?
            .map_err(inference_error)?;
        if drafts.is_empty() {
            return Err(ReconcileError::EmptyRevision(cluster.len()));
        }

        for claim in &cluster {
            store.delete_claim(claim.id).map_err(store_error)?;
            report.merged.push(claim.id);
        }

        let group = RevisionGroup::new();
        let superseded: HashSet<RevisionGroup> =
            cluster.iter().map(|c| c.revision_group).collect();
        debug!(
            "Revision group {} supersedes {} group(s): {:?}",
            group,
            superseded.len(),
            superseded
        );

        for draft in drafts {
            let claim = Claim::from_draft(draft, group, now);
            store.insert_claim(&claim).map_err(store_error)?;
            report.links_added += link_all(store, &support, claim.id)?;
            report.revised.push(claim);
        }

        info!(
            "Merged {} similar claims into {} (group {})",
            cluster.len(),
            report.revised.len(),
            group
        );
        Ok(())
    }

    /// Count new claims toward consolidation; true when the trigger fired
    fn advance_consolidation(&self, store: &mut S, new_claims: u64) -> Result<bool, ReconcileError> {
        let trigger = self.config.consolidation_trigger;
        if trigger == 0 || new_claims == 0 {
            return Ok(false);
        }

        let name = &self.config.consolidation_counter;
        let count = store.advance_counter(name, new_claims).map_err(store_error)?;
        debug!("Consolidation counter '{}' at {} (+{})", name, count, new_claims);

        if count >= trigger {
            store.reset_counter(name).map_err(store_error)?;
            info!("Consolidation counter reached {}, resetting", count);
            return Ok(true);
        }
        Ok(false)
    }

    async fn bounded<T, E, F>(
        &self,
        operation: &'static str,
        call: F,
    ) -> Result<Result<T, E>, ReconcileError>
    where
        F: Future<Output = Result<T, E>>,
    {
        timeout(self.config.call_timeout(), call)
            .await
            .map_err(|_| ReconcileError::Timeout {
                operation,
                secs: self.config.call_timeout_secs,
            })
    }
}

/// Link every observation to a claim; returns how many links were new
fn link_all<S: ClaimStore>(
    store: &mut S,
    observations: &[Observation],
    claim: ClaimId,
) -> Result<usize, ReconcileError> {
    let mut added = 0;
    for observation in observations {
        if store
            .link_observation(observation.id, claim)
            .map_err(store_error)?
        {
            added += 1;
        }
    }
    Ok(added)
}
