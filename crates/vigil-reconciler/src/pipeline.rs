//! Batch loop tying the batcher, reconciler and decision engine together

use crate::batcher::ObservationBatcher;
use crate::error::ReconcileError;
use crate::reconciler::Reconciler;
use crate::report::ReconcileReport;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, error, info, warn};
use vigil_decision::{DecisionAction, DecisionEngine, DecisionOutcome};
use vigil_domain::traits::{AttentionSource, ClaimStore, CorpusSearch, SemanticInference};
use vigil_domain::{now_secs, Claim};

/// A decision about a new or revised claim, for the downstream actuator
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionEvent {
    /// The claim that was evaluated
    pub claim: Claim,

    /// What the engine decided
    pub outcome: DecisionOutcome,
}

/// Asks the long-term memory service to consolidate the corpus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidationRequest {
    /// Counter that reached its trigger
    pub counter: String,

    /// When the trigger fired (Unix seconds)
    pub requested_at: u64,
}

/// Pipeline counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Batches committed
    pub batches_committed: u64,

    /// Batches rolled back and re-queued
    pub batches_failed: u64,

    /// Decision events emitted
    pub decisions: u64,
}

/// Runs reconciliation cycles one at a time and dispatches decisions
///
/// Decisions are made only after a batch commits, so a rolled-back claim is
/// never surfaced. Attention is read fresh for each evaluated claim.
pub struct Pipeline<S, I, Q> {
    batcher: Arc<ObservationBatcher>,
    reconciler: Reconciler<S, I, Q>,
    engine: DecisionEngine,
    attention: Arc<dyn AttentionSource>,
    decisions: mpsc::UnboundedSender<DecisionEvent>,
    consolidation: Option<mpsc::UnboundedSender<ConsolidationRequest>>,
    cycle: Mutex<()>,
    committed: AtomicU64,
    failed: AtomicU64,
    emitted: AtomicU64,
}

impl<S, I, Q> Pipeline<S, I, Q>
where
    S: ClaimStore + Send,
    I: SemanticInference,
    Q: CorpusSearch,
{
    /// Create a pipeline that sends decisions to `decisions`
    pub fn new(
        batcher: Arc<ObservationBatcher>,
        reconciler: Reconciler<S, I, Q>,
        engine: DecisionEngine,
        attention: Arc<dyn AttentionSource>,
        decisions: mpsc::UnboundedSender<DecisionEvent>,
    ) -> Self {
        Self {
            batcher,
            reconciler,
            engine,
            attention,
            decisions,
            consolidation: None,
            cycle: Mutex::new(()),
            committed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            emitted: AtomicU64::new(0),
        }
    }

    /// Also emit consolidation requests on `sender`
    pub fn with_consolidation(mut self, sender: mpsc::UnboundedSender<ConsolidationRequest>) -> Self {
        self.consolidation = Some(sender);
        self
    }

    /// The batcher this pipeline drains
    pub fn batcher(&self) -> &Arc<ObservationBatcher> {
        &self.batcher
    }

    /// The reconciler
    pub fn reconciler(&self) -> &Reconciler<S, I, Q> {
        &self.reconciler
    }

    /// Counters since creation
    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            batches_committed: self.committed.load(Ordering::Relaxed),
            batches_failed: self.failed.load(Ordering::Relaxed),
            decisions: self.emitted.load(Ordering::Relaxed),
        }
    }

    /// Run batch cycles until `shutdown` flips to true or its sender is dropped
    ///
    /// Shutdown is only observed between cycles; a cycle in flight runs to
    /// completion or to its own timeout.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!("Reconciliation pipeline started");

        loop {
            let stopping = *shutdown.borrow();
            if stopping {
                break;
            }

            tokio::select! {
                _ = self.batcher.wait_for_batch_ready() => {
                    if self.process_next_batch().await.is_err() {
                        let delay = self.reconciler.config().retry_delay();
                        tokio::select! {
                            _ = tokio::time::sleep(delay) => {}
                            _ = shutdown.changed() => break,
                        }
                    }
                }
                _ = shutdown.changed() => break,
            }
        }

        info!("Reconciliation pipeline stopped. {:?}", self.stats());
    }

    /// Pop and reconcile whatever is buffered, ready or not
    ///
    /// Returns `Ok(None)` when the buffer was empty. A failed batch is
    /// re-queued before the error is returned.
    pub async fn process_next_batch(&self) -> Result<Option<ReconcileReport>, ReconcileError> {
        let _cycle = self.cycle.lock().await;

        let batch = self.batcher.pop_batch();
        if batch.is_empty() {
            return Ok(None);
        }

        info!("Processing batch of {} observations", batch.len());
        match self.reconciler.reconcile(&batch).await {
            Ok(report) => {
                self.committed.fetch_add(1, Ordering::Relaxed);
                info!("Batch committed: {}", report.summary());
                self.dispatch(&report);
                Ok(Some(report))
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                error!("Batch of {} observations failed: {}", batch.len(), e);
                self.batcher.requeue(batch);
                Err(e)
            }
        }
    }

    fn dispatch(&self, report: &ReconcileReport) {
        for claim in report.claims_to_evaluate() {
            let attention = self.attention.current_attention();
            let outcome = self.engine.evaluate_claim(claim, &attention);

            if let Some(e) = &outcome.error {
                warn!("Decision for claim {} fell back to no_action: {}", claim.id, e);
            } else if outcome.action != DecisionAction::NoAction {
                info!(
                    "Decision for claim {}: {} (prior {:.1}, focus {:.2})",
                    claim.id, outcome.action, outcome.prior, outcome.effective_focus
                );
            } else {
                debug!("Decision for claim {}: no_action", claim.id);
            }

            let event = DecisionEvent {
                claim: claim.clone(),
                outcome,
            };
            if self.decisions.send(event).is_err() {
                debug!("Decision receiver closed, dropping event for {}", claim.id);
            } else {
                self.emitted.fetch_add(1, Ordering::Relaxed);
            }
        }

        if report.consolidation_due {
            let request = ConsolidationRequest {
                counter: self.reconciler.config().consolidation_counter.clone(),
                requested_at: now_secs(),
            };
            match &self.consolidation {
                Some(sender) => {
                    if sender.send(request).is_err() {
                        warn!("Consolidation receiver closed");
                    }
                }
                None => debug!("Consolidation due but no receiver configured"),
            }
        }
    }
}
