//! Wires the components together and runs them until shutdown.

use crate::collector::{Collector, CollectorStats};
use crate::config::VigilConfig;
use crate::error::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::io::AsyncBufRead;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use vigil_attention::{AttentionEstimator, FrontmostAppProbe};
use vigil_decision::{DecisionAction, DecisionEngine};
use vigil_domain::traits::{ClaimStore, CorpusSearch, SemanticInference};
use vigil_llm::{LlmInference, OllamaProvider};
use vigil_reconciler::{
    ConsolidationRequest, DecisionEvent, ObservationBatcher, Pipeline, PipelineStats, Reconciler,
};
use vigil_store::{FtsSearch, SqliteStore};

/// What a daemon run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DaemonSummary {
    /// Collector counters
    pub collector: CollectorStats,

    /// Pipeline counters
    pub pipeline: PipelineStats,

    /// Decisions other than no_action
    pub interventions: u64,

    /// Consolidation requests received
    pub consolidations: u64,
}

/// A running assistant: collector, pipeline, sampler and decision sink
pub struct Daemon<S, I, Q> {
    batcher: Arc<ObservationBatcher>,
    pipeline: Arc<Pipeline<S, I, Q>>,
    estimator: AttentionEstimator,
    decisions: mpsc::UnboundedReceiver<DecisionEvent>,
    consolidations: mpsc::UnboundedReceiver<ConsolidationRequest>,
    flush_on_shutdown: bool,
}

/// The production daemon
pub type VigilDaemon = Daemon<SqliteStore, LlmInference<OllamaProvider>, FtsSearch>;

impl VigilDaemon {
    /// Build every component from configuration
    pub fn from_config(config: &VigilConfig) -> Result<Self> {
        config.validate()?;

        let path = &config.store.path;
        let store = SqliteStore::new(path)?;
        let search = FtsSearch::open(path)?;
        info!("Corpus at {}", path.display());

        let provider = OllamaProvider::from_config(&config.llm)?;
        info!("Inference via {} ({})", config.llm.endpoint, provider.model());
        let inference = LlmInference::with_config(provider, &config.llm);

        let reconciler = Reconciler::new(
            Arc::new(Mutex::new(store)),
            Arc::new(inference),
            Arc::new(search),
            config.reconciler.clone(),
        )?;
        let estimator =
            AttentionEstimator::new(config.attention.clone(), Arc::new(FrontmostAppProbe::new()))?;

        let mut daemon = Daemon::new(
            Arc::new(ObservationBatcher::new(config.batcher)?),
            reconciler,
            DecisionEngine::new(config.decision.clone())?,
            estimator,
        );
        daemon.flush_on_shutdown = config.daemon.flush_on_shutdown;
        Ok(daemon)
    }
}

impl<S, I, Q> Daemon<S, I, Q>
where
    S: ClaimStore + Send + 'static,
    I: SemanticInference + 'static,
    Q: CorpusSearch + 'static,
{
    /// Assemble a daemon from ready-made components
    pub fn new(
        batcher: Arc<ObservationBatcher>,
        reconciler: Reconciler<S, I, Q>,
        engine: DecisionEngine,
        estimator: AttentionEstimator,
    ) -> Self {
        let (decision_tx, decisions) = mpsc::unbounded_channel();
        let (consolidation_tx, consolidations) = mpsc::unbounded_channel();
        let pipeline = Pipeline::new(
            Arc::clone(&batcher),
            reconciler,
            engine,
            Arc::new(estimator.clone()),
            decision_tx,
        )
        .with_consolidation(consolidation_tx);

        Self {
            batcher,
            pipeline: Arc::new(pipeline),
            estimator,
            decisions,
            consolidations,
            flush_on_shutdown: true,
        }
    }

    /// Reconcile leftovers on shutdown (default true)
    pub fn flush_on_shutdown(mut self, flush: bool) -> Self {
        self.flush_on_shutdown = flush;
        self
    }

    /// Run until `input` ends or `shutdown` resolves
    ///
    /// Shutdown order: stop reading, stop the pipeline after its current
    /// cycle, flush leftovers if configured, stop the sampler, then drain
    /// the decision sink.
    pub async fn serve<R, F>(self, input: R, shutdown: F) -> Result<DaemonSummary>
    where
        R: AsyncBufRead + Unpin,
        F: Future<Output = ()>,
    {
        let Daemon {
            batcher,
            pipeline,
            estimator,
            decisions,
            consolidations,
            flush_on_shutdown,
        } = self;

        estimator.start_monitoring();
        let sink = tokio::spawn(log_decisions(decisions, consolidations));

        let (stop, stop_rx) = watch::channel(false);
        let runner = {
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move { pipeline.run(stop_rx).await })
        };

        info!("Vigil running");
        let mut collector = Collector::new(Arc::clone(&batcher), estimator.clone());
        let collected = tokio::select! {
            result = collector.run(input) => result,
            _ = shutdown => {
                info!("Shutdown requested");
                Ok(())
            }
        };
        if let Err(e) = &collected {
            error!("Collector failed: {}", e);
        }

        let _ = stop.send(true);
        if let Err(e) = runner.await {
            warn!("Pipeline task ended abnormally: {}", e);
        }

        if flush_on_shutdown && batcher.size() > 0 {
            info!("Flushing {} buffered observations", batcher.size());
            if let Err(e) = pipeline.process_next_batch().await {
                warn!("Final batch failed, {} observations left unreconciled: {}", batcher.size(), e);
            }
        }

        estimator.stop_monitoring().await;

        let pipeline_stats = pipeline.stats();
        drop(pipeline);
        let (interventions, consolidations) = join_sink(sink).await;

        let summary = DaemonSummary {
            collector: collector.stats(),
            pipeline: pipeline_stats,
            interventions,
            consolidations,
        };
        info!("Vigil stopped. {:?}", summary);

        collected.map(|_| summary)
    }
}

async fn join_sink(sink: JoinHandle<(u64, u64)>) -> (u64, u64) {
    match sink.await {
        Ok(counts) => counts,
        Err(e) => {
            warn!("Decision sink ended abnormally: {}", e);
            (0, 0)
        }
    }
}

/// Stand-in actuator: logs decisions until both channels close
async fn log_decisions(
    mut decisions: mpsc::UnboundedReceiver<DecisionEvent>,
    mut consolidations: mpsc::UnboundedReceiver<ConsolidationRequest>,
) -> (u64, u64) {
    let mut interventions = 0;
    let mut consolidated = 0;

    loop {
        tokio::select! {
            Some(event) = decisions.recv() => match event.outcome.action {
                DecisionAction::NoAction => {
                    debug!("Staying silent about '{}'", event.claim.text);
                }
                action => {
                    interventions += 1;
                    info!(
                        "[{}] {} (prior {:.1}, focus {:.2})",
                        action, event.claim.text, event.outcome.prior, event.outcome.effective_focus
                    );
                }
            },
            Some(request) = consolidations.recv() => {
                consolidated += 1;
                info!(
                    "Consolidation requested ({} at {})",
                    request.counter, request.requested_at
                );
            }
            else => break,
        }
    }

    (interventions, consolidated)
}
