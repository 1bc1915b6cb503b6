//! End-to-end tests for the daemon runtime with a scripted model

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::BufReader;
use tokio::sync::Mutex;
use vigil_attention::{AttentionConfig, AttentionEstimator, StaticAppProbe};
use vigil_daemon::{Daemon, DaemonSummary, VigilConfig, VigilDaemon};
use vigil_decision::DecisionEngine;
use vigil_domain::traits::ClaimStore;
use vigil_llm::{LlmInference, MockProvider};
use vigil_reconciler::{BatcherConfig, ObservationBatcher, Reconciler, ReconcilerConfig};
use vigil_store::{FtsSearch, SqliteStore};

type TestDaemon = Daemon<SqliteStore, LlmInference<MockProvider>, FtsSearch>;

struct Harness {
    _dir: TempDir,
    store: Arc<Mutex<SqliteStore>>,
    llm: MockProvider,
    daemon: TestDaemon,
}

fn harness(min_batch_size: usize) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vigil.db");
    let store = Arc::new(Mutex::new(SqliteStore::new(&path).unwrap()));
    let search = Arc::new(FtsSearch::open(&path).unwrap());
    let llm = MockProvider::default();
    let reconciler = Reconciler::new(
        Arc::clone(&store),
        Arc::new(LlmInference::new(llm.clone())),
        search,
        ReconcilerConfig::default(),
    )
    .unwrap();

    let batcher = ObservationBatcher::new(BatcherConfig {
        min_batch_size,
        max_batch_size: 50,
    })
    .unwrap();
    let estimator = AttentionEstimator::new(
        AttentionConfig::default(),
        Arc::new(StaticAppProbe::new("Safari")),
    )
    .unwrap();

    let daemon = Daemon::new(
        Arc::new(batcher),
        reconciler,
        DecisionEngine::with_defaults(),
        estimator,
    );

    Harness {
        _dir: dir,
        store,
        llm,
        daemon,
    }
}

fn script_one_claim(llm: &MockProvider, text: &str) {
    llm.push_response(
        json!({"claims": [{"claim": text, "reasoning": "seen twice", "confidence": 8}]}).to_string(),
    );
    llm.push_response(r#"{"relations": []}"#);
}

const TWO_OBSERVATIONS: &str = concat!(
    r#"{"kind":"observation","source":"browser","content":"Flights to Lisbon"}"#,
    "\n",
    r#"{"kind":"activity","event_type":"mouse","detail":"scroll"}"#,
    "\n",
    r#"{"kind":"observation","source":"browser","content":"Hotels in Alfama"}"#,
    "\n",
);

async fn serve_to_eof(daemon: TestDaemon, input: &'static str) -> DaemonSummary {
    tokio::time::timeout(
        Duration::from_secs(10),
        daemon.serve(input.as_bytes(), std::future::pending()),
    )
    .await
    .unwrap()
    .unwrap()
}

#[tokio::test]
async fn test_input_is_reconciled_before_exit() {
    let h = harness(2);
    script_one_claim(&h.llm, "Is planning a trip to Lisbon");

    let summary = serve_to_eof(h.daemon, TWO_OBSERVATIONS).await;

    assert_eq!(summary.collector.observations, 2);
    assert_eq!(summary.collector.activities, 1);
    assert_eq!(summary.pipeline.batches_committed, 1);
    assert_eq!(summary.pipeline.decisions, 1);

    let store = h.store.lock().await;
    assert_eq!(store.count_claims().unwrap(), 1);
    assert_eq!(store.count_observations().unwrap(), 2);
}

#[tokio::test]
async fn test_leftovers_flushed_on_shutdown() {
    let h = harness(5);
    script_one_claim(&h.llm, "Is planning a trip to Lisbon");

    let summary = serve_to_eof(h.daemon, TWO_OBSERVATIONS).await;

    // below the minimum, so only the shutdown flush reconciles them
    assert_eq!(summary.pipeline.batches_committed, 1);
    assert_eq!(h.llm.call_count(), 2);
    assert_eq!(h.store.lock().await.count_observations().unwrap(), 2);
}

#[tokio::test]
async fn test_leftovers_kept_when_flush_disabled() {
    let h = harness(5);
    let daemon = h.daemon.flush_on_shutdown(false);

    let summary = serve_to_eof(daemon, TWO_OBSERVATIONS).await;

    assert_eq!(summary.collector.observations, 2);
    assert_eq!(summary.pipeline.batches_committed, 0);
    assert_eq!(h.llm.call_count(), 0);
    assert_eq!(h.store.lock().await.count_observations().unwrap(), 0);
}

#[tokio::test]
async fn test_failed_flush_still_shuts_down() {
    let h = harness(5);
    h.llm.push_error("model unavailable");

    let summary = serve_to_eof(h.daemon, TWO_OBSERVATIONS).await;

    assert_eq!(summary.pipeline.batches_committed, 0);
    assert_eq!(summary.pipeline.batches_failed, 1);
    assert_eq!(h.store.lock().await.count_observations().unwrap(), 0);
}

#[tokio::test]
async fn test_shutdown_signal_stops_waiting_input() {
    let h = harness(2);
    let (_writer, reader) = tokio::io::duplex(64);

    let summary = tokio::time::timeout(
        Duration::from_secs(10),
        h.daemon.serve(BufReader::new(reader), async {}),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(summary, DaemonSummary::default());
    assert_eq!(h.llm.call_count(), 0);
}

#[tokio::test]
async fn test_from_config_opens_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = VigilConfig::default();
    config.store.path = dir.path().join("corpus.db");

    let daemon = VigilDaemon::from_config(&config);
    assert!(daemon.is_ok());
    assert!(config.store.path.exists());
}

#[tokio::test]
async fn test_from_config_rejects_invalid_config() {
    let mut config = VigilConfig::default();
    config.batcher.min_batch_size = 0;
    assert!(VigilDaemon::from_config(&config).is_err());
}
