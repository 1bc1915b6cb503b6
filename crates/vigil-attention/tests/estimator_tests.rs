//! Integration tests for the attention estimator and its sampler

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use vigil_attention::{
    AppProbe, AttentionConfig, AttentionError, AttentionEstimator, StaticAppProbe,
};
use vigil_domain::traits::AttentionSource;

struct HangingProbe;

#[async_trait]
impl AppProbe for HangingProbe {
    async fn frontmost_app(&self) -> Result<String, AttentionError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("xcode".to_string())
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn with_probe(probe: impl AppProbe + 'static) -> AttentionEstimator {
    AttentionEstimator::new(AttentionConfig::default(), Arc::new(probe)).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_history_is_bounded() {
    let config = AttentionConfig {
        history_capacity: 5,
        ..Default::default()
    };
    let est = AttentionEstimator::new(config, Arc::new(StaticAppProbe::new("xcode"))).unwrap();

    for i in 0..10 {
        est.record_activity("keyboard", &format!("key {}", i));
    }
    assert_eq!(est.get_current_attention().recent_activity_count, 5);
}

#[tokio::test(start_paused = true)]
async fn test_activity_raises_focus() {
    let est = with_probe(StaticAppProbe::new("xcode"));
    est.set_active_application("xcode");
    let quiet = est.get_current_attention().focus_level;

    for _ in 0..20 {
        est.record_activity("keyboard", "typing");
    }
    let busy = est.get_current_attention().focus_level;

    assert!(close(quiet, 0.63));
    assert!(close(busy, 0.93));
}

#[tokio::test(start_paused = true)]
async fn test_old_activity_leaves_the_window() {
    let est = with_probe(StaticAppProbe::new("xcode"));
    for _ in 0..3 {
        est.record_activity("mouse", "click");
    }
    assert_eq!(est.get_current_attention().recent_activity_count, 3);

    tokio::time::advance(Duration::from_secs(130)).await;
    assert_eq!(est.get_current_attention().recent_activity_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_idle_penalty_grows_with_time() {
    let est = with_probe(StaticAppProbe::new("xcode"));
    est.set_active_application("xcode");
    est.record_activity("keyboard", "typing");

    tokio::time::advance(Duration::from_secs(180)).await;
    let snapshot = est.get_current_attention();

    assert!(close(snapshot.idle_time_seconds, 180.0));
    // activity has aged out, idle penalty is (180 - 30) / 300
    assert!(close(snapshot.focus_level, 0.63 * 0.5));
}

#[tokio::test(start_paused = true)]
async fn test_sample_once_updates_application() {
    let est = with_probe(StaticAppProbe::sequence(["Xcode", "Safari"]));

    let (first, err) = est.sample_once().await;
    assert!(err.is_none());
    assert_eq!(first.active_application, "xcode");

    let (second, _) = est.sample_once().await;
    assert_eq!(second.active_application, "safari");
    assert_eq!(second.app_switch_frequency, 1.0);
    assert_eq!(est.stats().ticks, 2);
    assert_eq!(est.stats().failures, 0);
}

#[tokio::test(start_paused = true)]
async fn test_sampler_start_and_stop() {
    let est = with_probe(StaticAppProbe::new("xcode"));
    assert!(!est.is_monitoring());

    assert!(est.start_monitoring());
    assert!(!est.start_monitoring());
    assert!(est.is_monitoring());

    tokio::time::sleep(Duration::from_millis(4500)).await;
    est.stop_monitoring().await;

    let stats = est.stats();
    assert!(stats.ticks >= 2);
    assert!(!stats.running);
    assert_eq!(est.last_snapshot().active_application, "xcode");

    // stopping twice is harmless
    est.stop_monitoring().await;
}

#[tokio::test(start_paused = true)]
async fn test_sampler_can_restart() {
    let est = with_probe(StaticAppProbe::new("xcode"));
    assert!(est.start_monitoring());
    est.stop_monitoring().await;
    assert!(est.start_monitoring());
    est.stop_monitoring().await;
    assert!(!est.is_monitoring());
}

#[tokio::test(start_paused = true)]
async fn test_hung_probe_degrades_to_unknown() {
    let config = AttentionConfig {
        probe_timeout_ms: 500,
        ..Default::default()
    };
    let est = AttentionEstimator::new(config, Arc::new(HangingProbe)).unwrap();

    let (snapshot, err) = est.sample_once().await;
    assert_eq!(snapshot.active_application, "unknown");
    assert_eq!(err, Some(AttentionError::ProbeTimeout(500)));

    assert!(est.start_monitoring());
    tokio::time::sleep(Duration::from_millis(4500)).await;
    est.stop_monitoring().await;

    let stats = est.stats();
    assert!(stats.ticks >= 2);
    assert_eq!(stats.failures, stats.ticks);
}

#[tokio::test(start_paused = true)]
async fn test_failed_sample_keeps_last_known_app() {
    let est = with_probe(StaticAppProbe::sequence(Vec::<String>::new()));
    est.set_active_application("Xcode");
    let before = est.get_current_attention();

    let (after, err) = est.sample_once().await;
    assert!(matches!(err, Some(AttentionError::Probe(_))));
    assert_eq!(after.active_application, "xcode");
    assert!(close(before.focus_level, 0.63));
    assert!(close(after.focus_level, before.focus_level));
    assert_eq!(est.stats().failures, 1);
}

#[tokio::test(start_paused = true)]
async fn test_attention_reports_app_from_last_sample() {
    let est = with_probe(StaticAppProbe::sequence(["Xcode", "Safari"]));
    let (sampled, _) = est.sample_once().await;
    assert_eq!(sampled.active_application, "xcode");

    // recomputing does not consult the frontmost app again
    assert_eq!(est.get_current_attention().active_application, "xcode");
    assert_eq!(est.get_current_attention().active_application, "xcode");
    assert_eq!(est.stats().ticks, 1);

    let (next, _) = est.sample_once().await;
    assert_eq!(next.active_application, "safari");
}

#[tokio::test(start_paused = true)]
async fn test_usable_as_attention_source() {
    let est = with_probe(StaticAppProbe::new("spotify"));
    est.set_active_application("spotify");

    let source: Arc<dyn AttentionSource> = Arc::new(est.clone());
    let snapshot = source.current_attention();
    assert!(close(snapshot.focus_level, 0.14));
    assert_eq!(snapshot, est.last_snapshot());
}
