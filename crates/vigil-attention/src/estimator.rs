//! Attention estimator and its background sampler

use crate::config::AttentionConfig;
use crate::error::AttentionError;
use crate::focus::{compute_focus, AppClassifier, FocusSignals};
use crate::history::{ActivityEvent, ActivityHistory, SwitchLog};
use crate::probe::{probe_or_unknown, AppProbe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use vigil_domain::attention::UNKNOWN_APPLICATION;
use vigil_domain::traits::AttentionSource;
use vigil_domain::AttentionSnapshot;

/// Sampler counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SamplerStats {
    /// Completed sampling ticks
    pub ticks: u64,

    /// Ticks whose app probe failed or timed out
    pub failures: u64,

    /// Whether the background sampler is running
    pub running: bool,
}

struct EstimatorState {
    history: ActivityHistory,
    switches: SwitchLog,
    last_activity: Instant,
    active_app: String,
    last_known_app: Option<String>,
    last_snapshot: AttentionSnapshot,
}

struct Sampler {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

struct Inner {
    config: AttentionConfig,
    classifier: AppClassifier,
    probe: Arc<dyn AppProbe>,
    state: Mutex<EstimatorState>,
    sampler: Mutex<Option<Sampler>>,
    ticks: AtomicU64,
    failures: AtomicU64,
}

/// Estimates the user's focus from activity, app usage and idleness
///
/// Cheap to clone; clones share history and the background sampler.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vigil_attention::{AttentionConfig, AttentionEstimator, StaticAppProbe};
///
/// let estimator = AttentionEstimator::new(
///     AttentionConfig::default(),
///     Arc::new(StaticAppProbe::new("xcode")),
/// ).unwrap();
/// estimator.record_activity("keyboard", "typing");
/// let snapshot = estimator.get_current_attention();
/// assert!(snapshot.focus_level >= 0.0 && snapshot.focus_level <= 1.0);
/// assert_eq!(snapshot.recent_activity_count, 1);
/// ```
#[derive(Clone)]
pub struct AttentionEstimator {
    inner: Arc<Inner>,
}

impl AttentionEstimator {
    /// Create an estimator after validating the configuration
    pub fn new(config: AttentionConfig, probe: Arc<dyn AppProbe>) -> Result<Self, AttentionError> {
        config.validate()?;
        let classifier = AppClassifier::new(&config);
        let state = EstimatorState {
            history: ActivityHistory::new(config.history_capacity),
            switches: SwitchLog::default(),
            last_activity: Instant::now(),
            active_app: UNKNOWN_APPLICATION.to_string(),
            last_known_app: None,
            last_snapshot: AttentionSnapshot::neutral(),
        };

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                classifier,
                probe,
                state: Mutex::new(state),
                sampler: Mutex::new(None),
                ticks: AtomicU64::new(0),
                failures: AtomicU64::new(0),
            }),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &AttentionConfig {
        &self.inner.config
    }

    fn state(&self) -> MutexGuard<'_, EstimatorState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record one user activity event
    pub fn record_activity(&self, event_type: &str, detail: &str) {
        let now = Instant::now();
        let window = Duration::from_secs(self.inner.config.history_window_secs);
        let mut state = self.state();
        state.history.push(ActivityEvent {
            event_type: event_type.to_string(),
            detail: detail.to_string(),
            at: now,
        });
        state.history.prune(now, window);
        state.last_activity = now;
    }

    /// Update the frontmost application
    ///
    /// Moving to a different known application counts as a switch; moving to
    /// or from `"unknown"` does not.
    pub fn set_active_application(&self, name: &str) {
        let name = name.trim().to_lowercase();
        let name = if name.is_empty() {
            UNKNOWN_APPLICATION.to_string()
        } else {
            name
        };

        let mut state = self.state();
        if name != UNKNOWN_APPLICATION {
            let previous = state.last_known_app.replace(name.clone());
            if let Some(previous) = previous.filter(|p| *p != name) {
                debug!("App switch: {} -> {}", previous, name);
                state.switches.record(Instant::now());
            }
        }
        state.active_app = name;
    }

    fn keep_last_known_application(&self, error: &AttentionError) {
        let mut state = self.state();
        let app = state
            .last_known_app
            .clone()
            .unwrap_or_else(|| UNKNOWN_APPLICATION.to_string());
        debug!("Frontmost app unavailable ({}), keeping {}", error, app);
        state.active_app = app;
    }

    /// Recompute attention from everything recorded so far
    ///
    /// Activity and idle time are measured at call time. The application is
    /// whatever the sampler or a collector last set, so it can be up to one
    /// `sample_interval_ms` old.
    pub fn get_current_attention(&self) -> AttentionSnapshot {
        let config = &self.inner.config;
        let now = Instant::now();
        let mut state = self.state();

        state.history.prune(now, Duration::from_secs(config.history_window_secs));
        let recent_activity = state
            .history
            .count_within(now, Duration::from_secs(config.activity_window_secs));
        let switch_frequency = state
            .switches
            .frequency(now, Duration::from_secs(config.switch_window_secs));
        let idle_secs = now.duration_since(state.last_activity).as_secs_f64();

        let signals = FocusSignals {
            app_score: self.inner.classifier.score(&state.active_app),
            recent_activity,
            idle_secs,
            switch_frequency,
        };
        let snapshot = AttentionSnapshot {
            focus_level: compute_focus(config, &signals),
            active_application: state.active_app.clone(),
            idle_time_seconds: idle_secs,
            recent_activity_count: recent_activity,
            app_switch_frequency: switch_frequency,
        };
        state.last_snapshot = snapshot.clone();
        snapshot
    }

    /// Snapshot from the most recent computation, without recomputing
    pub fn last_snapshot(&self) -> AttentionSnapshot {
        self.state().last_snapshot.clone()
    }

    /// Probe the frontmost app once and recompute
    ///
    /// The snapshot is always produced. When the frontmost-app query fails
    /// the last known application stays active, or `"unknown"` if none was
    /// ever seen. The error is returned for the caller to count.
    pub async fn sample_once(&self) -> (AttentionSnapshot, Option<AttentionError>) {
        let (app, error) =
            probe_or_unknown(self.inner.probe.as_ref(), self.inner.config.probe_timeout()).await;
        match &error {
            None => self.set_active_application(&app),
            Some(e) => self.keep_last_known_application(e),
        }
        let snapshot = self.get_current_attention();

        self.inner.ticks.fetch_add(1, Ordering::Relaxed);
        if error.is_some() {
            self.inner.failures.fetch_add(1, Ordering::Relaxed);
        }
        (snapshot, error)
    }

    /// Start the background sampler
    ///
    /// Returns `false` (and does nothing) when it is already running.
    pub fn start_monitoring(&self) -> bool {
        let mut sampler = self.inner.sampler.lock().unwrap_or_else(|e| e.into_inner());
        if sampler.as_ref().is_some_and(|s| !s.handle.is_finished()) {
            warn!("Attention sampler already running");
            return false;
        }

        let (shutdown, rx) = watch::channel(false);
        let handle = tokio::spawn(run_sampler(self.clone(), rx));
        *sampler = Some(Sampler { shutdown, handle });
        info!(
            "Attention sampler started (interval: {:?})",
            self.inner.config.sample_interval()
        );
        true
    }

    /// Stop the background sampler and wait for it to exit
    pub async fn stop_monitoring(&self) {
        let sampler = self
            .inner
            .sampler
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        if let Some(sampler) = sampler {
            let _ = sampler.shutdown.send(true);
            if let Err(e) = sampler.handle.await {
                warn!("Attention sampler ended abnormally: {}", e);
            }
            info!("Attention sampler stopped");
        }
    }

    /// Whether the background sampler is running
    pub fn is_monitoring(&self) -> bool {
        self.inner
            .sampler
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|s| !s.handle.is_finished())
    }

    /// Sampler counters
    pub fn stats(&self) -> SamplerStats {
        SamplerStats {
            ticks: self.inner.ticks.load(Ordering::Relaxed),
            failures: self.inner.failures.load(Ordering::Relaxed),
            running: self.is_monitoring(),
        }
    }
}

impl AttentionSource for AttentionEstimator {
    fn current_attention(&self) -> AttentionSnapshot {
        self.get_current_attention()
    }
}

async fn run_sampler(estimator: AttentionEstimator, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval(estimator.inner.config.sample_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let (snapshot, error) = estimator.sample_once().await;
                if let Some(e) = error {
                    warn!("Attention sample degraded: {}", e);
                }
                debug!(
                    "focus={:.2} app={} idle={:.1}s activity={} switches={:.1}/min",
                    snapshot.focus_level,
                    snapshot.active_application,
                    snapshot.idle_time_seconds,
                    snapshot.recent_activity_count,
                    snapshot.app_switch_frequency
                );
            }
            _ = shutdown.changed() => {
                break;
            }
        }
    }
}
