//! Line-delimited JSON collector.
//!
//! External watchers write one signal per line:
//!
//! ```text
//! {"kind":"observation","source":"screen","content":"Editing main.rs","content_type":"input_text"}
//! {"kind":"activity","event_type":"keyboard","detail":"typing"}
//! {"kind":"app","name":"Xcode"}
//! ```
//!
//! Observations go to the batcher, activity and app changes go to the
//! attention estimator. Malformed lines are logged and skipped.

use crate::error::{DaemonError, Result};
use serde::Deserialize;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};
use vigil_attention::AttentionEstimator;
use vigil_reconciler::ObservationBatcher;

fn default_content_type() -> String {
    "input_text".to_string()
}

/// One input line
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signal {
    /// Raw content for reconciliation
    Observation {
        /// Collector name
        source: String,
        /// Raw content
        content: String,
        /// Content type
        #[serde(default = "default_content_type")]
        content_type: String,
    },

    /// User input activity
    Activity {
        /// Event category, e.g. "keyboard"
        event_type: String,
        /// Free-form detail
        #[serde(default)]
        detail: String,
    },

    /// Frontmost application reported by the watcher
    App {
        /// Application name
        name: String,
    },
}

/// Parse one line; blank lines yield `None`
pub fn parse_line(line: &str) -> Result<Option<Signal>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| DaemonError::Signal(e.to_string()))
}

/// Collector counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectorStats {
    /// Observations pushed to the batcher
    pub observations: u64,
    /// Activity events recorded
    pub activities: u64,
    /// App changes applied
    pub app_changes: u64,
    /// Lines skipped as malformed
    pub rejected: u64,
}

/// Routes signals to the batcher and the attention estimator
pub struct Collector {
    batcher: Arc<ObservationBatcher>,
    attention: AttentionEstimator,
    stats: CollectorStats,
}

impl Collector {
    /// Create a collector feeding `batcher` and `attention`
    pub fn new(batcher: Arc<ObservationBatcher>, attention: AttentionEstimator) -> Self {
        Self {
            batcher,
            attention,
            stats: CollectorStats::default(),
        }
    }

    /// Counters so far
    pub fn stats(&self) -> CollectorStats {
        self.stats
    }

    /// Apply one signal
    pub fn apply(&mut self, signal: Signal) {
        match signal {
            Signal::Observation {
                source,
                content,
                content_type,
            } => {
                self.batcher.push(source, content, content_type);
                self.stats.observations += 1;
            }
            Signal::Activity { event_type, detail } => {
                self.attention.record_activity(&event_type, &detail);
                self.stats.activities += 1;
            }
            Signal::App { name } => {
                self.attention.set_active_application(&name);
                self.stats.app_changes += 1;
            }
        }
    }

    /// Read signals until end of input
    pub async fn run<R>(&mut self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        info!("Collector reading signals");
        let mut lines = input.lines();

        while let Some(line) = lines.next_line().await? {
            match parse_line(&line) {
                Ok(Some(signal)) => {
                    debug!("Signal: {:?}", signal);
                    self.apply(signal);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Skipping line: {}", e);
                    self.stats.rejected += 1;
                }
            }
        }

        info!("Collector input closed. {:?}", self.stats);
        Ok(())
    }
}
