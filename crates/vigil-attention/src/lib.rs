//! Vigil Attention Estimator
//!
//! Estimates how focused the user is from three signals:
//!
//! - **Application**: the frontmost app, classified as deep-work, casual or neutral
//! - **Activity**: how many input events arrived recently
//! - **Disruption**: how long the user has been idle and how often they switch apps
//!
//! The estimate is a pure recompute over in-memory history, so reading it is
//! synchronous and cheap. An optional background sampler polls the desktop
//! for the frontmost application on a fixed interval.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use vigil_attention::{AttentionConfig, AttentionEstimator, FrontmostAppProbe};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let estimator = AttentionEstimator::new(
//!         AttentionConfig::default(),
//!         Arc::new(FrontmostAppProbe::new()),
//!     )?;
//!
//!     estimator.start_monitoring();
//!     estimator.record_activity("keyboard", "typing");
//!     println!("focus: {:.2}", estimator.get_current_attention().focus_level);
//!     estimator.stop_monitoring().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod estimator;
pub mod focus;
pub mod history;
pub mod probe;

pub use config::AttentionConfig;
pub use error::AttentionError;
pub use estimator::{AttentionEstimator, SamplerStats};
pub use focus::{compute_focus, idle_penalty, switch_penalty, AppClassifier, FocusSignals};
pub use history::{ActivityEvent, ActivityHistory, SwitchLog};
pub use probe::{probe_or_unknown, AppProbe, FrontmostAppProbe, StaticAppProbe};
