//! Vigil daemon library.
//!
//! Configuration, the stdin signal collector and the runtime that wires the
//! batcher, reconciler, decision engine and attention estimator together.

pub mod cli;
pub mod collector;
pub mod config;
pub mod daemon;
pub mod error;

pub use cli::Cli;
pub use collector::{parse_line, Collector, CollectorStats, Signal};
pub use config::{DaemonSettings, StoreConfig, VigilConfig};
pub use daemon::{Daemon, DaemonSummary, VigilDaemon};
pub use error::{DaemonError, Result};
