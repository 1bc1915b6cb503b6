//! Vigil Reconciler
//!
//! Keeps the claim corpus free of duplicate meanings as observations stream in.
//!
//! # Overview
//!
//! - **Batching**: [`ObservationBatcher`] buffers raw observations until a batch is ready
//! - **Reconciliation**: [`Reconciler`] drafts claims from a batch, finds related
//!   claims in the corpus, and applies the identical / similar / unrelated verdicts
//!   in a single store transaction
//! - **Dispatch**: [`Pipeline`] runs cycles one at a time, re-queues failed
//!   batches, and sends a [`DecisionEvent`] for every new or revised claim
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio::sync::{mpsc, watch, Mutex};
//! use vigil_decision::DecisionEngine;
//! use vigil_domain::AttentionSnapshot;
//! use vigil_llm::{LlmInference, OllamaProvider};
//! use vigil_reconciler::{
//!     BatcherConfig, ObservationBatcher, Pipeline, Reconciler, ReconcilerConfig,
//! };
//! use vigil_store::{FtsSearch, SqliteStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(Mutex::new(SqliteStore::new("vigil.db")?));
//!     let search = Arc::new(FtsSearch::open("vigil.db")?);
//!     let inference = Arc::new(LlmInference::new(OllamaProvider::new(
//!         "http://localhost:11434",
//!         "llama3.1",
//!     )?));
//!
//!     let reconciler = Reconciler::new(store, inference, search, ReconcilerConfig::default())?;
//!     let batcher = Arc::new(ObservationBatcher::new(BatcherConfig::default())?);
//!     let (decisions, mut rx) = mpsc::unbounded_channel();
//!     let pipeline = Pipeline::new(
//!         Arc::clone(&batcher),
//!         reconciler,
//!         DecisionEngine::with_defaults(),
//!         Arc::new(AttentionSnapshot::neutral()),
//!         decisions,
//!     );
//!
//!     let (_stop, shutdown) = watch::channel(false);
//!     tokio::spawn(async move { pipeline.run(shutdown).await });
//!
//!     batcher.push("screen", "Editing parser.rs in vscode", "input_text");
//!     while let Some(event) = rx.recv().await {
//!         println!("{}: {}", event.claim.text, event.outcome.action);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod batcher;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod reconciler;
pub mod report;

pub use batcher::ObservationBatcher;
pub use config::{BatcherConfig, ReconcilerConfig};
pub use error::ReconcileError;
pub use pipeline::{ConsolidationRequest, DecisionEvent, Pipeline, PipelineStats};
pub use reconciler::Reconciler;
pub use report::ReconcileReport;
