//! Error types for reconciliation

use std::fmt::Display;
use thiserror::Error;

/// Errors that abort a reconciliation cycle
///
/// Any of these rolls the batch back; the pipeline then re-queues the batch's
/// observations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconcileError {
    /// Datastore error
    #[error("Store error: {0}")]
    Store(String),

    /// Semantic inference error
    #[error("Inference error: {0}")]
    Inference(String),

    /// Corpus search error
    #[error("Search error: {0}")]
    Search(String),

    /// A collaborator call exceeded its deadline
    #[error("{operation} timed out after {secs}s")]
    Timeout {
        /// Which call timed out
        operation: &'static str,
        /// Deadline in seconds
        secs: u64,
    },

    /// Revising a similar cluster produced no claims
    #[error("Revision of {0} similar claims returned nothing")]
    EmptyRevision(usize),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

pub(crate) fn store_error(e: impl Display) -> ReconcileError {
    ReconcileError::Store(e.to_string())
}

pub(crate) fn inference_error(e: impl Display) -> ReconcileError {
    ReconcileError::Inference(e.to_string())
}

pub(crate) fn search_error(e: impl Display) -> ReconcileError {
    ReconcileError::Search(e.to_string())
}
