//! Attention estimator error types

use thiserror::Error;

/// Errors that can occur while estimating attention
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttentionError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Frontmost-application query failed
    #[error("App probe failed: {0}")]
    Probe(String),

    /// Frontmost-application query took too long
    #[error("App probe timed out after {0} ms")]
    ProbeTimeout(u64),
}
