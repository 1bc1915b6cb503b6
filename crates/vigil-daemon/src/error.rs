//! Error types for the daemon.

use thiserror::Error;

/// Result type alias for daemon operations.
pub type Result<T> = std::result::Result<T, DaemonError>;

/// Daemon-level errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Collector line that is not a valid signal
    #[error("Invalid signal: {0}")]
    Signal(String),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] vigil_store::StoreError),

    /// LLM client error
    #[error("LLM error: {0}")]
    Llm(#[from] vigil_llm::LlmError),

    /// Reconciliation error
    #[error(transparent)]
    Reconcile(#[from] vigil_reconciler::ReconcileError),

    /// Decision engine error
    #[error(transparent)]
    Decision(#[from] vigil_decision::DecisionError),

    /// Attention estimator error
    #[error(transparent)]
    Attention(#[from] vigil_attention::AttentionError),
}
