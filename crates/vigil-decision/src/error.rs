//! Decision engine error types

use thiserror::Error;

/// Errors that can occur while deciding
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecisionError {
    /// Input that cannot be evaluated
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
