//! Configuration for batching and reconciliation

use crate::error::ReconcileError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Batch sizing for the observation buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatcherConfig {
    /// Buffer size at which a batch becomes ready
    pub min_batch_size: usize,

    /// Buffer size that forces a flush
    pub max_batch_size: usize,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            min_batch_size: 5,
            max_batch_size: 50,
        }
    }
}

impl BatcherConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ReconcileError> {
        if self.min_batch_size == 0 {
            return Err(ReconcileError::Config(
                "min_batch_size must be greater than 0".to_string(),
            ));
        }
        if self.min_batch_size > self.max_batch_size {
            return Err(ReconcileError::Config(format!(
                "min_batch_size ({}) cannot exceed max_batch_size ({})",
                self.min_batch_size, self.max_batch_size
            )));
        }
        Ok(())
    }
}

/// Configuration for the reconciliation engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Existing claims fetched per draft when building the candidate pool
    pub candidate_limit: usize,

    /// Deadline for each inference or search call (seconds)
    pub call_timeout_secs: u64,

    /// Most supporting observations shown when revising a cluster
    pub revision_observation_cap: usize,

    /// New unrelated claims that trigger a consolidation request (0 disables)
    pub consolidation_trigger: u64,

    /// Name of the persisted consolidation counter
    pub consolidation_counter: String,

    /// Pause after a failed batch before the pipeline tries again (milliseconds)
    pub retry_delay_ms: u64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            candidate_limit: 10,
            call_timeout_secs: 120,
            revision_observation_cap: 10,
            consolidation_trigger: 30,
            consolidation_counter: "new_claims".to_string(),
            retry_delay_ms: 5000,
        }
    }
}

impl ReconcilerConfig {
    /// Deadline for one collaborator call
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Pause after a failed batch
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ReconcileError> {
        if self.candidate_limit == 0 {
            return Err(ReconcileError::Config(
                "candidate_limit must be greater than 0".to_string(),
            ));
        }
        if self.call_timeout_secs == 0 {
            return Err(ReconcileError::Config(
                "call_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.revision_observation_cap == 0 {
            return Err(ReconcileError::Config(
                "revision_observation_cap must be greater than 0".to_string(),
            ));
        }
        if self.consolidation_counter.trim().is_empty() {
            return Err(ReconcileError::Config(
                "consolidation_counter cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ReconcileError> {
        toml::from_str(toml_str)
            .map_err(|e| ReconcileError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, ReconcileError> {
        toml::to_string_pretty(self)
            .map_err(|e| ReconcileError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(BatcherConfig::default().validate().is_ok());
        assert!(ReconcilerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_batcher_bounds() {
        let inverted = BatcherConfig {
            min_batch_size: 10,
            max_batch_size: 5,
        };
        assert!(inverted.validate().is_err());

        let zero = BatcherConfig {
            min_batch_size: 0,
            max_batch_size: 5,
        };
        assert!(zero.validate().is_err());

        let equal = BatcherConfig {
            min_batch_size: 3,
            max_batch_size: 3,
        };
        assert!(equal.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ReconcilerConfig::from_toml("candidate_limit = 4\n").unwrap();
        assert_eq!(config.candidate_limit, 4);
        assert_eq!(config.revision_observation_cap, 10);
        assert_eq!(config.consolidation_trigger, 30);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ReconcilerConfig {
            call_timeout_secs: 5,
            ..Default::default()
        };
        let parsed = ReconcilerConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
