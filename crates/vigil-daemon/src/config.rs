//! Daemon configuration.
//!
//! One TOML file with a table per component. Every table is optional and
//! falls back to that component's defaults.

use crate::cli::Cli;
use crate::error::{DaemonError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use vigil_attention::AttentionConfig;
use vigil_decision::DecisionConfig;
use vigil_llm::LlmConfig;
use vigil_reconciler::{BatcherConfig, ReconcilerConfig};

/// Where the corpus lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("vigil.db"),
        }
    }
}

/// Process-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonSettings {
    /// Reconcile whatever is still buffered when shutting down
    pub flush_on_shutdown: bool,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            flush_on_shutdown: true,
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VigilConfig {
    /// Process settings
    pub daemon: DaemonSettings,

    /// Datastore
    pub store: StoreConfig,

    /// Inference service
    pub llm: LlmConfig,

    /// Observation batching
    pub batcher: BatcherConfig,

    /// Reconciliation
    pub reconciler: ReconcilerConfig,

    /// Decision engine
    pub decision: DecisionConfig,

    /// Attention estimation
    pub attention: AttentionConfig,
}

impl VigilConfig {
    /// Parse from a TOML string
    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load from `path`, or use defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = fs::read_to_string(path).map_err(|e| {
                    DaemonError::Config(format!("Cannot read {}: {}", path.display(), e))
                })?;
                Self::from_toml(&contents)
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(db) = &cli.db {
            self.store.path = db.clone();
        }
        if let Some(model) = &cli.model {
            self.llm.model = model.clone();
        }
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        if self.store.path.as_os_str().is_empty() {
            return Err(DaemonError::Config("store.path must not be empty".to_string()));
        }
        self.llm.validate()?;
        self.batcher.validate()?;
        self.reconciler.validate()?;
        self.decision.validate()?;
        self.attention.validate()?;
        Ok(())
    }
}
