//! Inference service configuration

use crate::LlmError;
use serde::{Deserialize, Serialize};

/// Configuration for the LLM-backed inference service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama API endpoint
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Per-request HTTP timeout in seconds
    pub timeout_secs: u64,

    /// Attempts per request before giving up
    pub max_retries: u32,

    /// How the user is referred to in prompts
    pub user_name: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: crate::ollama::DEFAULT_ENDPOINT.to_string(),
            model: "llama3.1".to_string(),
            timeout_secs: crate::ollama::DEFAULT_TIMEOUT_SECS,
            max_retries: crate::ollama::DEFAULT_MAX_RETRIES,
            user_name: "the user".to_string(),
        }
    }
}

impl LlmConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.endpoint.trim().is_empty() {
            return Err(LlmError::Config("endpoint must not be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(LlmError::Config("model must not be empty".to_string()));
        }
        if self.max_retries == 0 {
            return Err(LlmError::Config("max_retries must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(LlmConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_retries() {
        let config = LlmConfig {
            max_retries: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(LlmError::Config(_))));
    }

    #[test]
    fn test_rejects_blank_model() {
        let config = LlmConfig {
            model: "  ".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, LlmError::Config(_)));
        assert!(err.to_string().contains("model"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: LlmConfig = serde_json::from_str(r#"{"model": "mistral"}"#).unwrap();
        assert_eq!(config.model, "mistral");
        assert_eq!(config.max_retries, crate::ollama::DEFAULT_MAX_RETRIES);
    }
}
