//! Vigil LLM Provider Layer
//!
//! Pluggable text-generation backends plus the prompt/parse layer that turns
//! them into a [`SemanticInference`](vigil_domain::traits::SemanticInference)
//! service for the reconciler.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use vigil_llm::{LlmProvider, MockProvider};
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = tokio_test::block_on(provider.generate("test prompt")).unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod inference;
pub mod ollama;
pub mod parser;
pub mod prompt;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use config::LlmConfig;
pub use inference::LlmInference;
pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Client could not be constructed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// A text-generation backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for the prompt
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

#[async_trait]
impl<P: LlmProvider + ?Sized> LlmProvider for Arc<P> {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).generate(prompt).await
    }
}

/// One scripted mock reply
#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error(String),
}

#[derive(Debug, Default)]
struct MockState {
    queue: VecDeque<MockReply>,
    prompts: Vec<String>,
}

/// Mock LLM provider for deterministic testing
///
/// Replies are served from a FIFO queue; once it is empty every call gets the
/// default response. Clones share the queue and the call log.
///
/// # Examples
///
/// ```
/// use vigil_llm::{LlmProvider, MockProvider};
///
/// let provider = MockProvider::new("fallback");
/// provider.push_response("first");
/// provider.push_error("boom");
///
/// tokio_test::block_on(async {
///     assert_eq!(provider.generate("a").await.unwrap(), "first");
///     assert!(provider.generate("b").await.is_err());
///     assert_eq!(provider.generate("c").await.unwrap(), "fallback");
/// });
/// assert_eq!(provider.call_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed fallback response
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a response for the next unanswered call
    pub fn push_response(&self, response: impl Into<String>) {
        self.state().queue.push_back(MockReply::Text(response.into()));
    }

    /// Queue a failure for the next unanswered call
    pub fn push_error(&self, message: impl Into<String>) {
        self.state().queue.push_back(MockReply::Error(message.into()));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.state().prompts.len()
    }

    /// Every prompt received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.state().prompts.clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("[]")
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let mut state = self.state();
        state.prompts.push(prompt.to_string());
        match state.queue.pop_front() {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Error(msg)) => Err(LlmError::Other(msg)),
            None => Ok(self.default_response.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        assert_eq!(provider.generate("any prompt").await.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_queue_order() {
        let provider = MockProvider::default();
        provider.push_response("one");
        provider.push_response("two");

        assert_eq!(provider.generate("a").await.unwrap(), "one");
        assert_eq!(provider.generate("b").await.unwrap(), "two");
        assert_eq!(provider.generate("c").await.unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let provider = MockProvider::default();
        provider.push_error("bad prompt");

        let result = provider.generate("bad prompt").await;
        assert!(matches!(result, Err(LlmError::Other(_))));
    }

    #[tokio::test]
    async fn test_mock_provider_records_prompts() {
        let provider = MockProvider::new("ok");
        provider.generate("first").await.unwrap();
        provider.generate("second").await.unwrap();

        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.prompts(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();
        provider2.push_response("from clone");

        assert_eq!(provider1.generate("x").await.unwrap(), "from clone");
        assert_eq!(provider2.call_count(), 1);
    }

    #[tokio::test]
    async fn test_arc_provider_delegates() {
        let provider = Arc::new(MockProvider::new("shared"));
        assert_eq!(provider.generate("x").await.unwrap(), "shared");
        assert_eq!(provider.call_count(), 1);
    }
}
