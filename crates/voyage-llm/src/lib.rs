//! Voyage LLM Provider Layer
//!
//! Pluggable LLM provider implementations and the process-wide rate limiter
//! that guards them.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LlmProvider` trait from `voyage-domain`.
//! It supports multiple LLM backends with a common interface. Provider errors
//! are structured: a throttled call surfaces as [`LlmError::RateLimited`], so
//! callers never have to inspect error text.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `MistralProvider`: Mistral-compatible chat completions over HTTP
//!
//! # Examples
//!
//! ```
//! use voyage_llm::MockProvider;
//! use voyage_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt").unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod mistral;
pub mod rate_limit;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use voyage_domain::traits::LlmProvider as LlmProviderTrait;

pub use mistral::MistralProvider;
pub use rate_limit::RateLimiter;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider throttled the call (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimited {
        /// Back-off suggested by the provider, if it sent one
        retry_after: Option<Duration>,
    },

    /// Request did not complete within the client timeout
    #[error("Request timed out")]
    Timeout,

    /// No API key configured
    #[error("API credential not configured")]
    MissingCredential,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Invalid provider or limiter configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Scripted outcome of one `MockProvider` call
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Return this completion text
    Respond(String),
    /// Fail with this error
    Fail(LlmError),
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network calls.
/// Scripted outcomes queued with [`MockProvider::push_outcome`] are consumed first,
/// in order; after that, per-prompt responses and finally the default response apply.
///
/// # Examples
///
/// ```
/// use voyage_llm::{LlmError, MockProvider};
/// use voyage_domain::traits::LlmProvider;
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.generate("any prompt").unwrap(), "Fixed response");
///
/// // Throttle once, then answer
/// let provider = MockProvider::new("{}");
/// provider.push_error(LlmError::RateLimited { retry_after: None });
/// assert!(provider.generate("p").is_err());
/// assert_eq!(provider.generate("p").unwrap(), "{}");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    script: Arc<Mutex<VecDeque<MockOutcome>>>,
    call_count: Arc<Mutex<usize>>,
    always_fail: Option<LlmError>,
    configured: bool,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
            always_fail: None,
            configured: true,
        }
    }

    /// A provider that reports missing credentials, like an HTTP provider without an API key
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::default()
        }
    }

    /// A provider whose every call fails with the given error
    pub fn failing(error: LlmError) -> Self {
        Self {
            always_fail: Some(error),
            ..Self::default()
        }
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), response.into());
    }

    /// Queue a scripted outcome for the next unscripted call
    pub fn push_outcome(&self, outcome: MockOutcome) {
        lock(&self.script).push_back(outcome);
    }

    /// Queue a successful completion
    pub fn push_response(&self, response: impl Into<String>) {
        self.push_outcome(MockOutcome::Respond(response.into()));
    }

    /// Queue a failure
    pub fn push_error(&self, error: LlmError) {
        self.push_outcome(MockOutcome::Fail(error));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        *lock(&self.call_count) += 1;

        if let Some(error) = &self.always_fail {
            return Err(error.clone());
        }

        if let Some(outcome) = lock(&self.script).pop_front() {
            return match outcome {
                MockOutcome::Respond(text) => Ok(text),
                MockOutcome::Fail(error) => Err(error),
            };
        }

        if let Some(response) = lock(&self.responses).get(prompt) {
            return Ok(response.clone());
        }

        Ok(self.default_response.clone())
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("any prompt");
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate("hello").unwrap(), "world");
        assert_eq!(provider.generate("foo").unwrap(), "bar");
        assert_eq!(provider.generate("unknown").unwrap(), "Default mock response");
    }

    #[test]
    fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");

        assert_eq!(provider.call_count(), 0);

        provider.generate("prompt1").unwrap();
        assert_eq!(provider.call_count(), 1);

        provider.generate("prompt2").unwrap();
        assert_eq!(provider.call_count(), 2);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_script_runs_in_order() {
        let provider = MockProvider::new("default");
        provider.push_error(LlmError::RateLimited {
            retry_after: Some(Duration::from_secs(1)),
        });
        provider.push_response("scripted");

        assert!(matches!(
            provider.generate("p"),
            Err(LlmError::RateLimited { .. })
        ));
        assert_eq!(provider.generate("p").unwrap(), "scripted");
        assert_eq!(provider.generate("p").unwrap(), "default");
    }

    #[test]
    fn test_failing_provider_never_recovers() {
        let provider = MockProvider::failing(LlmError::Timeout);
        provider.push_response("ignored");

        for _ in 0..3 {
            assert_eq!(provider.generate("p"), Err(LlmError::Timeout));
        }
        assert_eq!(provider.call_count(), 3);
    }

    #[test]
    fn test_mock_provider_unconfigured() {
        assert!(!MockProvider::unconfigured().is_configured());
        assert!(MockProvider::default().is_configured());
    }

    #[test]
    fn test_mock_provider_clone() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate("test").unwrap();

        // Both should share the same call count due to Arc
        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
