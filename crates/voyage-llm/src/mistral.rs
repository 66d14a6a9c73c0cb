//! Mistral Provider Implementation
//!
//! Provides integration with Mistral-compatible chat completion APIs.
//!
//! # Features
//!
//! - Blocking HTTP communication with the chat completions endpoint
//! - Configurable endpoint, model, temperature and token budget
//! - Timeout handling
//! - Structured errors: HTTP 429 maps to [`LlmError::RateLimited`] with the
//!   provider's `Retry-After` hint, 401 to [`LlmError::MissingCredential`]
//!
//! The provider makes exactly one HTTP call per `generate`. Retrying on a
//! rate limit is the caller's decision.
//!
//! # Examples
//!
//! ```no_run
//! use voyage_llm::MistralProvider;
//! use voyage_domain::traits::LlmProvider;
//!
//! let provider = MistralProvider::new(
//!     "https://api.mistral.ai/v1/chat/completions",
//!     Some("secret".to_string()),
//!     "mistral-large-latest",
//! )
//! .unwrap();
//! let text = provider.generate("Say hello").unwrap();
//! ```

use crate::LlmError;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};
use voyage_domain::traits::LlmProvider as LlmProviderTrait;

/// Default chat completions endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.mistral.ai/v1/chat/completions";

/// Default model
pub const DEFAULT_MODEL: &str = "mistral-large-latest";

/// Default timeout for LLM requests (15 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Default completion budget
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Chat completions provider
pub struct MistralProvider {
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

impl MistralProvider {
    /// Create a new provider with the default timeout
    ///
    /// An absent or blank `api_key` is accepted; the provider then reports
    /// itself unconfigured and every call fails with `MissingCredential`.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        Self::with_timeout(
            endpoint,
            api_key,
            model,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a new provider with an explicit request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            client,
        })
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the completion token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn complete(&self, api_key: &str, prompt: &str) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending chat completion");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Communication(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if status.is_success() {
            let body: ChatResponse = response
                .json()
                .map_err(|e| {
                    LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                })?;
            return body
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .ok_or_else(|| LlmError::InvalidResponse("Response has no choices".to_string()));
        }

        match status {
            StatusCode::TOO_MANY_REQUESTS => Err(LlmError::RateLimited {
                retry_after: retry_after(response.headers()),
            }),
            StatusCode::UNAUTHORIZED => Err(LlmError::MissingCredential),
            StatusCode::NOT_FOUND => Err(LlmError::ModelNotAvailable(self.model.clone())),
            _ => {
                let error_text = response
                    .text()
                    .unwrap_or_else(|_| "Unknown error".to_string());
                error!(%status, "Chat completion failed");
                Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)))
            }
        }
    }
}

/// Parse a `Retry-After` header given in whole seconds
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

impl LlmProviderTrait for MistralProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingCredential)?;
        self.complete(api_key, prompt)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
