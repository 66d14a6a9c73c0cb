//! Error types for the extraction pipeline

use thiserror::Error;
use voyage_llm::LlmError;

/// Failures of the primary (LLM-backed) extraction path
///
/// These never leave the crate's `EntityExtractor`: each one triggers the
/// fallback extractor instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionServiceError {
    /// No API credential configured
    #[error("Extraction service credential not configured")]
    MissingCredential,

    /// Still failing after the single rate-limit retry
    #[error("Extraction service rate limit retry exhausted: {0}")]
    RateLimitExhausted(String),

    /// Network or HTTP failure
    #[error("Extraction service transport error: {0}")]
    Transport(String),

    /// Response was not the expected JSON object
    #[error("Malformed extraction response: {0}")]
    MalformedResponse(String),

    /// Extraction call timed out
    #[error("Extraction service timeout")]
    Timeout,
}

impl From<LlmError> for ExtractionServiceError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::MissingCredential => ExtractionServiceError::MissingCredential,
            LlmError::Timeout => ExtractionServiceError::Timeout,
            LlmError::InvalidResponse(msg) => ExtractionServiceError::MalformedResponse(msg),
            LlmError::RateLimited { .. } => {
                ExtractionServiceError::RateLimitExhausted("rate limited".to_string())
            }
            other => ExtractionServiceError::Transport(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ExtractionServiceError {
    fn from(e: serde_json::Error) -> Self {
        ExtractionServiceError::MalformedResponse(e.to_string())
    }
}
