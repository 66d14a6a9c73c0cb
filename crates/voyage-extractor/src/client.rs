//! Primary extraction path: one rate-limited LLM call per turn

use crate::config::ExtractorConfig;
use crate::error::ExtractionServiceError;
use crate::parser::parse_llm_response;
use crate::prompt::PromptBuilder;
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};
use voyage_domain::traits::LlmProvider;
use voyage_domain::{EntityUpdate, TravelEntities};
use voyage_llm::{LlmError, RateLimiter};

/// Calls the extraction service under the shared rate limiter
///
/// A rate-limited call is retried exactly once, after the provider's
/// `Retry-After` hint (capped by `max_retry_after_secs`) or the configured
/// throttle.
pub struct ExtractionClient<L>
where
    L: LlmProvider<Error = LlmError>,
{
    provider: Arc<L>,
    limiter: Arc<RateLimiter>,
    config: ExtractorConfig,
}

impl<L> ExtractionClient<L>
where
    L: LlmProvider<Error = LlmError>,
{
    /// Create a client sharing the process-wide limiter
    pub fn new(provider: Arc<L>, limiter: Arc<RateLimiter>, config: ExtractorConfig) -> Self {
        Self {
            provider,
            limiter,
            config,
        }
    }

    /// Extract slot values from the dialogue transcript
    ///
    /// `dialogue` is every user message seen so far, newline-joined in
    /// arrival order. `current` is what is already known.
    pub fn extract(
        &self,
        dialogue: &str,
        current: &TravelEntities,
    ) -> Result<EntityUpdate, ExtractionServiceError> {
        if !self.provider.is_configured() {
            return Err(ExtractionServiceError::MissingCredential);
        }

        let prompt = PromptBuilder::new(dialogue).with_current(current).build();
        debug!("Prompt length: {} chars", prompt.len());

        let response = match self.call(&prompt) {
            Ok(response) => response,
            Err(LlmError::RateLimited { retry_after }) => {
                let backoff = self.config.retry_backoff(retry_after);
                warn!(
                    backoff_ms = backoff.as_millis() as u64,
                    "Extraction rate limited, retrying once"
                );
                thread::sleep(backoff);
                self.call(&prompt).map_err(|e| {
                    warn!(error = %e, "Extraction retry failed");
                    ExtractionServiceError::RateLimitExhausted(e.to_string())
                })?
            }
            Err(e) => return Err(e.into()),
        };

        debug!("LLM response length: {} chars", response.len());
        parse_llm_response(&response)
    }

    fn call(&self, prompt: &str) -> Result<String, LlmError> {
        self.limiter.acquire();
        self.provider.generate(prompt)
    }
}
