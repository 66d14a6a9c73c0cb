//! Configuration for the extraction pipeline

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the extraction pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Process-wide ceiling on calls to the extraction service (calls per second)
    pub max_rps: f64,

    /// Back-off before the single retry after a rate-limited call, used when
    /// the provider does not say how long to wait (seconds)
    pub throttle_secs: f64,

    /// Maximum time for a single extraction call (seconds)
    pub request_timeout_secs: u64,

    /// Ceiling on a provider `Retry-After` hint before the retry (seconds)
    pub max_retry_after_secs: f64,
}

impl ExtractorConfig {
    /// Get the throttle back-off as a Duration
    pub fn throttle(&self) -> Duration {
        Duration::from_secs_f64(self.throttle_secs)
    }

    /// Back-off before the retry: the provider's hint capped at
    /// `max_retry_after_secs`, or the throttle when there is no hint
    pub fn retry_backoff(&self, retry_after: Option<Duration>) -> Duration {
        let ceiling = Duration::from_secs_f64(self.max_retry_after_secs);
        retry_after.map_or_else(|| self.throttle(), |hint| hint.min(ceiling))
    }

    /// Get the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.max_rps.is_finite() || self.max_rps <= 0.0 {
            return Err("max_rps must be greater than 0".to_string());
        }
        if !self.throttle_secs.is_finite() || self.throttle_secs < 0.0 {
            return Err("throttle_secs must not be negative".to_string());
        }
        if !self.max_retry_after_secs.is_finite() || self.max_retry_after_secs < 0.0 {
            return Err("max_retry_after_secs must not be negative".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_rps: 1.0,
            throttle_secs: 2.0,
            request_timeout_secs: 15,
            max_retry_after_secs: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.throttle(), Duration::from_secs(2));
    }

    #[test]
    fn test_invalid_rate() {
        let mut config = ExtractorConfig::default();
        config.max_rps = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_throttle() {
        let mut config = ExtractorConfig::default();
        config.throttle_secs = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_backoff_is_capped() {
        let config = ExtractorConfig::default();
        assert_eq!(config.retry_backoff(None), Duration::from_secs(2));
        assert_eq!(
            config.retry_backoff(Some(Duration::from_secs(3))),
            Duration::from_secs(3)
        );
        assert_eq!(
            config.retry_backoff(Some(Duration::from_secs(3600))),
            Duration::from_secs(10)
        );

        let mut config = ExtractorConfig::default();
        config.max_retry_after_secs = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ExtractorConfig::from_toml("max_rps = 0.5").unwrap();
        assert_eq!(config.max_rps, 0.5);
        assert_eq!(config.request_timeout_secs, 15);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig {
            max_rps: 4.0,
            throttle_secs: 0.25,
            request_timeout_secs: 5,
            max_retry_after_secs: 30.0,
        };
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
