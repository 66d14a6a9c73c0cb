//! Configuration for route resolution

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default transit API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.rasp.yandex.net/v3.0/";

/// Configuration for the transit service and ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Transit API base URL, ending in `/`
    pub base_url: String,

    /// Response language for the directory and search
    pub lang: String,

    /// Timeout for directory and search calls (seconds)
    pub timeout_secs: u64,

    /// Options offered for a direct trip
    pub max_options: usize,

    /// Candidates ranked per leg of a multi-stop trip
    pub leg_candidates: usize,
}

impl RoutesConfig {
    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.max_options == 0 {
            return Err("max_options must be greater than 0".to_string());
        }
        if self.leg_candidates == 0 {
            return Err("leg_candidates must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            lang: "ru_RU".to_string(),
            timeout_secs: 20,
            max_options: 4,
            leg_candidates: 3,
        }
    }
}
