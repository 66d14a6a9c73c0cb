//! Configuration file parsing for the service.
//!
//! Loads the bind address, LLM endpoint, extraction and routing settings
//! from TOML. API keys are normally left out of the file and supplied
//! through the environment.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use voyage_extractor::ExtractorConfig;
use voyage_llm::mistral::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use voyage_routes::RoutesConfig;

/// Environment variable holding the LLM API key
pub const ENV_LLM_API_KEY: &str = "MISTRAL_API_KEY";
/// Environment variable overriding the LLM endpoint
pub const ENV_LLM_ENDPOINT: &str = "MISTRAL_API_URL";
/// Environment variable overriding the LLM model
pub const ENV_LLM_MODEL: &str = "MISTRAL_MODEL_NAME";
/// Environment variable holding the transit API key
pub const ENV_TRANSIT_API_KEY: &str = "YANDEX_API_KEY";

/// Service configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A section failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// LLM endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat completions endpoint
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// API key; usually set through `MISTRAL_API_KEY`
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }
}

/// Service configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8000)
    pub bind_port: u16,

    /// Idle time after which an unfinished conversation is forgotten (seconds)
    pub session_idle_secs: u64,

    /// LLM endpoint
    pub llm: LlmConfig,

    /// Extraction pipeline
    pub extractor: ExtractorConfig,

    /// Transit service and ranking
    pub routes: RoutesConfig,

    /// Transit API key; usually set through `YANDEX_API_KEY`
    pub transit_api_key: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8000,
            session_idle_secs: 1800,
            llm: LlmConfig::default(),
            extractor: ExtractorConfig::default(),
            routes: RoutesConfig::default(),
            transit_api_key: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Overlay secrets and endpoints from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Overlay values from `lookup`; empty values are ignored
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = get(ENV_LLM_API_KEY) {
            self.llm.api_key = Some(key);
        }
        if let Some(endpoint) = get(ENV_LLM_ENDPOINT) {
            self.llm.endpoint = endpoint;
        }
        if let Some(model) = get(ENV_LLM_MODEL) {
            self.llm.model = model;
        }
        if let Some(key) = get(ENV_TRANSIT_API_KEY) {
            self.transit_api_key = Some(key);
        }
        self
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_idle_secs == 0 {
            return Err(ConfigError::Invalid(
                "session_idle_secs must be greater than 0".to_string(),
            ));
        }
        if self.llm.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.endpoint must not be empty".to_string()));
        }
        self.extractor
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("extractor: {}", e)))?;
        self.routes
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("routes: {}", e)))?;
        Ok(())
    }

    /// Idle session lifetime as a Duration
    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
        assert_eq!(config.llm.model, DEFAULT_MODEL);
        assert_eq!(config.routes.timeout_secs, 20);
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.session_idle(), Duration::from_secs(1800));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_session_idle_is_invalid() {
        let config = ServiceConfig::from_toml("session_idle_secs = 0").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "0.0.0.0"
            bind_port = 9000

            [llm]
            model = "mistral-small-latest"

            [extractor]
            max_rps = 0.5
            throttle_secs = 3.0

            [routes]
            lang = "en_US"
            max_options = 6
        "#;

        let config = ServiceConfig::from_toml(toml).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.llm.model, "mistral-small-latest");
        assert_eq!(config.llm.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.extractor.max_rps, 0.5);
        assert_eq!(config.extractor.request_timeout_secs, 15);
        assert_eq!(config.routes.lang, "en_US");
        assert_eq!(config.routes.max_options, 6);
        assert_eq!(config.routes.leg_candidates, 3);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_port = 8123").unwrap();

        let config = ServiceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.bind_port, 8123);
        assert!(matches!(
            ServiceConfig::from_file("/nonexistent/voyage.toml"),
            Err(ConfigError::FileRead(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_LLM_API_KEY, "llm-secret"),
            (ENV_LLM_MODEL, "mistral-tiny"),
            (ENV_LLM_ENDPOINT, "  "),
            (ENV_TRANSIT_API_KEY, "rasp-secret"),
        ]);
        let config = ServiceConfig::default()
            .with_overrides(|name| env.get(name).map(|value| value.to_string()));

        assert_eq!(config.llm.api_key.as_deref(), Some("llm-secret"));
        assert_eq!(config.llm.model, "mistral-tiny");
        assert_eq!(config.llm.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.transit_api_key.as_deref(), Some("rasp-secret"));
    }

    #[test]
    fn test_invalid_sections_are_reported() {
        let mut config = ServiceConfig::default();
        config.extractor.max_rps = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid(msg)) if msg.starts_with("extractor")
        ));

        let mut config = ServiceConfig::default();
        config.routes.timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid(msg)) if msg.starts_with("routes")
        ));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            ServiceConfig::from_toml("bind_port = \"high\""),
            Err(ConfigError::TomlParse(_))
        ));
    }
}
