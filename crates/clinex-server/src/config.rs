//! Configuration file parsing for the server.
//!
//! Loads settings from an optional TOML file: bind address, allowed CORS
//! origins, upload limit, and the LLM and extractor tables. The provider API
//! key never lives in the file; it comes from the environment.

use axum::http::HeaderValue;
use clinex_extractor::ExtractorConfig;
use clinex_llm::GroqConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Environment variable holding the provider API key
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Environment variable overriding `bind_address:bind_port`
pub const BIND_ADDR_ENV: &str = "CLINEX_BIND_ADDR";

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// API key not set
    #[error("Set {0} in the environment or a .env file")]
    MissingApiKey(String),

    /// A value failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8000)
    pub bind_port: u16,

    /// Origins allowed to call the API from a browser
    pub allowed_origins: Vec<String>,

    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,

    /// Completion provider settings
    pub llm: GroqConfig,

    /// Pipeline settings
    pub extractor: ExtractorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8000,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            max_upload_bytes: 20 * 1024 * 1024,
            llm: GroqConfig::default(),
            extractor: ExtractorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::Invalid("bind_address must not be empty".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_upload_bytes must be greater than 0".to_string(),
            ));
        }
        for origin in &self.allowed_origins {
            HeaderValue::from_str(origin).map_err(|_| {
                ConfigError::Invalid(format!("allowed origin is not a valid header: {}", origin))
            })?;
        }
        self.llm.validate().map_err(ConfigError::Invalid)?;
        self.extractor.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(BIND_ADDR_ENV) {
            let (host, port) = addr.rsplit_once(':').ok_or_else(|| {
                ConfigError::Invalid(format!("{} must be host:port, got {}", BIND_ADDR_ENV, addr))
            })?;
            self.bind_port = port.parse().map_err(|_| {
                ConfigError::Invalid(format!("{} has an invalid port: {}", BIND_ADDR_ENV, port))
            })?;
            self.bind_address = host.to_string();
        }
        Ok(())
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

/// Read the provider API key using the given lookup
///
/// A missing or blank key is a fatal startup error.
pub fn load_api_key<F>(lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(API_KEY_ENV)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ConfigError::MissingApiKey(API_KEY_ENV.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:3000", "http://127.0.0.1:3000"]
        );
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "0.0.0.0"
            bind_port = 9000
            allowed_origins = ["https://notes.example.org"]
            max_upload_bytes = 1048576

            [llm]
            model = "llama-3.3-70b-versatile"
            request_timeout_secs = 60

            [extractor]
            content_sample_chars = 400
        "#;

        let config = ServerConfig::from_toml(toml).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.allowed_origins, vec!["https://notes.example.org"]);
        assert_eq!(config.max_upload_bytes, 1_048_576);
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.base_url, clinex_llm::groq::DEFAULT_BASE_URL);
        assert_eq!(config.llm.request_timeout_secs, Some(60));
        assert_eq!(config.extractor.content_sample_chars, 400);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(ServerConfig::from_toml("").unwrap(), ServerConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            ServerConfig::from_toml("max_upload_bytes = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ServerConfig::from_toml("allowed_origins = [\"bad\\norigin\"]"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ServerConfig::from_toml("[llm]\ntemperature = 5.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ServerConfig::from_toml("bind_port = \"eighty\""),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinex.toml");
        std::fs::write(&path, "bind_port = 8123\n").unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.bind_port, 8123);

        let missing = ServerConfig::from_file(dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::FileRead(_))));
    }

    #[test]
    fn test_bind_addr_override() {
        let mut config = ServerConfig::default();
        config
            .apply_env_overrides(env(&[(BIND_ADDR_ENV, "0.0.0.0:8080")]))
            .unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");

        let mut config = ServerConfig::default();
        assert!(config
            .apply_env_overrides(env(&[(BIND_ADDR_ENV, "no-port")]))
            .is_err());

        let mut config = ServerConfig::default();
        config.apply_env_overrides(env(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_api_key_required() {
        assert_eq!(
            load_api_key(env(&[(API_KEY_ENV, " gsk_test ")])).unwrap(),
            "gsk_test"
        );
        assert!(matches!(
            load_api_key(env(&[])),
            Err(ConfigError::MissingApiKey(_))
        ));
        assert!(matches!(
            load_api_key(env(&[(API_KEY_ENV, "   ")])),
            Err(ConfigError::MissingApiKey(_))
        ));
    }
}
