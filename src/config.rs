//! Configuration parsing and validation for gemrelay.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;

/// Default upstream endpoint: the Gemini generateContent API.
pub const DEFAULT_GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-preview-05-20:generateContent";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1:8080")
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// Upstream (Gemini API) configuration.
///
/// The API key value itself never lives in the config file; only the name of
/// the environment variable holding it does. The handler reads the variable
/// once per invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Full URL of the generateContent endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_endpoint() -> String {
    DEFAULT_GEMINI_ENDPOINT.to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// API key wrapper that redacts in Debug/Display/Serialize and zeroizes on drop.
///
/// The inner `SecretString` ensures the key value is:
/// - Zeroized in memory when dropped
/// - Never exposed via Debug or Display
/// - Only accessible via `.expose_secret()` (grep-auditable)
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    /// Access the raw key value. Every call site is auditable via `grep expose_secret`.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }

    /// Resolve the key from the named environment variable.
    ///
    /// Returns None when the variable is unset or holds an empty string --
    /// both count as "no credential configured".
    pub fn from_env(var: &str) -> Option<Self> {
        match std::env::var(var) {
            Ok(value) if !value.is_empty() => Some(ApiKey::from(value)),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Serialize for ApiKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> serde::Deserialize<'de> for ApiKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|s| ApiKey(SecretString::from(s)))
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        ApiKey(SecretString::from(s))
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        ApiKey(SecretString::from(s))
    }
}

impl Config {
    /// Load configuration, falling back to defaults when the file is absent.
    ///
    /// The proxy is usable with zero configuration; the only mandatory input
    /// is the API key environment variable, checked per request.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(
                path = %path.as_ref().display(),
                "Config file not found, using defaults"
            );
            Ok(Config::default())
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source: e,
        })?;

        Self::parse_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.listen.is_empty() {
            return Err(ConfigError::Validation(
                "server.listen must not be empty".to_string(),
            ));
        }

        if self.upstream.endpoint.is_empty() {
            return Err(ConfigError::Validation(
                "upstream.endpoint must not be empty".to_string(),
            ));
        }

        if !self.upstream.endpoint.starts_with("http://")
            && !self.upstream.endpoint.starts_with("https://")
        {
            return Err(ConfigError::Validation(format!(
                "upstream.endpoint must be an http(s) URL, got '{}'",
                self.upstream.endpoint
            )));
        }

        if self.upstream.api_key_env.is_empty() {
            return Err(ConfigError::Validation(
                "upstream.api_key_env must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_empty() {
        let config = Config::parse_str("").unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:8080");
        assert_eq!(config.upstream.endpoint, DEFAULT_GEMINI_ENDPOINT);
        assert_eq!(config.upstream.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_overrides() {
        let config = Config::parse_str(
            r#"
            [server]
            listen = "0.0.0.0:3000"

            [upstream]
            endpoint = "https://example.test/v1beta/models/x:generateContent"
            api_key_env = "MY_KEY"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:3000");
        assert_eq!(
            config.upstream.endpoint,
            "https://example.test/v1beta/models/x:generateContent"
        );
        assert_eq!(config.upstream.api_key_env, "MY_KEY");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn rejects_empty_endpoint() {
        let err = Config::parse_str(
            r#"
            [upstream]
            endpoint = ""
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let err = Config::parse_str(
            r#"
            [upstream]
            endpoint = "ftp://example.test/chat"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_invalid_toml() {
        let err = Config::parse_str("[server").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn api_key_redacts_debug_and_display() {
        let key = ApiKey::from("super-secret");
        assert_eq!(format!("{:?}", key), "[REDACTED]");
        assert_eq!(format!("{}", key), "[REDACTED]");
        assert_eq!(key.expose_secret(), "super-secret");
    }

    #[test]
    fn api_key_redacts_serialize() {
        let key = ApiKey::from("super-secret");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#""[REDACTED]""#);
    }

    #[test]
    fn api_key_from_env_rejects_empty() {
        std::env::set_var("GEMRELAY_TEST_EMPTY_KEY", "");
        assert!(ApiKey::from_env("GEMRELAY_TEST_EMPTY_KEY").is_none());
        assert!(ApiKey::from_env("GEMRELAY_TEST_UNSET_KEY").is_none());

        std::env::set_var("GEMRELAY_TEST_SET_KEY", "abc");
        let key = ApiKey::from_env("GEMRELAY_TEST_SET_KEY").unwrap();
        assert_eq!(key.expose_secret(), "abc");
    }
}
