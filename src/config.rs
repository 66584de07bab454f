//! Configuration management for TripNavi
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Secrets are never stored in the file; it names the environment variables
//! that hold them.

use crate::error::{AppError, AppResult};
use crate::llm::retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_BACKOFF_MS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Upper bound for every timeout setting, in seconds
const MAX_TIMEOUT_SECONDS: u64 = 300;
/// Upper bound for `llm.max_attempts`
const MAX_LLM_ATTEMPTS: u32 = 5;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub request_log: RequestLogConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_request_timeout() -> u64 {
    90
}

/// Chat-completion service configuration
///
/// Fields are private; values are validated by [`Config::validate`] and read
/// through accessors.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    base_url: String,
    model: String,
    /// Name of the environment variable holding the API key
    api_key_env: String,
    timeout_seconds: u64,
    max_attempts: u32,
    retry_backoff_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_seconds: 60,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

impl LlmConfig {
    /// Get the API base URL (e.g. `https://api.openai.com/v1`)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the model identifier
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the name of the API key environment variable
    pub fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    /// Get the per-attempt timeout in seconds
    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    /// Get the maximum number of attempts per call
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Get the base retry backoff in milliseconds
    pub fn retry_backoff_ms(&self) -> u64 {
        self.retry_backoff_ms
    }

    /// Read the API key from the configured environment variable
    pub fn read_api_key(&self) -> Option<String> {
        read_env(&self.api_key_env)
    }
}

/// Geocoding service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeocodingConfig {
    base_url: String,
    user_agent: String,
    timeout_seconds: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("tripnavi/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_seconds: 10,
        }
    }
}

impl GeocodingConfig {
    /// Get the geocoding service base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the User-Agent sent with lookups
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Get the lookup timeout in seconds
    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

/// Request log (document store) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestLogConfig {
    enabled: bool,
    /// Name of the environment variable holding the MongoDB connection string
    uri_env: String,
    database: String,
    collection: String,
    write_timeout_seconds: u64,
}

impl Default for RequestLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            uri_env: "MONGODB_URI".to_string(),
            database: "tripnavi".to_string(),
            collection: "logs".to_string(),
            write_timeout_seconds: 5,
        }
    }
}

impl RequestLogConfig {
    /// Whether request logging is switched on
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Get the name of the connection string environment variable
    pub fn uri_env(&self) -> &str {
        &self.uri_env
    }

    /// Get the database name
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Get the collection name
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Get the per-write timeout in seconds
    pub fn write_timeout_seconds(&self) -> u64 {
        self.write_timeout_seconds
    }

    /// Read the connection string from the configured environment variable
    pub fn read_uri(&self) -> Option<String> {
        read_env(&self.uri_env)
    }
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn check_timeout(field: &str, value: u64) -> AppResult<()> {
    if value == 0 || value > MAX_TIMEOUT_SECONDS {
        return Err(AppError::Config(format!(
            "{} must be between 1 and {} seconds, got {}",
            field, MAX_TIMEOUT_SECONDS, value
        )));
    }
    Ok(())
}

fn check_http_url(field: &str, value: &str) -> AppResult<()> {
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(AppError::Config(format!(
            "{} must start with 'http://' or 'https://', got '{}'",
            field, value
        )));
    }
    Ok(())
}

fn check_not_blank(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Config(format!("{} cannot be empty", field)));
    }
    Ok(())
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        let config: Self =
            toml::from_str(&content).map_err(|source| AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            })?;

        config
            .validate()
            .map_err(|e| AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Validate configuration after parsing
    ///
    /// Called by `from_file()` and `from_str()`; call it explicitly when
    /// building a Config some other way.
    pub fn validate(&self) -> AppResult<()> {
        check_not_blank("server.host", &self.server.host)?;
        if self.server.port == 0 {
            return Err(AppError::Config(
                "server.port must be greater than 0".to_string(),
            ));
        }
        check_timeout(
            "server.request_timeout_seconds",
            self.server.request_timeout_seconds,
        )?;

        check_not_blank("llm.base_url", &self.llm.base_url)?;
        check_http_url("llm.base_url", &self.llm.base_url)?;
        check_not_blank("llm.model", &self.llm.model)?;
        check_not_blank("llm.api_key_env", &self.llm.api_key_env)?;
        check_timeout("llm.timeout_seconds", self.llm.timeout_seconds)?;
        if self.llm.max_attempts == 0 || self.llm.max_attempts > MAX_LLM_ATTEMPTS {
            return Err(AppError::Config(format!(
                "llm.max_attempts must be between 1 and {}, got {}",
                MAX_LLM_ATTEMPTS, self.llm.max_attempts
            )));
        }

        check_http_url("geocoding.base_url", &self.geocoding.base_url)?;
        check_not_blank("geocoding.user_agent", &self.geocoding.user_agent)?;
        check_timeout("geocoding.timeout_seconds", self.geocoding.timeout_seconds)?;

        check_not_blank("request_log.uri_env", &self.request_log.uri_env)?;
        check_not_blank("request_log.database", &self.request_log.database)?;
        check_not_blank("request_log.collection", &self.request_log.collection)?;
        check_timeout(
            "request_log.write_timeout_seconds",
            self.request_log.write_timeout_seconds,
        )?;

        Ok(())
    }
}

impl FromStr for Config {
    type Err = AppError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config =
            toml::from_str(toml_str).map_err(|source| AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }
}
