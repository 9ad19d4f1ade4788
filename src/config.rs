//! Layered application settings: built-in defaults, an optional TOML file,
//! then `PYLIB_FINDER__SECTION__KEY` environment variables.

use crate::{
    DEFAULT_API_URL, DEFAULT_SERVER_PORT, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, MAX_KEYWORDS,
    MAX_RECOMMENDATIONS, RESOLVER_CONCURRENCY,
};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

const ENV_PREFIX: &str = "PYLIB_FINDER";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 3] = ["pretty", "compact", "json"];

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub pypi: PypiConfig,
    pub recommendations: RecommendationConfig,
}

/// `[server]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds before an API request is answered with 408
    pub request_timeout: u64,
    pub enable_cors: bool,
    pub enable_tracing: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_SERVER_PORT,
            request_timeout: 30,
            enable_cors: true,
            enable_tracing: true,
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error
    pub level: String,
    /// One of pretty, compact, json
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// `[pypi]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PypiConfig {
    /// JSON API root; package documents live at `{api_url}/{name}/json`
    pub api_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for PypiConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `[recommendations]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Keywords taken from metadata before resolution
    pub max_keywords: usize,
    /// Maximum number of recommended packages
    pub max_results: usize,
    /// Keyword resolutions allowed in flight at once
    pub concurrency: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            max_keywords: MAX_KEYWORDS,
            max_results: MAX_RECOMMENDATIONS,
            concurrency: RESOLVER_CONCURRENCY,
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file(None::<&Path>)
    }

    /// Defaults, then `config_file` if it exists, then the environment
    pub fn load_from_file<P: AsRef<Path>>(config_file: Option<P>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        let config_file: Option<&Path> = config_file.as_ref().map(|p| p.as_ref());
        match config_file {
            Some(path) if path.exists() => {
                info!("Loading configuration from: {}", path.display());
                builder = builder.add_source(File::from(path));
            }
            Some(path) => debug!("No configuration file at {}", path.display()),
            None => {}
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Check value ranges; the message names the first offending setting
    pub fn validate(&self) -> Result<(), String> {
        let checks = [
            (self.server.port != 0, "Server port cannot be 0".to_string()),
            (
                self.server.request_timeout != 0,
                "Server request timeout cannot be 0".to_string(),
            ),
            (
                LOG_LEVELS.contains(&self.logging.level.as_str()),
                format!("Invalid log level: {}", self.logging.level),
            ),
            (
                LOG_FORMATS.contains(&self.logging.format.as_str()),
                format!("Invalid log format: {}", self.logging.format),
            ),
            (
                self.pypi.timeout_seconds != 0,
                "PyPI timeout cannot be 0".to_string(),
            ),
            (
                self.pypi.api_url.starts_with("http://")
                    || self.pypi.api_url.starts_with("https://"),
                format!("Invalid PyPI API URL: {}", self.pypi.api_url),
            ),
            (
                self.recommendations.max_results != 0,
                "Recommendation max_results cannot be 0".to_string(),
            ),
            (
                self.recommendations.max_results <= MAX_RECOMMENDATIONS,
                format!(
                    "Recommendation max_results cannot exceed {}",
                    MAX_RECOMMENDATIONS
                ),
            ),
            (
                self.recommendations.max_keywords <= MAX_KEYWORDS,
                format!("Recommendation max_keywords cannot exceed {}", MAX_KEYWORDS),
            ),
            (
                self.recommendations.concurrency != 0,
                "Recommendation concurrency cannot be 0".to_string(),
            ),
        ];

        match checks.into_iter().find(|(ok, _)| !ok) {
            Some((_, message)) => Err(message),
            None => Ok(()),
        }
    }

    /// Default configuration rendered as TOML
    pub fn create_sample_config() -> String {
        toml::to_string_pretty(&AppConfig::default())
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Deployment environment read from `RUST_ENV` (or `ENVIRONMENT`);
/// `Other` when neither is set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnvironment {
    Development,
    Production,
    Test,
    Other,
}

impl RuntimeEnvironment {
    pub fn detect() -> Self {
        std::env::var("RUST_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .map(|name| Self::from_name(&name))
            .unwrap_or(Self::Other)
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            "production" | "prod" => Self::Production,
            "test" | "testing" => Self::Test,
            _ => Self::Other,
        }
    }

    /// Adjust logging and server settings for this environment
    pub fn apply_overrides(self, config: &mut AppConfig) {
        match self {
            Self::Development => config.logging.level = "debug".to_string(),
            Self::Production => {
                config.logging.level = "info".to_string();
                config.logging.format = "json".to_string();
            }
            Self::Test => {
                config.logging.level = "warn".to_string();
                config.server.enable_cors = false;
            }
            Self::Other => {}
        }
    }
}
