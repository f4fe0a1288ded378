//! Runtime configuration.
//!
//! Values come from an optional TOML file overlaid with `SECADOR_*`
//! environment variables.

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::source::ApiClient;

pub const DEFAULT_API_URL: &str = "https://api-system.agroflowsystems.com.br";

/// Default configuration file, read from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "secador-monitor.toml";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Telemetry API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Bearer token; skips the login call when set
    #[serde(default)]
    pub token: Option<String>,

    /// Company whose dryer alert configurations are fetched
    #[serde(default)]
    pub empresa: Option<String>,

    /// Refresh interval in seconds
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log file; the terminal belongs to the UI
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_refresh_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "secador-monitor.log".to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            username: String::new(),
            password: String::new(),
            token: None,
            empresa: None,
            refresh_secs: default_refresh_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            log_level: default_log_level(),
            log_file: default_log_file(),
        }
    }
}

impl DashboardConfig {
    /// Load from the environment only.
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("SECADOR"))
            .build()?
            .try_deserialize()
    }

    /// Load from `path` (if it exists) overlaid with the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("SECADOR"))
            .build()?
            .try_deserialize()
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Whether a login call is needed before polling.
    pub fn needs_login(&self) -> bool {
        self.token.as_deref().is_none_or(str::is_empty)
    }

    /// Build an API client from these settings.
    pub fn api_client(&self) -> ApiClient {
        let mut builder = ApiClient::builder()
            .endpoint(&self.api_url)
            .credentials(&self.username, &self.password)
            .timeout(self.request_timeout());
        if let Some(empresa) = &self.empresa {
            builder = builder.empresa(empresa);
        }
        if let Some(token) = &self.token {
            builder = builder.token(token);
        }
        builder.build()
    }
}
