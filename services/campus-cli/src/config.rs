//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! Account credentials are read from CAMPUS_STUDENT_ID / CAMPUS_PASSWORD
//! environment variables, never stored in the TOML, to avoid leaking
//! secrets.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use campus_gateway::ClientOptions;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Remote API settings
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Durable session settings
#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    /// Directory holding the auth_tokens/auth_user entries
    pub storage_dir: PathBuf,
    #[serde(default = "default_refresh_margin")]
    pub refresh_margin_secs: u64,
}

/// Response cache settings
#[derive(Debug, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl")]
    pub default_ttl_secs: u64,
}

/// Telemetry ring buffer caps
#[derive(Debug, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_performance_capacity")]
    pub performance_capacity: usize,
    #[serde(default = "default_error_capacity")]
    pub error_capacity: usize,
}

fn default_timeout() -> u64 {
    30
}

fn default_refresh_margin() -> u64 {
    300
}

fn default_cache_ttl() -> u64 {
    60
}

fn default_performance_capacity() -> usize {
    100
}

fn default_error_capacity() -> usize {
    50
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_cache_ttl(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            performance_capacity: default_performance_capacity(),
            error_capacity: default_error_capacity(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;

        if !config.api.base_url.starts_with("http://")
            && !config.api.base_url.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                config.api.base_url
            )));
        }

        if config.api.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if config.telemetry.performance_capacity == 0 || config.telemetry.error_capacity == 0 {
            return Err(common::Error::Config(
                "telemetry capacities must be greater than 0".into(),
            ));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("campus-cli.toml")
    }

    /// Gateway client options derived from this config.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: Duration::from_secs(self.api.timeout_secs),
            performance_capacity: self.telemetry.performance_capacity,
            error_capacity: self.telemetry.error_capacity,
            default_cache_ttl: Duration::from_secs(self.cache.default_ttl_secs),
        }
    }

    /// Refresh margin as a duration.
    pub fn refresh_margin(&self) -> Duration {
        Duration::from_secs(self.session.refresh_margin_secs)
    }
}
