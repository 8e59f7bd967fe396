//! Configuration management for statfetch
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use statfetch::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Fetching from: {}", config.api.base_url);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `STATFETCH__<section>__<key>`
//!
//! Examples:
//! - `STATFETCH__LIMITS__DAILY_REQUEST_LIMIT=500`
//! - `STATFETCH__LEDGER__PATH=/var/lib/statfetch/ledger`
//! - `STATFETCH__HTTP__REQUEST_TIMEOUT=30s`
//!
//! Secrets are read only from the environment: `API_FOOTBALL_KEY`,
//! `S3_ACCESS_KEY` / `AWS_ACCESS_KEY_ID`, `S3_SECRET_KEY` / `AWS_SECRET_ACCESS_KEY`.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/statfetch.toml`.
//! This can be overridden using the `STATFETCH_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{
    ApiConfig, Config, HttpSettings, LeaguesConfig, LedgerConfig, LimitsConfig,
    RateLimitSettings, StorageConfig, StorageProvider,
};
pub use validation::ValidationError;

use std::collections::BTreeMap;
use thiserror::Error;

use crate::worker::{HttpConfig, RateLimitError, RateLimiter};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Invalid rate limit: {0}")]
    RateLimit(#[from] RateLimitError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`STATFETCH__*`)
    /// 2. TOML file (default: `config/statfetch.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Build the request pacer, `None` when pacing is disabled
    pub fn rate_limiter(&self) -> Result<Option<RateLimiter>, ConfigError> {
        let Some(settings) = &self.limits.rate_limit else {
            return Ok(None);
        };

        let limiter = RateLimiter::parse(settings.count, &settings.unit)?.with_wait(settings.wait);
        Ok(Some(limiter))
    }

    /// HTTP client settings with the API host and key headers attached
    pub fn http_config(&self) -> HttpConfig {
        let mut default_headers = BTreeMap::new();
        default_headers.insert("x-rapidapi-host".to_string(), self.api.host.clone());
        if let Some(key) = &self.api.key {
            default_headers.insert("x-rapidapi-key".to_string(), key.clone());
        }

        HttpConfig {
            connect_timeout: self.http.connect_timeout.as_duration(),
            request_timeout: self.http.request_timeout.as_duration(),
            user_agent: self.http.user_agent.clone(),
            default_headers,
        }
    }
}
