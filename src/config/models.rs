use crate::humanize::HumanDuration;
use crate::worker::WaitPosition;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub leagues: LeaguesConfig,
}

/// Upstream API endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Value of the `x-rapidapi-host` header
    #[serde(default = "default_api_host")]
    pub host: String,
    /// API key (loaded from environment, not from config file)
    #[serde(skip)]
    pub key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            host: default_api_host(),
            key: None,
        }
    }
}

fn default_base_url() -> String {
    "https://api-football-v1.p.rapidapi.com/v3".to_string()
}

fn default_api_host() -> String {
    "api-football-v1.p.rapidapi.com".to_string()
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpSettings {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: HumanDuration,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_connect_timeout() -> HumanDuration {
    HumanDuration::from_secs(10)
}

fn default_request_timeout() -> HumanDuration {
    HumanDuration::from_secs(60)
}

fn default_user_agent() -> String {
    concat!("statfetch/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Request pacing and daily budget
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// `None` disables pacing
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimitSettings>,
    /// `None` disables the daily ceiling; set `false` or `"off"` to get it
    /// from a file or the environment
    #[serde(
        default = "default_daily_request_limit",
        deserialize_with = "deserialize_request_limit"
    )]
    pub daily_request_limit: Option<u64>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            rate_limit: default_rate_limit(),
            daily_request_limit: default_daily_request_limit(),
        }
    }
}

/// Allowed events per unit, e.g. 30 per minute
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitSettings {
    pub count: u32,
    #[serde(default = "default_rate_limit_unit")]
    pub unit: String,
    #[serde(default)]
    pub wait: WaitPosition,
}

fn default_rate_limit() -> Option<RateLimitSettings> {
    Some(RateLimitSettings {
        count: 30,
        unit: default_rate_limit_unit(),
        wait: WaitPosition::default(),
    })
}

fn default_rate_limit_unit() -> String {
    "minute".to_string()
}

fn default_daily_request_limit() -> Option<u64> {
    Some(100)
}

/// A count, or an explicit switch-off
fn deserialize_request_limit<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Limit {
        Count(u64),
        Switch(bool),
        Text(String),
    }

    match Limit::deserialize(deserializer)? {
        Limit::Count(count) => Ok(Some(count)),
        Limit::Switch(false) => Ok(None),
        Limit::Switch(true) => Ok(default_daily_request_limit()),
        Limit::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "unlimited" | "false" => Ok(None),
            other => other.parse().map(Some).map_err(|_| {
                serde::de::Error::custom(format!(
                    "invalid daily_request_limit '{}', expected a count or \"off\"",
                    text
                ))
            }),
        },
    }
}

/// Ledger location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
    #[serde(default = "default_ledger_path")]
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
        }
    }
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("data/ledger")
}

/// Storage provider type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Memory,
    #[default]
    Local,
    S3,
}

/// Blob storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub provider: StorageProvider,
    /// Root directory for the `local` provider
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Prepended to every blob key, e.g. `football/raw`
    pub key_prefix: Option<String>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
    /// S3 access key (loaded from environment, not from config file)
    #[serde(skip)]
    pub access_key: Option<String>,
    /// S3 secret key (loaded from environment, not from config file)
    #[serde(skip)]
    pub secret_key: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProvider::Local,
            root: default_storage_root(),
            bucket: default_bucket(),
            key_prefix: None,
            endpoint: None,
            region: None,
            access_key: None,
            secret_key: None,
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("data/blobs")
}

fn default_bucket() -> String {
    "statfetch-raw".to_string()
}

/// League allow-list for fixture expansion
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LeaguesConfig {
    #[serde(default = "default_leagues")]
    pub allowed: Vec<u64>,
}

impl Default for LeaguesConfig {
    fn default() -> Self {
        Self {
            allowed: default_leagues(),
        }
    }
}

/// Premier League, La Liga, Bundesliga, Serie A, Ligue 1
fn default_leagues() -> Vec<u64> {
    vec![39, 140, 78, 135, 61]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(
            config.api.base_url,
            "https://api-football-v1.p.rapidapi.com/v3"
        );
        assert_eq!(config.http.connect_timeout.as_duration(), Duration::from_secs(10));
        assert_eq!(config.limits.daily_request_limit, Some(100));
        assert_eq!(config.limits.rate_limit.as_ref().map(|r| r.count), Some(30));
        assert_eq!(config.ledger.path, PathBuf::from("data/ledger"));
        assert_eq!(config.storage.provider, StorageProvider::Local);
        assert_eq!(config.leagues.allowed, vec![39, 140, 78, 135, 61]);
    }

    #[test]
    fn test_daily_request_limit_switch_off() {
        for value in ["false", "\"off\"", "\"none\""] {
            let config: Config =
                toml::from_str(&format!("[limits]\ndaily_request_limit = {}", value)).unwrap();
            assert_eq!(config.limits.daily_request_limit, None, "value {value}");
        }

        let config: Config = toml::from_str("[limits]\ndaily_request_limit = \"250\"").unwrap();
        assert_eq!(config.limits.daily_request_limit, Some(250));

        let config: Config = toml::from_str("[limits]").unwrap();
        assert_eq!(config.limits.daily_request_limit, Some(100));

        assert!(toml::from_str::<Config>("[limits]\ndaily_request_limit = \"lots\"").is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[limits]
daily_request_limit = 7

[limits.rate_limit]
count = 5
unit = "seconds"
wait = "after"

[storage]
provider = "memory"
        "#,
        )
        .unwrap();

        assert_eq!(config.limits.daily_request_limit, Some(7));
        assert_eq!(
            config.limits.rate_limit,
            Some(RateLimitSettings {
                count: 5,
                unit: "seconds".to_string(),
                wait: WaitPosition::After,
            })
        );
        assert_eq!(config.storage.provider, StorageProvider::Memory);
        assert_eq!(config.storage.bucket, "statfetch-raw");
        assert_eq!(config.api.host, "api-football-v1.p.rapidapi.com");
    }
}
