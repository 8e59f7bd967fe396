use super::models::{Config, StorageProvider};
use crate::worker::TimeUnit;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("API base URL must not be empty")]
    EmptyBaseUrl,

    #[error("API base URL must start with http:// or https://, got '{0}'")]
    InvalidBaseUrl(String),

    #[error("Rate limit count must be positive")]
    ZeroRateLimit,

    #[error("Invalid rate limit unit '{0}', expected second, minute or hour")]
    InvalidRateLimitUnit(String),

    #[error("No leagues configured (at least one league id is required)")]
    NoLeaguesConfigured,

    #[error("Storage provider is S3 but missing credentials (access_key or secret_key)")]
    MissingS3Credentials,

    #[error("Storage bucket must not be empty")]
    EmptyBucket,

    #[error("Timeout must be positive: {field}")]
    ZeroTimeout { field: String },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_api(config)?;
    validate_http(config)?;
    validate_limits(config)?;
    validate_leagues(config)?;
    validate_storage(config)?;
    Ok(())
}

fn validate_api(config: &Config) -> Result<(), ValidationError> {
    let base_url = config.api.base_url.trim();
    if base_url.is_empty() {
        return Err(ValidationError::EmptyBaseUrl);
    }

    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ValidationError::InvalidBaseUrl(base_url.to_string()));
    }

    Ok(())
}

fn validate_http(config: &Config) -> Result<(), ValidationError> {
    let timeouts = [
        ("http.connect_timeout", config.http.connect_timeout),
        ("http.request_timeout", config.http.request_timeout),
    ];

    for (field, timeout) in timeouts {
        if timeout.as_duration().is_zero() {
            return Err(ValidationError::ZeroTimeout {
                field: field.to_string(),
            });
        }
    }

    Ok(())
}

fn validate_limits(config: &Config) -> Result<(), ValidationError> {
    let Some(rate_limit) = &config.limits.rate_limit else {
        return Ok(());
    };

    if rate_limit.count == 0 {
        return Err(ValidationError::ZeroRateLimit);
    }

    if rate_limit.unit.parse::<TimeUnit>().is_err() {
        return Err(ValidationError::InvalidRateLimitUnit(rate_limit.unit.clone()));
    }

    Ok(())
}

fn validate_leagues(config: &Config) -> Result<(), ValidationError> {
    if config.leagues.allowed.is_empty() {
        return Err(ValidationError::NoLeaguesConfigured);
    }

    Ok(())
}

/// Validate storage credentials when provider is S3
fn validate_storage(config: &Config) -> Result<(), ValidationError> {
    if config.storage.provider == StorageProvider::S3 {
        if config.storage.bucket.trim().is_empty() {
            return Err(ValidationError::EmptyBucket);
        }
        if config.storage.access_key.is_none() || config.storage.secret_key.is_none() {
            return Err(ValidationError::MissingS3Credentials);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::models::*;
    use super::*;
    use crate::humanize::HumanDuration;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_base_url() {
        let mut config = Config::default();
        config.api.base_url = "  ".to_string();

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::EmptyBaseUrl)));
    }

    #[test]
    fn test_base_url_scheme() {
        let mut config = Config::default();
        config.api.base_url = "ftp://api.test".to_string();

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_zero_rate_limit() {
        let mut config = Config::default();
        if let Some(rate_limit) = config.limits.rate_limit.as_mut() {
            rate_limit.count = 0;
        }

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::ZeroRateLimit)));
    }

    #[test]
    fn test_invalid_rate_limit_unit() {
        let mut config = Config::default();
        if let Some(rate_limit) = config.limits.rate_limit.as_mut() {
            rate_limit.unit = "days".to_string();
        }

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::InvalidRateLimitUnit(ref unit)) if unit == "days"
        ));
    }

    #[test]
    fn test_no_rate_limit_is_valid() {
        let mut config = Config::default();
        config.limits.rate_limit = None;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_no_leagues() {
        let mut config = Config::default();
        config.leagues.allowed.clear();

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::NoLeaguesConfigured)));
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = Config::default();
        config.http.request_timeout = HumanDuration::from_secs(0);

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::ZeroTimeout { .. })));
    }

    #[test]
    fn test_s3_credentials_missing() {
        let mut config = Config::default();
        config.storage.provider = StorageProvider::S3;
        config.storage.access_key = Some("key".to_string());
        config.storage.secret_key = None;

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::MissingS3Credentials)));
    }

    #[test]
    fn test_s3_with_credentials() {
        let mut config = Config::default();
        config.storage.provider = StorageProvider::S3;
        config.storage.access_key = Some("key".to_string());
        config.storage.secret_key = Some("secret".to_string());

        assert!(validate(&config).is_ok());
    }
}
