//! Request pacing: allowed events per unit turned into a minimum interval

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("Invalid unit: {0}. Should be one of: second, minute, hour")]
    InvalidUnit(String),

    #[error("Rate limit count must be positive")]
    ZeroCount,
}

pub type Result<T> = std::result::Result<T, RateLimitError>;

/// Time unit a rate limit is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
}

impl TimeUnit {
    pub fn seconds(self) -> u64 {
        match self {
            TimeUnit::Second => 1,
            TimeUnit::Minute => 60,
            TimeUnit::Hour => 3600,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = RateLimitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "second" | "seconds" => Ok(TimeUnit::Second),
            "minute" | "minutes" => Ok(TimeUnit::Minute),
            "hour" | "hours" => Ok(TimeUnit::Hour),
            _ => Err(RateLimitError::InvalidUnit(s.to_string())),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeUnit::Second => "second",
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
        };
        f.write_str(name)
    }
}

/// Where the mandatory wait sits relative to the network call
///
/// `Before` delays even the first request of a run; `After` lets the first
/// request out immediately and paces the ones that follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitPosition {
    #[default]
    Before,
    After,
}

/// Minimum spacing between two requests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimiter {
    count: u32,
    unit: TimeUnit,
    interval_seconds: f64,
    wait: WaitPosition,
}

impl RateLimiter {
    pub fn new(count: u32, unit: TimeUnit) -> Result<Self> {
        if count == 0 {
            return Err(RateLimitError::ZeroCount);
        }

        Ok(Self {
            count,
            unit,
            interval_seconds: unit.seconds() as f64 / count as f64,
            wait: WaitPosition::default(),
        })
    }

    /// Build from a unit name such as `"minute"`
    pub fn parse(count: u32, unit: &str) -> Result<Self> {
        Self::new(count, unit.parse()?)
    }

    pub fn with_wait(mut self, wait: WaitPosition) -> Self {
        self.wait = wait;
        self
    }

    pub fn interval_seconds(&self) -> f64 {
        self.interval_seconds
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_seconds)
    }

    pub fn wait_position(&self) -> WaitPosition {
        self.wait
    }
}

impl fmt::Display for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.count, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_interval(count: u32, unit: &str, expected: f64) {
        let limiter = RateLimiter::parse(count, unit).unwrap();
        assert!(
            (limiter.interval_seconds() - expected).abs() < 1e-9,
            "{count}/{unit}: expected {expected}, got {}",
            limiter.interval_seconds()
        );
    }

    #[test]
    fn test_interval_per_unit() {
        assert_interval(5, "second", 0.2);
        assert_interval(30, "minute", 2.0);
        assert_interval(100, "hour", 36.0);
    }

    #[test]
    fn test_plural_unit_aliases() {
        assert_interval(5, "seconds", 0.2);
        assert_interval(30, "Minutes", 2.0);
        assert_interval(100, "hours", 36.0);
    }

    #[test]
    fn test_interval_duration() {
        let limiter = RateLimiter::new(30, TimeUnit::Minute).unwrap();
        assert_eq!(limiter.interval(), Duration::from_secs(2));
        assert_eq!(limiter.to_string(), "30/minute");
    }

    #[test]
    fn test_invalid_unit() {
        let result = RateLimiter::parse(10, "days");
        assert_eq!(result, Err(RateLimitError::InvalidUnit("days".to_string())));
    }

    #[test]
    fn test_zero_count() {
        assert_eq!(
            RateLimiter::new(0, TimeUnit::Second),
            Err(RateLimitError::ZeroCount)
        );
    }

    #[test]
    fn test_wait_position_defaults_to_before() {
        let limiter = RateLimiter::new(1, TimeUnit::Second).unwrap();
        assert_eq!(limiter.wait_position(), WaitPosition::Before);

        let limiter = limiter.with_wait(WaitPosition::After);
        assert_eq!(limiter.wait_position(), WaitPosition::After);
    }
}
