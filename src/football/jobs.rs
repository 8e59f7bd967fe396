//! Process-level jobs: wire a downloader from configuration and run it

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

use super::{response_handler, schedule_request};
use crate::config::Config;
use crate::ledger::FjallLedger;
use crate::storage::StorageClient;
use crate::worker::{DownloadError, Downloader, ReqwestTransport, RunReport};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Reports of the two phases of an ongoing run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OngoingReport {
    pub backlog: RunReport,
    /// `None` when the backlog already exhausted the daily limit
    pub seed: Option<RunReport>,
}

/// Open the ledger, storage and HTTP client described by `config`
pub fn build_downloader(config: &Config, namespace: &str) -> Result<Downloader, AnyError> {
    if config.api.key.is_none() {
        warn!("API_FOOTBALL_KEY is not set, requests will be unauthenticated");
    }

    let ledger = Arc::new(FjallLedger::open(&config.ledger.path)?);
    let transport = Arc::new(ReqwestTransport::new(&config.http_config())?);
    let blobs = Arc::new(StorageClient::from_config(&config.storage)?);
    let handler = response_handler(&config.api.base_url, config.leagues.allowed.iter().copied());

    let downloader = Downloader::builder()
        .namespace(namespace)
        .ledger(ledger)
        .transport(transport)
        .handler(handler)
        .blobs(blobs)
        .maybe_rate_limiter(config.rate_limiter()?)
        .maybe_request_limit(config.limits.daily_request_limit)
        .build()?;

    Ok(downloader)
}

/// Fetch the schedule for `date` and everything it expands to
pub async fn run_for_date(
    downloader: &mut Downloader,
    base_url: &str,
    date: NaiveDate,
) -> Result<RunReport, DownloadError> {
    info!(namespace = downloader.namespace(), %date, "Starting download");
    downloader.download_one(schedule_request(base_url, date)).await
}

/// Finish the namespace's backlog, then seed `date` if budget remains
pub async fn run_ongoing(
    downloader: &mut Downloader,
    base_url: &str,
    date: NaiveDate,
) -> Result<OngoingReport, DownloadError> {
    info!(namespace = downloader.namespace(), %date, "Resuming backlog");
    let backlog = downloader.download_backlog().await?;

    if backlog.is_blocked() {
        info!(%date, "Daily limit reached during backlog, not seeding");
        return Ok(OngoingReport {
            backlog,
            seed: None,
        });
    }

    let seed = run_for_date(downloader, base_url, date).await?;
    Ok(OngoingReport {
        backlog,
        seed: Some(seed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageProvider;
    use tempfile::TempDir;

    #[test]
    fn test_build_downloader_from_config() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.ledger.path = temp_dir.path().join("ledger");
        config.storage.provider = StorageProvider::Memory;

        let downloader = build_downloader(&config, "ongoing").unwrap();
        assert_eq!(downloader.namespace(), "ongoing");
        assert_eq!(downloader.request_count(), 0);
        assert_eq!(downloader.queue_len(), 0);
    }

    #[test]
    fn test_build_downloader_rejects_bad_namespace() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.ledger.path = temp_dir.path().join("ledger");
        config.storage.provider = StorageProvider::Memory;

        assert!(build_downloader(&config, "").is_err());
    }
}
