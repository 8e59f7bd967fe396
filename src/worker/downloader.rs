//! Queue-draining orchestrator
//!
//! The downloader ties the pieces together for one namespace: every item is
//! persisted before it is queued, fetched through the paced [`Requester`],
//! handed to the [`ResponseHandler`], stored, and finally marked terminal in
//! the ledger. Follow-up items discovered by generators join the back of the
//! queue in the same drain.

use bon::bon;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::http::HttpTransport;
use super::rate_limit::RateLimiter;
use super::requester::{FetchOutcome, Requester};
use crate::handlers::{HandlerError, ResponseHandler};
use crate::ledger::{Ledger, LedgerError};
use crate::observability::Metrics;
use crate::queue::{RequestStatus, Response, WorkItem, WorkQueue};
use crate::storage::{BlobStore, StorageError};

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, DownloadError>;

/// Where the downloader is in its lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Idle,
    Draining,
    /// Queue ran dry
    Empty,
    /// Daily request limit hit; remaining work stays Pending in the ledger
    Blocked,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Draining => "draining",
            RunState::Empty => "empty",
            RunState::Blocked => "blocked",
        };
        f.write_str(name)
    }
}

/// Summary of one drain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// `Empty` or `Blocked`
    pub outcome: RunState,
    pub succeeded: u64,
    pub failed: u64,
    /// Follow-up items discovered and persisted during the drain
    pub enqueued: u64,
    /// Items left in the in-memory queue when the drain stopped
    pub remaining: usize,
}

impl RunReport {
    pub fn is_blocked(&self) -> bool {
        self.outcome == RunState::Blocked
    }
}

pub struct Downloader {
    namespace: String,
    queue: WorkQueue,
    ledger: Arc<dyn Ledger>,
    requester: Requester,
    handler: ResponseHandler,
    blobs: Arc<dyn BlobStore>,
    metrics: Arc<Metrics>,
    state: RunState,
}

#[bon]
impl Downloader {
    /// The request counter starts at the number of items this namespace
    /// already completed today, so a restart does not reset the daily budget.
    #[builder]
    pub fn new(
        #[builder(into)] namespace: String,
        ledger: Arc<dyn Ledger>,
        transport: Arc<dyn HttpTransport>,
        handler: ResponseHandler,
        blobs: Arc<dyn BlobStore>,
        rate_limiter: Option<RateLimiter>,
        request_limit: Option<u64>,
        metrics: Option<Arc<Metrics>>,
    ) -> Result<Self> {
        let completed_today = ledger.count_completed_today(&namespace)?;
        let requester = Requester::new(transport, rate_limiter, request_limit)
            .with_request_count(completed_today);

        info!(
            namespace = %namespace,
            completed_today,
            request_limit = ?request_limit,
            rate_limit = ?rate_limiter.map(|r| r.to_string()),
            "Downloader ready"
        );

        Ok(Self {
            namespace,
            queue: WorkQueue::new(),
            ledger,
            requester,
            handler,
            blobs,
            metrics: metrics.unwrap_or_default(),
            state: RunState::Idle,
        })
    }
}

impl Downloader {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn request_count(&self) -> u64 {
        self.requester.request_count()
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Persist `items` as Pending, then append them to the queue
    pub fn enqueue(&mut self, mut items: Vec<WorkItem>) -> Result<usize> {
        if items.is_empty() {
            return Ok(0);
        }

        self.ledger.persist(&mut items, &self.namespace)?;

        let count = items.len();
        self.metrics.items_enqueued(count);
        self.queue.extend(items);
        debug!(count, queued = self.queue.len(), "Items enqueued");

        Ok(count)
    }

    /// Enqueue `seed` and drain
    pub async fn download_one(&mut self, seed: WorkItem) -> Result<RunReport> {
        info!(url = %seed.url, kind = %seed.kind, "Seeding download");
        self.enqueue(vec![seed])?;
        self.drain().await
    }

    /// Load the namespace's Pending rows and drain them
    ///
    /// The in-memory queue is replaced rather than extended: anything still
    /// queued is Pending in the ledger and comes back through the backlog.
    pub async fn download_backlog(&mut self) -> Result<RunReport> {
        let backlog = self.ledger.list_pending(&self.namespace)?;
        info!(namespace = %self.namespace, count = backlog.len(), "Recovered backlog");
        self.queue.replace(backlog);
        self.drain().await
    }

    /// Process queued items until the queue is empty or the limit is reached
    pub async fn drain(&mut self) -> Result<RunReport> {
        let run_id = Uuid::now_v7();
        let span = info_span!("drain", %run_id, namespace = %self.namespace);

        let result = self.drain_queue().instrument(span).await;
        if result.is_err() {
            self.state = RunState::Idle;
        }
        result
    }

    async fn drain_queue(&mut self) -> Result<RunReport> {
        self.state = RunState::Draining;
        let mut report = RunReport::default();
        info!(queued = self.queue.len(), "Drain started");

        while let Some(mut item) = self.queue.pop_front() {
            match self.requester.fetch(&item).await {
                FetchOutcome::LimitReached => {
                    info!(
                        item_id = ?item.id,
                        count = self.requester.request_count(),
                        "Daily request limit reached, stopping"
                    );
                    self.state = RunState::Blocked;
                    break;
                }
                FetchOutcome::Failed(response) => {
                    self.metrics.request_sent();
                    warn!(
                        item_id = ?item.id,
                        url = %item.url,
                        error = response.error.as_deref().unwrap_or_default(),
                        "Fetch failed"
                    );
                    self.complete(&mut item, RequestStatus::Failed)?;
                    report.failed += 1;
                }
                FetchOutcome::Fetched(response) => {
                    self.metrics.request_sent();
                    let status = self.process(&response, &mut report).await?;
                    self.complete(&mut item, status)?;
                    match status {
                        RequestStatus::Succeeded => report.succeeded += 1,
                        _ => report.failed += 1,
                    }
                }
            }
        }

        if self.state != RunState::Blocked {
            self.state = RunState::Empty;
        }

        report.outcome = self.state;
        report.remaining = self.queue.len();

        info!(
            outcome = %report.outcome,
            succeeded = report.succeeded,
            failed = report.failed,
            enqueued = report.enqueued,
            remaining = report.remaining,
            "Drain finished"
        );

        Ok(report)
    }

    /// Parse, store and expand one usable response; returns the terminal status
    async fn process(
        &mut self,
        response: &Response,
        report: &mut RunReport,
    ) -> Result<RequestStatus> {
        let mut handled = match self.handler.handle(response) {
            Ok(handled) => handled,
            Err(e @ HandlerError::NoParser(_)) => {
                return Err(DownloadError::Configuration(e.to_string()));
            }
            Err(e) => {
                warn!(item_id = ?response.item.id, error = %e, "Response rejected");
                return Ok(RequestStatus::Failed);
            }
        };

        self.blobs.put(handled.storage_key(), handled.payload()).await?;

        let children = handled.collect_new_requests();
        report.enqueued += self.enqueue(children)? as u64;

        Ok(RequestStatus::Succeeded)
    }

    fn complete(&mut self, item: &mut WorkItem, status: RequestStatus) -> Result<()> {
        self.ledger.mark_complete(item, status)?;
        match status {
            RequestStatus::Succeeded => self.metrics.item_succeeded(),
            _ => self.metrics.item_failed(),
        }
        debug!(item_id = ?item.id, %status, "Item completed");
        Ok(())
    }
}
