//! Single paced request: budget check, counter, wait, network call

use reqwest::StatusCode;
use std::sync::Arc;
use tracing::{debug, warn};

use super::http::{HttpReply, HttpTransport};
use super::rate_limit::{RateLimiter, WaitPosition};
use crate::queue::{Response, WorkItem};

/// Result of asking the requester for one item
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// 2xx reply, body attached
    Fetched(Response),
    /// Reply with an error status, or no reply at all
    Failed(Response),
    /// Budget exhausted, nothing was sent
    LimitReached,
}

pub struct Requester {
    transport: Arc<dyn HttpTransport>,
    rate_limiter: Option<RateLimiter>,
    request_limit: Option<u64>,
    request_count: u64,
}

impl Requester {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        rate_limiter: Option<RateLimiter>,
        request_limit: Option<u64>,
    ) -> Self {
        Self {
            transport,
            rate_limiter,
            request_limit,
            request_count: 0,
        }
    }

    /// Start counting from requests already spent elsewhere today
    pub fn with_request_count(mut self, count: u64) -> Self {
        self.request_count = count;
        self
    }

    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    pub fn request_limit(&self) -> Option<u64> {
        self.request_limit
    }

    pub fn limit_reached(&self) -> bool {
        self.request_limit
            .is_some_and(|limit| self.request_count >= limit)
    }

    pub async fn fetch(&mut self, item: &WorkItem) -> FetchOutcome {
        if self.limit_reached() {
            debug!(
                count = self.request_count,
                limit = ?self.request_limit,
                "Request limit reached"
            );
            return FetchOutcome::LimitReached;
        }

        self.request_count += 1;

        self.pause(WaitPosition::Before).await;
        let result = self
            .transport
            .get(&item.url, &item.params, item.payload.as_ref())
            .await;
        self.pause(WaitPosition::After).await;

        match result {
            Ok(reply) if reply.is_success() => {
                FetchOutcome::Fetched(Response::ok(item.clone(), reply.body))
            }
            Ok(HttpReply { status, body }) => {
                let error = status_error(status);
                warn!(url = %item.url, status, "Request returned error status");
                FetchOutcome::Failed(Response::failed(item.clone(), body, error))
            }
            Err(e) => {
                warn!(url = %item.url, error = %e, "Request failed");
                FetchOutcome::Failed(Response::failed(item.clone(), "", e.to_string()))
            }
        }
    }

    async fn pause(&self, position: WaitPosition) {
        let limiter = self
            .rate_limiter
            .filter(|limiter| limiter.wait_position() == position);
        if let Some(limiter) = limiter {
            tokio::time::sleep(limiter.interval()).await;
        }
    }
}

fn status_error(status: u16) -> String {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown Status");
    format!("HTTP {}: {}", status, reason)
}
