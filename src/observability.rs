//! Tracing setup and in-process run counters

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber, `RUST_LOG` overrides the `info` default
///
/// `.env` is loaded first so a `RUST_LOG` kept there applies too.
pub fn init_tracing() {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A second call (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    requests_sent: AtomicU64,
    items_succeeded: AtomicU64,
    items_failed: AtomicU64,
    items_enqueued: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_sent(&self) {
        self.requests_sent.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "requests_sent", "Metric incremented");
    }

    pub fn item_succeeded(&self) {
        self.items_succeeded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "items_succeeded", "Metric incremented");
    }

    pub fn item_failed(&self) {
        self.items_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "items_failed", "Metric incremented");
    }

    pub fn items_enqueued(&self, count: usize) {
        self.items_enqueued.fetch_add(count as u64, Ordering::Relaxed);
        tracing::trace!(counter = "items_enqueued", count, "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_sent: self.requests_sent.load(Ordering::Relaxed),
            items_succeeded: self.items_succeeded.load(Ordering::Relaxed),
            items_failed: self.items_failed.load(Ordering::Relaxed),
            items_enqueued: self.items_enqueued.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests_sent: u64,
    pub items_succeeded: u64,
    pub items_failed: u64,
    pub items_enqueued: u64,
}

impl MetricsSnapshot {
    /// Counters accumulated since `earlier`
    pub fn since(&self, earlier: &MetricsSnapshot) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_sent: self.requests_sent - earlier.requests_sent,
            items_succeeded: self.items_succeeded - earlier.items_succeeded,
            items_failed: self.items_failed - earlier.items_failed,
            items_enqueued: self.items_enqueued - earlier.items_enqueued,
        }
    }
}
