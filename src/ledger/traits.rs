use chrono::{NaiveDate, Utc};

use crate::queue::{RequestStatus, WorkItem};

use super::error::Result;

/// Durable record of every work item and its status
///
/// The downloader only ever talks to this trait, so any store able to answer
/// these four questions per namespace can back it.
pub trait Ledger: Send + Sync {
    /// Insert `items` as Pending rows, writing the assigned id, namespace and
    /// timestamps back into each item
    fn persist(&self, items: &mut [WorkItem], namespace: &str) -> Result<()>;

    /// All rows still Pending for `namespace`, oldest first
    fn list_pending(&self, namespace: &str) -> Result<Vec<WorkItem>>;

    /// Number of rows of `namespace` that reached a terminal status on `day` (UTC)
    fn count_completed_on(&self, namespace: &str, day: NaiveDate) -> Result<u64>;

    /// Write a terminal status and refresh `updated_at`
    fn mark_complete(&self, item: &mut WorkItem, status: RequestStatus) -> Result<()>;

    fn get(&self, id: u64) -> Result<Option<WorkItem>>;

    fn count_completed_today(&self, namespace: &str) -> Result<u64> {
        self.count_completed_on(namespace, Utc::now().date_naive())
    }
}
