use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{NaiveDate, Utc};
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use tracing::{debug, info};

use crate::queue::{RequestStatus, WorkItem};

use super::error::{LedgerError, Result};
use super::partitions::{
    META_NEXT_ID, decode_trailing_id, decode_u64, encode_completed_key, encode_completed_prefix,
    encode_meta_key, encode_pending_key, encode_pending_prefix, encode_request_key,
};
use super::traits::Ledger;

/// Fjall-backed ledger of work items
///
/// Each write is committed as one atomic batch across partitions and synced
/// to disk before returning, so a Pending row always exists before its item
/// can reach the transport.
pub struct FjallLedger {
    keyspace: Keyspace,
    requests: PartitionHandle,
    pending: PartitionHandle,
    completed: PartitionHandle,
    metadata: PartitionHandle,
    next_id: AtomicU64,
}

impl FjallLedger {
    /// Open or create a ledger at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening Fjall ledger at: {}", path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let keyspace = Config::new(path).open()?;

        let requests = keyspace.open_partition("requests", PartitionCreateOptions::default())?;
        let pending = keyspace.open_partition("pending", PartitionCreateOptions::default())?;
        let completed = keyspace.open_partition("completed", PartitionCreateOptions::default())?;
        let metadata = keyspace.open_partition("metadata", PartitionCreateOptions::default())?;

        let next_id = metadata
            .get(encode_meta_key(META_NEXT_ID))?
            .and_then(|bytes| decode_u64(&bytes))
            .unwrap_or(1);

        info!(next_id, "Fjall ledger opened");

        Ok(Self {
            keyspace,
            requests,
            pending,
            completed,
            metadata,
            next_id: AtomicU64::new(next_id),
        })
    }

    fn load(&self, id: u64) -> Result<Option<WorkItem>> {
        match self.requests.get(encode_request_key(id))? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    fn sync(&self) -> Result<()> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() || namespace.contains(':') {
        return Err(LedgerError::InvalidNamespace(namespace.to_string()));
    }
    Ok(())
}

impl Ledger for FjallLedger {
    fn persist(&self, items: &mut [WorkItem], namespace: &str) -> Result<()> {
        validate_namespace(namespace)?;
        if items.is_empty() {
            return Ok(());
        }
        if let Some(id) = items.iter().find_map(|item| item.id) {
            return Err(LedgerError::AlreadyPersisted(id));
        }

        let count = items.len() as u64;
        let first_id = self.next_id.fetch_add(count, Ordering::SeqCst);
        let now = Utc::now();

        let rows: Vec<WorkItem> = items
            .iter()
            .zip(first_id..)
            .map(|(item, id)| WorkItem {
                id: Some(id),
                status: RequestStatus::Pending,
                namespace: namespace.to_string(),
                created_at: now,
                updated_at: now,
                ..item.clone()
            })
            .collect();

        let mut batch = self.keyspace.batch();
        for (id, row) in (first_id..).zip(&rows) {
            batch.insert(&self.requests, encode_request_key(id), serde_json::to_vec(row)?);
            batch.insert(&self.pending, encode_pending_key(namespace, id), id.to_be_bytes().to_vec());
        }
        batch.insert(
            &self.metadata,
            encode_meta_key(META_NEXT_ID),
            (first_id + count).to_be_bytes().to_vec(),
        );
        batch.commit()?;
        self.sync()?;

        for (item, row) in items.iter_mut().zip(rows) {
            *item = row;
        }

        debug!(namespace, first_id, count, "Persisted pending requests");
        Ok(())
    }

    fn list_pending(&self, namespace: &str) -> Result<Vec<WorkItem>> {
        validate_namespace(namespace)?;
        let mut items = Vec::new();

        for entry in self.pending.prefix(encode_pending_prefix(namespace)) {
            let (key, _) = entry?;
            let id = decode_trailing_id(&key)
                .ok_or_else(|| LedgerError::InvalidKey(String::from_utf8_lossy(&key).to_string()))?;
            let item = self.load(id)?.ok_or(LedgerError::RequestNotFound(id))?;
            items.push(item);
        }

        debug!(namespace, count = items.len(), "Listed pending requests");
        Ok(items)
    }

    fn count_completed_on(&self, namespace: &str, day: NaiveDate) -> Result<u64> {
        validate_namespace(namespace)?;
        let mut count = 0;
        for entry in self.completed.prefix(encode_completed_prefix(namespace, day)) {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    fn mark_complete(&self, item: &mut WorkItem, status: RequestStatus) -> Result<()> {
        let id = item.id.ok_or_else(|| LedgerError::NotPersisted(item.url.clone()))?;
        let mut row = self.load(id)?.ok_or(LedgerError::RequestNotFound(id))?;

        if !row.status.can_transition_to(status) {
            return Err(LedgerError::InvalidTransition {
                id,
                from: row.status,
                to: status,
            });
        }

        let namespace = row.namespace.clone();
        let now = Utc::now();
        let previous_day = row.updated_at.date_naive();

        let mut batch = self.keyspace.batch();
        if !row.status.is_terminal() {
            batch.remove(&self.pending, encode_pending_key(&namespace, id));
        } else if previous_day != now.date_naive() {
            batch.remove(&self.completed, encode_completed_key(&namespace, previous_day, id));
        }

        row.status = status;
        row.updated_at = now;

        batch.insert(
            &self.completed,
            encode_completed_key(&namespace, now.date_naive(), id),
            id.to_be_bytes().to_vec(),
        );
        batch.insert(&self.requests, encode_request_key(id), serde_json::to_vec(&row)?);
        batch.commit()?;
        self.sync()?;

        debug!(id, namespace = %namespace, %status, "Request completed");
        *item = row;
        Ok(())
    }

    fn get(&self, id: u64) -> Result<Option<WorkItem>> {
        self.load(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const NS: &str = "historical";

    fn create_test_ledger() -> (FjallLedger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let ledger = FjallLedger::open(temp_dir.path().join("ledger")).unwrap();
        (ledger, temp_dir)
    }

    fn items(n: usize) -> Vec<WorkItem> {
        (0..n)
            .map(|i| {
                WorkItem::new("https://api.test/fixtures", "schedule")
                    .with_param("page", i.to_string())
            })
            .collect()
    }

    #[test]
    fn test_persist_assigns_sequential_ids() {
        let (ledger, _temp) = create_test_ledger();
        let mut batch = items(3);

        ledger.persist(&mut batch, NS).unwrap();

        let ids: Vec<u64> = batch.iter().map(|i| i.id.unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(batch.iter().all(|i| i.namespace == NS));
        assert!(batch.iter().all(|i| i.status == RequestStatus::Pending));

        let stored = ledger.get(2).unwrap().unwrap();
        assert_eq!(stored.params.get("page").map(String::as_str), Some("1"));
        assert_eq!(stored.kind, "schedule");
    }

    #[test]
    fn test_persist_forces_pending_status() {
        let (ledger, _temp) = create_test_ledger();
        let mut batch = items(1);
        batch[0].status = RequestStatus::Succeeded;

        ledger.persist(&mut batch, NS).unwrap();

        assert_eq!(batch[0].status, RequestStatus::Pending);
        assert_eq!(ledger.list_pending(NS).unwrap().len(), 1);
        assert_eq!(ledger.count_completed_today(NS).unwrap(), 0);
    }

    #[test]
    fn test_persist_rejects_already_persisted_item() {
        let (ledger, _temp) = create_test_ledger();
        let mut batch = items(1);
        ledger.persist(&mut batch, NS).unwrap();

        let result = ledger.persist(&mut batch, NS);
        assert!(matches!(result, Err(LedgerError::AlreadyPersisted(1))));
    }

    #[test]
    fn test_invalid_namespace() {
        let (ledger, _temp) = create_test_ledger();

        assert!(matches!(
            ledger.persist(&mut items(1), "a:b"),
            Err(LedgerError::InvalidNamespace(_))
        ));
        assert!(matches!(
            ledger.list_pending(""),
            Err(LedgerError::InvalidNamespace(_))
        ));
    }

    #[test]
    fn test_list_pending_excludes_completed() {
        let (ledger, _temp) = create_test_ledger();
        let mut batch = items(3);
        ledger.persist(&mut batch, NS).unwrap();

        ledger.mark_complete(&mut batch[0], RequestStatus::Succeeded).unwrap();

        let pending = ledger.list_pending(NS).unwrap();
        let ids: Vec<u64> = pending.iter().map(|i| i.id.unwrap()).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_backlog_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger");

        {
            let ledger = FjallLedger::open(&path).unwrap();
            let mut batch = items(3);
            ledger.persist(&mut batch, NS).unwrap();
            ledger.mark_complete(&mut batch[1], RequestStatus::Failed).unwrap();
        }

        let ledger = FjallLedger::open(&path).unwrap();
        let pending = ledger.list_pending(NS).unwrap();
        let ids: Vec<u64> = pending.iter().map(|i| i.id.unwrap()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(ledger.count_completed_today(NS).unwrap(), 1);

        // ids keep counting from where the previous process stopped
        let mut more = items(1);
        ledger.persist(&mut more, NS).unwrap();
        assert_eq!(more[0].id, Some(4));
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let (ledger, _temp) = create_test_ledger();
        let mut ongoing = items(2);
        let mut historical = items(1);
        ledger.persist(&mut ongoing, "ongoing").unwrap();
        ledger.persist(&mut historical, NS).unwrap();

        ledger.mark_complete(&mut ongoing[0], RequestStatus::Succeeded).unwrap();

        assert_eq!(ledger.list_pending("ongoing").unwrap().len(), 1);
        assert_eq!(ledger.list_pending(NS).unwrap().len(), 1);
        assert_eq!(ledger.count_completed_today("ongoing").unwrap(), 1);
        assert_eq!(ledger.count_completed_today(NS).unwrap(), 0);
    }

    #[test]
    fn test_count_completed_today_counts_both_terminal_statuses() {
        let (ledger, _temp) = create_test_ledger();
        let mut batch = items(3);
        ledger.persist(&mut batch, NS).unwrap();

        ledger.mark_complete(&mut batch[0], RequestStatus::Succeeded).unwrap();
        ledger.mark_complete(&mut batch[1], RequestStatus::Failed).unwrap();

        assert_eq!(ledger.count_completed_today(NS).unwrap(), 2);

        let yesterday = Utc::now().date_naive().pred_opt().unwrap();
        assert_eq!(ledger.count_completed_on(NS, yesterday).unwrap(), 0);
    }

    #[test]
    fn test_mark_complete_is_idempotent() {
        let (ledger, _temp) = create_test_ledger();
        let mut batch = items(1);
        ledger.persist(&mut batch, NS).unwrap();

        ledger.mark_complete(&mut batch[0], RequestStatus::Succeeded).unwrap();
        let first_update = batch[0].updated_at;

        std::thread::sleep(std::time::Duration::from_millis(5));
        ledger.mark_complete(&mut batch[0], RequestStatus::Succeeded).unwrap();

        let stored = ledger.get(1).unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Succeeded);
        assert!(stored.updated_at > first_update);
        assert_eq!(stored.updated_at, batch[0].updated_at);
        assert_eq!(ledger.count_completed_today(NS).unwrap(), 1);
    }

    #[test]
    fn test_mark_complete_rejects_regression() {
        let (ledger, _temp) = create_test_ledger();
        let mut batch = items(1);
        ledger.persist(&mut batch, NS).unwrap();
        ledger.mark_complete(&mut batch[0], RequestStatus::Succeeded).unwrap();

        let to_failed = ledger.mark_complete(&mut batch[0], RequestStatus::Failed);
        assert!(matches!(
            to_failed,
            Err(LedgerError::InvalidTransition { id: 1, .. })
        ));

        let to_pending = ledger.mark_complete(&mut batch[0], RequestStatus::Pending);
        assert!(matches!(to_pending, Err(LedgerError::InvalidTransition { .. })));

        assert_eq!(ledger.get(1).unwrap().unwrap().status, RequestStatus::Succeeded);
    }

    #[test]
    fn test_mark_complete_requires_persisted_item() {
        let (ledger, _temp) = create_test_ledger();
        let mut item = WorkItem::new("https://api.test/x", "schedule");

        let result = ledger.mark_complete(&mut item, RequestStatus::Succeeded);
        assert!(matches!(result, Err(LedgerError::NotPersisted(_))));

        item.id = Some(99);
        let result = ledger.mark_complete(&mut item, RequestStatus::Succeeded);
        assert!(matches!(result, Err(LedgerError::RequestNotFound(99))));
    }
}
