/// Durable ledger of work items
///
/// Every item the downloader will ever send is first written here as
/// Pending. The ledger is what makes a run recoverable: after a crash or an
/// exhausted daily budget, `list_pending` hands the unfinished work back.
///
/// ## Backend
///
/// [`FjallLedger`] keeps the ledger in an embedded Fjall keyspace:
///
/// - `requests`: one JSON row per item, the canonical
///   `(id, url, params, payload, type, status, namespace, created_at, updated_at)` schema
/// - `pending`: per-namespace index of rows still Pending (the backlog)
/// - `completed`: per-namespace, per-day index of terminal rows, which turns
///   `count_completed_today` into a prefix scan
/// - `metadata`: the id counter, so ids are never reused across restarts
///
/// ## Usage
///
/// ```rust,ignore
/// use statfetch::ledger::{FjallLedger, Ledger};
///
/// let ledger = FjallLedger::open("data/ledger")?;
/// ledger.persist(&mut items, "ongoing")?;
/// let backlog = ledger.list_pending("ongoing")?;
/// ```

pub mod error;
pub mod partitions;
pub mod store;
pub mod traits;

pub use error::{LedgerError, Result};
pub use store::FjallLedger;
pub use traits::Ledger;
