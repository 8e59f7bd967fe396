use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Query parameters attached to a work item
pub type Params = BTreeMap<String, String>;

/// Lifecycle status of a persisted work item
///
/// Only `Pending -> Succeeded` and `Pending -> Failed` are legal moves; a
/// terminal status may be rewritten with itself (timestamp refresh only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Succeeded,
    Failed,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    pub fn can_transition_to(self, to: RequestStatus) -> bool {
        match (self, to) {
            (RequestStatus::Pending, RequestStatus::Succeeded | RequestStatus::Failed) => true,
            (from, to) => from.is_terminal() && from == to,
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Succeeded => "Succeeded",
            RequestStatus::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// A single unit of fetch work
///
/// Built in memory without an `id`; the ledger assigns the id, namespace and
/// timestamps on first persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: Option<u64>,
    pub url: String,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub payload: Option<Value>,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: RequestStatus,
    #[serde(default)]
    pub namespace: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkItem {
    pub fn new(url: impl Into<String>, kind: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            url: url.into(),
            params: Params::new(),
            payload: None,
            kind: kind.into(),
            status: RequestStatus::Pending,
            namespace: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Outcome of one fetch, never persisted
///
/// `error` is set exactly when the fetch produced no usable body. A failed
/// HTTP exchange may still carry the server's body for diagnostics.
#[derive(Debug, Clone)]
pub struct Response {
    pub body: String,
    pub item: WorkItem,
    pub error: Option<String>,
}

impl Response {
    pub fn ok(item: WorkItem, body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            item,
            error: None,
        }
    }

    pub fn failed(item: WorkItem, body: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            item,
            error: Some(error.into()),
        }
    }
}
