use thiserror::Error;

use crate::queue::RequestStatus;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Request not found: {0}")]
    RequestNotFound(u64),

    #[error("Request has no id, persist it first (url: {0})")]
    NotPersisted(String),

    #[error("Request {0} is already persisted")]
    AlreadyPersisted(u64),

    #[error("Invalid status transition for request {id}: {from} -> {to}")]
    InvalidTransition {
        id: u64,
        from: RequestStatus,
        to: RequestStatus,
    },

    #[error("Invalid key format: {0}")]
    InvalidKey(String),

    #[error("Invalid namespace: {0:?}")]
    InvalidNamespace(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
