use serde_json::Value;
use std::mem;

use crate::queue::WorkItem;

/// Parser output: what to store and where
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPayload {
    pub payload: Value,
    pub storage_key: String,
}

impl ParsedPayload {
    pub fn new(payload: Value, storage_key: impl Into<String>) -> Self {
        Self {
            payload,
            storage_key: storage_key.into(),
        }
    }
}

/// Everything `ResponseHandler::handle` produced for one response
#[derive(Debug, Clone)]
pub struct HandledResponse {
    pub parsed: ParsedPayload,
    new_requests: Vec<WorkItem>,
}

impl HandledResponse {
    pub fn new(parsed: ParsedPayload, new_requests: Vec<WorkItem>) -> Self {
        Self {
            parsed,
            new_requests,
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.parsed.storage_key
    }

    pub fn payload(&self) -> &Value {
        &self.parsed.payload
    }

    pub fn pending_requests(&self) -> usize {
        self.new_requests.len()
    }

    /// Take the follow-up items in generation order, leaving the buffer empty
    pub fn collect_new_requests(&mut self) -> Vec<WorkItem> {
        mem::take(&mut self.new_requests)
    }
}
