use thiserror::Error;

use super::types::ParsedPayload;
use crate::queue::{Response, WorkItem};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("No parser registered for response type '{0}'")]
    NoParser(String),

    #[error("failed to parse '{kind}' response: {reason}")]
    Parse { kind: String, reason: String },
}

impl HandlerError {
    pub fn parse(kind: impl Into<String>, reason: impl ToString) -> Self {
        HandlerError::Parse {
            kind: kind.into(),
            reason: reason.to_string(),
        }
    }

    /// Configuration problems abort a run; parse problems only fail one item
    pub fn is_fatal(&self) -> bool {
        matches!(self, HandlerError::NoParser(_))
    }
}

/// Turns a raw body into the payload to store and the key to store it under
pub trait ResponseParser: Send + Sync {
    fn parse(&self, response: &Response) -> Result<ParsedPayload, HandlerError>;
}

/// Derives follow-up work from a raw body
pub trait RequestGenerator: Send + Sync {
    fn generate(&self, response: &Response) -> Result<Vec<WorkItem>, HandlerError>;
}

impl<F> ResponseParser for F
where
    F: Fn(&Response) -> Result<ParsedPayload, HandlerError> + Send + Sync,
{
    fn parse(&self, response: &Response) -> Result<ParsedPayload, HandlerError> {
        self(response)
    }
}

impl<F> RequestGenerator for F
where
    F: Fn(&Response) -> Result<Vec<WorkItem>, HandlerError> + Send + Sync,
{
    fn generate(&self, response: &Response) -> Result<Vec<WorkItem>, HandlerError> {
        self(response)
    }
}
