//! Download worker
//!
//! - [`RateLimiter`] turns "N per unit" into a minimum spacing
//! - [`Requester`] sends one paced request and reports a [`FetchOutcome`]
//! - [`Downloader`] drains a namespace's queue through ledger, handler and storage

pub mod downloader;
pub mod http;
pub mod rate_limit;
pub mod requester;

pub use downloader::{DownloadError, Downloader, RunReport, RunState};
pub use http::{HttpConfig, HttpReply, HttpTransport, ReqwestTransport, TransportError};
pub use rate_limit::{RateLimitError, RateLimiter, TimeUnit, WaitPosition};
pub use requester::{FetchOutcome, Requester};
