//! Response handlers
//!
//! A [`ResponseHandler`] maps a work-item type to exactly one parser and zero
//! or more generators:
//!
//! - [`ResponseParser`] - raw body → payload + storage key
//! - [`RequestGenerator`] - raw body → follow-up work items
//! - [`HandledResponse`] - the result of one `handle` call, owning the
//!   generated follow-ups until [`HandledResponse::collect_new_requests`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use statfetch::handlers::ResponseHandler;
//!
//! let handler = ResponseHandler::new()
//!     .with_parser("schedule", parse_schedule)
//!     .with_generator("schedule", fixture_requests);
//!
//! let mut handled = handler.handle(&response)?;
//! let children = handled.collect_new_requests();
//! ```

mod registry;
mod traits;
mod types;

pub use registry::ResponseHandler;
pub use traits::{HandlerError, RequestGenerator, ResponseParser};
pub use types::{HandledResponse, ParsedPayload};
