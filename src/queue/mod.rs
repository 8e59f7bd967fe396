pub mod fifo;
pub mod item;

pub use fifo::WorkQueue;
pub use item::{Params, RequestStatus, Response, WorkItem};
