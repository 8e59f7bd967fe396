pub mod config;
pub mod football;
pub mod handlers;
pub mod humanize;
pub mod ledger;
pub mod observability;
pub mod queue;
pub mod storage;
pub mod worker;
