//! API-Football bindings
//!
//! A run starts from one `schedule` request for a date. Its response lists
//! the day's fixtures; for every fixture in an allowed league the schedule
//! generator emits a `match_stats` and a `player_stats` request. Every
//! response is stored as-is under a deterministic key:
//!
//! | type           | endpoint               | key                          |
//! |----------------|------------------------|------------------------------|
//! | `schedule`     | `/fixtures?date=D`     | `{D}_schedule.json`          |
//! | `match_stats`  | `/fixtures/statistics` | `{fixture}_statistics.json`  |
//! | `player_stats` | `/fixtures/players`    | `{fixture}_players.json`     |

pub mod generators;
pub mod jobs;
pub mod parsers;

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::handlers::ResponseHandler;
use crate::queue::WorkItem;

pub use generators::FixtureRequests;
pub use jobs::{OngoingReport, build_downloader, run_for_date, run_ongoing};

pub const SCHEDULE: &str = "schedule";
pub const MATCH_STATS: &str = "match_stats";
pub const PLAYER_STATS: &str = "player_stats";

/// Seed request: every fixture played on `date`
pub fn schedule_request(base_url: &str, date: NaiveDate) -> WorkItem {
    WorkItem::new(format!("{}/fixtures", base_url.trim_end_matches('/')), SCHEDULE)
        .with_param("date", date.format("%Y-%m-%d").to_string())
}

/// Parsers for all three types plus the fixture generator on `schedule`
pub fn response_handler(
    base_url: &str,
    leagues: impl IntoIterator<Item = u64>,
) -> ResponseHandler {
    let leagues: BTreeSet<u64> = leagues.into_iter().collect();

    ResponseHandler::new()
        .with_parser(SCHEDULE, parsers::parse_schedule)
        .with_parser(MATCH_STATS, parsers::parse_fixture_stats)
        .with_parser(PLAYER_STATS, parsers::parse_fixture_stats)
        .with_generator(SCHEDULE, FixtureRequests::new(base_url, leagues))
}
