use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

use super::{MATCH_STATS, PLAYER_STATS};
use crate::handlers::{HandlerError, RequestGenerator};
use crate::queue::{Response, WorkItem};

/// Expands a schedule into statistics and players requests per fixture,
/// keeping only fixtures whose league is in the allow-list
#[derive(Debug, Clone)]
pub struct FixtureRequests {
    base_url: String,
    leagues: BTreeSet<u64>,
}

impl FixtureRequests {
    pub fn new(base_url: impl Into<String>, leagues: BTreeSet<u64>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            leagues,
        }
    }

    fn requests_for(&self, fixture_id: u64) -> [WorkItem; 2] {
        let fixture = fixture_id.to_string();
        [
            WorkItem::new(format!("{}/fixtures/statistics", self.base_url), MATCH_STATS)
                .with_param("fixture", fixture.clone()),
            WorkItem::new(format!("{}/fixtures/players", self.base_url), PLAYER_STATS)
                .with_param("fixture", fixture),
        ]
    }
}

/// Ids may arrive as numbers or numeric strings
fn as_id(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

impl RequestGenerator for FixtureRequests {
    fn generate(&self, response: &Response) -> Result<Vec<WorkItem>, HandlerError> {
        let data: Value = serde_json::from_str(&response.body)
            .map_err(|e| HandlerError::parse(&response.item.kind, e))?;

        let fixtures = data
            .get("response")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut requests = Vec::new();
        let mut skipped = 0usize;
        for fixture in fixtures {
            let league_id = as_id(fixture.pointer("/league/id"));
            let fixture_id = as_id(fixture.pointer("/fixture/id"));

            match (fixture_id, league_id) {
                (Some(fixture_id), Some(league_id)) if self.leagues.contains(&league_id) => {
                    requests.extend(self.requests_for(fixture_id));
                }
                _ => skipped += 1,
            }
        }

        debug!(
            fixtures = fixtures.len(),
            skipped,
            requests = requests.len(),
            "Fixture requests generated"
        );

        Ok(requests)
    }
}
