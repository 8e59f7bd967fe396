//! Shared helpers for integration tests: an in-process API-Football mock
//! and a configuration pointing at it.

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use statfetch::config::{Config, StorageProvider};

pub const ALLOWED_LEAGUES: [u64; 2] = [39, 140];

/// Requests seen by the mock, plus which fixture it refuses to serve
#[derive(Clone, Default)]
pub struct MockApi {
    hits: Arc<Mutex<Vec<String>>>,
    api_keys: Arc<Mutex<Vec<Option<String>>>>,
    failing_fixture: Option<String>,
}

impl MockApi {
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    pub fn api_keys(&self) -> Vec<Option<String>> {
        self.api_keys.lock().unwrap().clone()
    }

    fn record(&self, uri: &Uri, headers: &HeaderMap) {
        self.hits.lock().unwrap().push(uri.to_string());
        let key = headers
            .get("x-rapidapi-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.api_keys.lock().unwrap().push(key);
    }
}

/// Start the mock on a random port; returns its `/v3` base URL
pub async fn start_mock_api(failing_fixture: Option<&str>) -> (String, MockApi) {
    let api = MockApi {
        failing_fixture: failing_fixture.map(str::to_string),
        ..MockApi::default()
    };

    let app = Router::new()
        .route("/v3/fixtures", get(schedule))
        .route("/v3/fixtures/statistics", get(statistics))
        .route("/v3/fixtures/players", get(players))
        .with_state(api.clone());

    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let bound_addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/v3", bound_addr), api)
}

/// Two fixtures in allowed leagues, one in a league outside the allow-list
async fn schedule(
    State(api): State<MockApi>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    api.record(&uri, &headers);
    let date = query.get("date").cloned().unwrap_or_default();

    Json(json!({
        "get": "fixtures",
        "parameters": {"date": date},
        "results": 3,
        "response": [
            {"fixture": {"id": 1001}, "league": {"id": 39}},
            {"fixture": {"id": 1002}, "league": {"id": 140}},
            {"fixture": {"id": 1003}, "league": {"id": 999}},
        ],
    }))
}

async fn statistics(
    State(api): State<MockApi>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    api.record(&uri, &headers);
    fixture_reply(&api, "fixtures/statistics", &query)
}

async fn players(
    State(api): State<MockApi>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    api.record(&uri, &headers);
    fixture_reply(&api, "fixtures/players", &query)
}

fn fixture_reply(api: &MockApi, endpoint: &str, query: &HashMap<String, String>) -> Response {
    let fixture = query.get("fixture").cloned().unwrap_or_default();
    if api.failing_fixture.as_deref() == Some(fixture.as_str()) {
        return (StatusCode::NOT_FOUND, "fixture not found").into_response();
    }

    Json(json!({
        "get": endpoint,
        "parameters": {"fixture": fixture},
        "response": [{"team": {"id": 1}}],
    }))
    .into_response()
}

/// Config against the mock: local blob store and ledger under `dir`, no pacing, no limit
pub fn test_config(base_url: &str, dir: &Path) -> Config {
    let mut config = Config::default();
    config.api.base_url = base_url.to_string();
    config.api.key = Some("test-key".to_string());
    config.ledger.path = dir.join("ledger");
    config.storage.provider = StorageProvider::Local;
    config.storage.root = dir.join("blobs");
    config.limits.rate_limit = None;
    config.limits.daily_request_limit = None;
    config.leagues.allowed = ALLOWED_LEAGUES.to_vec();
    config
}

pub fn read_blob(dir: &Path, key: &str) -> Option<Value> {
    let bytes = std::fs::read(dir.join("blobs").join(key)).ok()?;
    serde_json::from_slice(&bytes).ok()
}
