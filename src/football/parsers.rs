//! Body → (payload, storage key) for each API-Football response type

use serde_json::Value;

use crate::handlers::{HandlerError, ParsedPayload};
use crate::queue::Response;

fn decode(response: &Response) -> Result<Value, HandlerError> {
    serde_json::from_str(&response.body).map_err(|e| HandlerError::parse(&response.item.kind, e))
}

/// API-Football echoes query parameters back under `parameters`; fall back
/// to what was sent when the echo is missing
fn parameter(data: &Value, response: &Response, name: &str) -> Option<String> {
    let echoed = match data.pointer(&format!("/parameters/{}", name)) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    echoed
        .or_else(|| response.item.params.get(name).cloned())
        .filter(|value| !value.is_empty())
}

/// `{date}_schedule.json`
pub fn parse_schedule(response: &Response) -> Result<ParsedPayload, HandlerError> {
    let data = decode(response)?;
    let date = parameter(&data, response, "date")
        .ok_or_else(|| HandlerError::parse(&response.item.kind, "missing 'date' parameter"))?;

    Ok(ParsedPayload::new(data, format!("{}_schedule.json", date)))
}

/// `{fixture}_{endpoint}.json`, endpoint being the last segment of `get`
pub fn parse_fixture_stats(response: &Response) -> Result<ParsedPayload, HandlerError> {
    let data = decode(response)?;
    let fixture = parameter(&data, response, "fixture")
        .ok_or_else(|| HandlerError::parse(&response.item.kind, "missing 'fixture' parameter"))?;

    let endpoint = data
        .get("get")
        .and_then(Value::as_str)
        .filter(|get| !get.is_empty())
        .unwrap_or(&response.item.url);
    let endpoint = endpoint
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| HandlerError::parse(&response.item.kind, "missing 'get' field"))?;

    let key = format!("{}_{}.json", fixture, endpoint);
    Ok(ParsedPayload::new(data, key))
}
