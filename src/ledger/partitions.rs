/// Key layout and encoding utilities for Fjall partitions
///
/// Partition structure:
/// - `requests`: req:{id:020} -> WorkItem (JSON)
/// - `pending`: pending:{namespace}:{id:020} -> id (u64 BE)
/// - `completed`: done:{namespace}:{yyyy-mm-dd}:{id:020} -> id (u64 BE)
/// - `metadata`: meta:{key} -> value
///
/// Ids are zero-padded so lexicographic key order is creation order.
use chrono::NaiveDate;

pub const META_NEXT_ID: &str = "next_id";

/// Encode a request key: req:{id:020}
pub fn encode_request_key(id: u64) -> Vec<u8> {
    format!("req:{:020}", id).into_bytes()
}

/// Encode a pending index key: pending:{namespace}:{id:020}
pub fn encode_pending_key(namespace: &str, id: u64) -> Vec<u8> {
    format!("pending:{}:{:020}", namespace, id).into_bytes()
}

/// Prefix for a namespace's backlog scan: pending:{namespace}:
pub fn encode_pending_prefix(namespace: &str) -> Vec<u8> {
    format!("pending:{}:", namespace).into_bytes()
}

/// Encode a completion index key: done:{namespace}:{day}:{id:020}
pub fn encode_completed_key(namespace: &str, day: NaiveDate, id: u64) -> Vec<u8> {
    format!("done:{}:{}:{:020}", namespace, day.format("%Y-%m-%d"), id).into_bytes()
}

/// Prefix for counting one namespace's completions on a day: done:{namespace}:{day}:
pub fn encode_completed_prefix(namespace: &str, day: NaiveDate) -> Vec<u8> {
    format!("done:{}:{}:", namespace, day.format("%Y-%m-%d")).into_bytes()
}

/// Encode a metadata key: meta:{key}
pub fn encode_meta_key(key: &str) -> Vec<u8> {
    format!("meta:{}", key).into_bytes()
}

/// Decode the trailing id of any index key
pub fn decode_trailing_id(key: &[u8]) -> Option<u64> {
    let key_str = std::str::from_utf8(key).ok()?;
    key_str.rsplit(':').next()?.parse().ok()
}

/// Decode a big-endian u64 value
pub fn decode_u64(value: &[u8]) -> Option<u64> {
    let bytes: [u8; 8] = value.try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}
