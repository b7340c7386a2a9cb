//! Request parsing module
//!
//! Turns raw query strings and bodies into JSON values the validators can
//! deserialize, and carries everything a handler needs in [`RequestContext`].

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::auth::Session;
use crate::error::{ApiError, ApiResult};

/// Error type request bodies must convert into
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Per-request inputs handed to review handlers
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Path parameters captured by the route pattern
    pub params: HashMap<String, String>,
    pub query: Map<String, Value>,
    /// Parsed JSON body; an empty object when the request had none
    pub body: Value,
    pub session: Option<Session>,
}

impl RequestContext {
    /// Look a string field up in body, then query, then path parameters
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.body
            .get(key)
            .and_then(Value::as_str)
            .or_else(|| self.query.get(key).and_then(Value::as_str))
            .or_else(|| self.params.get(key).map(String::as_str))
            .filter(|value| !value.is_empty())
    }
}

/// Parse a query string into a JSON object
///
/// Values stay strings; repeated keys and `key[]` keys collect into arrays.
pub fn parse_query(query: Option<&str>) -> Map<String, Value> {
    let mut params = Map::new();
    let Some(query) = query else {
        return params;
    };

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(raw_key);
        let value = Value::String(decode_component(raw_value));

        let (key, forced_array) = match key.strip_suffix("[]") {
            Some(stripped) => (stripped.to_string(), true),
            None => (key, false),
        };

        match params.get_mut(&key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None if forced_array => {
                params.insert(key, Value::Array(vec![value]));
            }
            None => {
                params.insert(key, value);
            }
        }
    }
    params
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map_or_else(|_| spaced.clone(), |s| s.into_owned())
}

/// Collect a request body (bounded by `limit`) and parse it as JSON
///
/// Reading stops at the first frame past `limit`. Bodies that are empty or
/// not declared as JSON yield an empty object.
pub async fn read_json_body<B>(body: B, is_json: bool, limit: u64) -> ApiResult<Value>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let cap = usize::try_from(limit).unwrap_or(usize::MAX);
    let bytes = Limited::new(body, cap)
        .collect()
        .await
        .map_err(|e| {
            if e.is::<LengthLimitError>() {
                ApiError::PayloadTooLarge { limit }
            } else {
                ApiError::Validation(format!("Failed to read request body: {e}"))
            }
        })?
        .to_bytes();

    if !is_json || bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::Validation(format!("Invalid JSON body: {e}")))?;
    if !value.is_object() {
        return Err(ApiError::Validation(
            "Request body must be a JSON object".to_string(),
        ));
    }
    Ok(value)
}
