//! Date shaping for response bodies.
//!
//! Backends send timestamps as RFC 3339 strings. `shape` walks a parsed JSON
//! body and turns every such string into `Value::Date`, leaving the rest of
//! the tree untouched.

use chrono::{DateTime, FixedOffset};
use serde_json::Value as Json;

use crate::value::Value;

/// Recognize an RFC 3339 timestamp. Date-only and free-form strings are not
/// dates.
pub fn parse_date(s: &str) -> Option<DateTime<FixedOffset>> {
    // Cheap pre-check before handing every string to chrono.
    let bytes = s.as_bytes();
    if bytes.len() < 20 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    DateTime::parse_from_rfc3339(s).ok()
}

/// Convert a JSON tree into a `Value`, promoting recognized date strings.
pub fn shape(json: Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => Value::Number(n),
        Json::String(s) => match parse_date(&s) {
            Some(date) => Value::Date(date, s),
            None => Value::String(s),
        },
        Json::Array(items) => Value::Array(items.into_iter().map(shape).collect()),
        Json::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, shape(v))).collect()),
    }
}
