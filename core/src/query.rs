//! Query-string encoding for GET and DELETE params.
//!
//! # Design
//! Params arrive as a JSON object. Each entry becomes one or more
//! `(key, value)` pairs: null entries are skipped, arrays repeat the key as
//! `key[]` once per non-null element. Nested objects and arrays are sent as
//! JSON text with their null keys dropped, the same way POST bodies are.
//! Percent-encoding is left to the transport.

use serde_json::Value as Json;

use crate::error::ErrorCause;
use crate::sanitize::sanitize;

/// Flatten params into query pairs. `Null` means "no params".
pub fn encode(params: &Json) -> Result<Vec<(String, String)>, ErrorCause> {
    let map = match params {
        Json::Null => return Ok(Vec::new()),
        Json::Object(map) => map,
        Json::Bool(_) => return Err(ErrorCause::InvalidParams("boolean")),
        Json::Number(_) => return Err(ErrorCause::InvalidParams("number")),
        Json::String(_) => return Err(ErrorCause::InvalidParams("string")),
        Json::Array(_) => return Err(ErrorCause::InvalidParams("array")),
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Json::Null => {}
            Json::Array(items) => {
                let key = format!("{key}[]");
                pairs.extend(
                    items
                        .iter()
                        .filter(|item| !item.is_null())
                        .map(|item| (key.clone(), text(item))),
                );
            }
            other => pairs.push((key.clone(), text(other))),
        }
    }
    Ok(pairs)
}

fn text(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        other => sanitize(other.clone()).to_string(),
    }
}
