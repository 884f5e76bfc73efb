//! Outgoing body cleanup.

use serde_json::Value as Json;

/// Drop every object key whose value is null, at any depth.
///
/// Arrays are cleaned element by element but keep their length, so a null
/// array element stays in place. Scalars, date strings included, pass
/// through unchanged.
pub fn sanitize(value: Json) -> Json {
    match value {
        Json::Array(items) => Json::Array(items.into_iter().map(sanitize).collect()),
        Json::Object(map) => Json::Object(
            map.into_iter()
                .filter_map(|(key, value)| {
                    let value = sanitize(value);
                    (!value.is_null()).then_some((key, value))
                })
                .collect(),
        ),
        other => other,
    }
}
