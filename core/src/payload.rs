//! Payload utilities shared by the request builders.

use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, Result};

/// Remove every object key whose value is `null`, at any depth.
///
/// Walks objects and arrays; scalar values (including strings that happen
/// to contain the text `"key":null`) are left alone. Applying it twice is
/// the same as applying it once.
pub fn strip_empty_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_empty_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_empty_keys).collect()),
        other => other,
    }
}

pub(crate) fn to_value<T: Serialize>(payload: &T) -> Result<Value> {
    serde_json::to_value(payload).map_err(|e| ApiError::Serialization(e.to_string()))
}

pub(crate) fn to_json<T: Serialize>(payload: &T) -> Result<String> {
    serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn removes_nulls_at_every_level() {
        let input = json!({"a": 1, "b": null, "c": {"d": null, "e": 2}});
        assert_eq!(strip_empty_keys(input), json!({"a": 1, "c": {"e": 2}}));
    }

    #[test]
    fn is_idempotent() {
        let input = json!({
            "credential": {
                "group_id": null,
                "recipient": {"name": "Jo", "email": null},
                "custom_attributes": {"level": null, "track": "ops"}
            }
        });
        let once = strip_empty_keys(input);
        let twice = strip_empty_keys(once.clone());
        assert_eq!(once, twice);
        assert_eq!(
            once,
            json!({
                "credential": {"recipient": {"name": "Jo"}, "custom_attributes": {"track": "ops"}}
            })
        );
    }

    #[test]
    fn leaves_null_like_text_inside_strings() {
        let input = json!({"description": "\"grade\":null, keep me", "x": null});
        assert_eq!(
            strip_empty_keys(input),
            json!({"description": "\"grade\":null, keep me"})
        );
    }

    #[test]
    fn walks_into_arrays_but_keeps_elements() {
        let input = json!({"items": [{"a": null, "b": 1}, null, 3]});
        assert_eq!(
            strip_empty_keys(input),
            json!({"items": [{"b": 1}, null, 3]})
        );
    }

    #[test]
    fn empty_nested_object_survives() {
        let input = json!({"recipient": {"name": null, "email": null}});
        assert_eq!(strip_empty_keys(input), json!({"recipient": {}}));
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(strip_empty_keys(json!(null)), json!(null));
        assert_eq!(strip_empty_keys(json!("text")), json!("text"));
    }
}
