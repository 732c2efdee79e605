//! URL-form encoding of structured request bodies.
//!
//! Nested mappings are flattened to bracket keys (`meta[lang]=en`) and
//! arrays of scalars to repeated keys (`tags=a&tags=b`). Arrays that contain
//! arrays or objects have no unambiguous flat form and are rejected.

use serde_json::Value;

use crate::error::ApiError;

/// Encode a mapping as `application/x-www-form-urlencoded`.
///
/// `null` encodes to the empty string. Any other non-object top-level value
/// is an encoding error.
pub fn encode(value: &Value) -> Result<String, ApiError> {
    let pairs = flatten(value)?;
    serde_urlencoded::to_string(&pairs).map_err(|e| ApiError::Encoding(e.to_string()))
}

/// Flatten a mapping into ordered key/value pairs, before percent-encoding.
pub fn flatten(value: &Value) -> Result<Vec<(String, String)>, ApiError> {
    let mut pairs = Vec::new();
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, value) in map {
                flatten_into(&mut pairs, key.clone(), value)?;
            }
        }
        other => {
            return Err(ApiError::Encoding(format!(
                "form body must be a mapping, got {}",
                type_name(other)
            )));
        }
    }
    Ok(pairs)
}

fn flatten_into(pairs: &mut Vec<(String, String)>, key: String, value: &Value) -> Result<(), ApiError> {
    match value {
        Value::Object(map) => {
            for (child, value) in map {
                flatten_into(pairs, format!("{key}[{child}]"), value)?;
            }
        }
        Value::Array(items) => {
            for item in items {
                if matches!(item, Value::Array(_) | Value::Object(_)) {
                    return Err(ApiError::Encoding(format!(
                        "`{key}` holds an {} inside an array",
                        type_name(item)
                    )));
                }
                flatten_into(pairs, key.clone(), item)?;
            }
        }
        Value::Null => pairs.push((key, String::new())),
        Value::Bool(b) => pairs.push((key, b.to_string())),
        Value::Number(n) => pairs.push((key, n.to_string())),
        Value::String(s) => pairs.push((key, s.clone())),
    }
    Ok(())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
