//! Lenient decoding of service-account keys
//!
//! Keys arrive in whatever shape the caller's templating produced:
//! - an already-parsed mapping
//! - a JSON string
//! - a JSON string with escaped quotes (`{\"id\": \"x\"}`)
//! - any of the above wrapped in an extra pair of double quotes

use serde_json::Value;

use crate::error::{Error, Result};

/// Decode a raw key into a JSON value
pub fn decode_key(raw: &Value) -> Result<Value> {
    match raw {
        Value::Object(_) => Ok(raw.clone()),
        Value::String(s) => decode_str(s),
        other => Err(Error::MalformedInput {
            reason: format!("expected a mapping or a JSON string, got {}", type_name(other)),
        }),
    }
}

/// Decode a key given as text
///
/// JSON `null` decodes to nothing and is rejected like unparseable text.
pub fn decode_str(input: &str) -> Result<Value> {
    let cleaned = input.replace("\\\"", "\"").replace("\\'", "'");

    let first_err = match parse_non_null(&cleaned) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if let Some(inner) = cleaned
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
    {
        log::debug!("Retrying key decode without surrounding quotes");
        return parse_non_null(inner);
    }

    Err(first_err)
}

fn parse_non_null(text: &str) -> Result<Value> {
    match serde_json::from_str(text) {
        Ok(Value::Null) => Err(Error::MalformedInput {
            reason: "key decodes to null".to_string(),
        }),
        Ok(value) => Ok(value),
        Err(e) => Err(Error::MalformedInput {
            reason: e.to_string(),
        }),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
