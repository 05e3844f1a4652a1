//! JSON transcoding: convert between Column values and JSON text.
//!
//! Objects print with sorted keys. JSON has no NaN or infinities, so
//! non-finite floats are an error.

use libcolumn::Value;
use std::collections::HashMap;

/// Decode a JSON string into a Column value.
pub fn decode(input: &str) -> Result<Value, String> {
    let json: serde_json::Value =
        serde_json::from_str(input).map_err(|e| format!("JSON parse error: {}", e))?;
    Ok(json_to_value(&json))
}

/// Encode a Column value as pretty-printed JSON.
pub fn encode(value: &Value) -> Result<String, String> {
    let json = value_to_json(value)?;
    let mut text =
        serde_json::to_string_pretty(&json).map_err(|e| format!("JSON encode error: {}", e))?;
    text.push('\n');
    Ok(text)
}

fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(arr) => Value::Array(arr.iter().map(json_to_value).collect()),
        serde_json::Value::Object(map) => {
            let obj: HashMap<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), json_to_value(v)))
                .collect();
            Value::Object(obj)
        }
    }
}

fn value_to_json(value: &Value) -> Result<serde_json::Value, String> {
    match value {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Integer(n) => Ok(serde_json::Value::from(*n)),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| format!("JSON cannot represent the float {}", f)),
        Value::String(s) => Ok(serde_json::Value::String(s.clone())),
        Value::Array(arr) => {
            let items: Result<Vec<serde_json::Value>, String> =
                arr.iter().map(value_to_json).collect();
            Ok(serde_json::Value::Array(items?))
        }
        Value::Object(obj) => {
            let mut map = serde_json::Map::new();
            for (k, v) in obj {
                map.insert(k.clone(), value_to_json(v)?);
            }
            Ok(serde_json::Value::Object(map))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_sorted() {
        let value = Value::Object(
            [
                ("b".to_string(), Value::Integer(2)),
                ("a".to_string(), Value::Array(vec![Value::Null, 1.5.into()])),
            ]
            .into(),
        );
        assert_eq!(
            encode(&value).unwrap(),
            "{\n  \"a\": [\n    null,\n    1.5\n  ],\n  \"b\": 2\n}\n"
        );
    }

    #[test]
    fn test_non_finite_float_is_rejected() {
        assert!(encode(&Value::Float(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_decode() {
        let value = decode(r#"{"n": 3, "f": 2.5, "s": "x", "l": [true]}"#).unwrap();
        assert_eq!(value.get("n"), Some(&Value::Integer(3)));
        assert_eq!(value.get("f"), Some(&Value::Float(2.5)));
        assert_eq!(value.get("s"), Some(&Value::from("x")));
        assert_eq!(value.get("l"), Some(&Value::Array(vec![Value::Bool(true)])));
    }
}
