//! TOML transcoding: convert between Column values and TOML text.
//!
//! Mapping from TOML to Column:
//!   - TOML string         -> Value::String
//!   - TOML integer        -> Value::Integer
//!   - TOML float          -> Value::Float
//!   - TOML boolean        -> Value::Bool
//!   - TOML array          -> Value::Array
//!   - TOML table          -> Value::Object
//!   - TOML datetime       -> Value::String (ISO 8601 representation)
//!
//! Lossy edges:
//!   - TOML has no null type; Column nulls cause an error.
//!   - TOML requires the top-level value to be a table.
//!   - Objects inside arrays become inline tables.

use libcolumn::Value;
use std::collections::HashMap;
use toml_edit::DocumentMut;

/// Decode a TOML string into a Column value.
pub fn decode(input: &str) -> Result<Value, String> {
    let doc: DocumentMut = input
        .parse::<DocumentMut>()
        .map_err(|e| format!("TOML parse error: {}", e))?;
    Ok(toml_table_to_value(doc.as_table()))
}

/// Encode a Column value as a TOML string.
pub fn encode(value: &Value) -> Result<String, String> {
    match value {
        Value::Object(obj) => {
            let mut doc = DocumentMut::new();
            for k in sorted_keys(obj) {
                doc[k.as_str()] = value_to_item(&obj[k])?;
            }
            Ok(doc.to_string())
        }
        _ => Err("TOML requires the top-level value to be a table/object".to_string()),
    }
}

fn sorted_keys(obj: &HashMap<String, Value>) -> Vec<&String> {
    let mut keys: Vec<&String> = obj.keys().collect();
    keys.sort();
    keys
}

fn toml_table_to_value(table: &toml_edit::Table) -> Value {
    let obj = table
        .iter()
        .map(|(key, item)| (key.to_string(), toml_item_to_value(item)))
        .collect();
    Value::Object(obj)
}

fn toml_item_to_value(item: &toml_edit::Item) -> Value {
    match item {
        toml_edit::Item::Value(v) => toml_value_to_column(v),
        toml_edit::Item::Table(t) => toml_table_to_value(t),
        toml_edit::Item::ArrayOfTables(arr) => {
            Value::Array(arr.iter().map(toml_table_to_value).collect())
        }
        toml_edit::Item::None => Value::Null,
    }
}

fn toml_value_to_column(v: &toml_edit::Value) -> Value {
    match v {
        toml_edit::Value::String(s) => Value::String(s.value().clone()),
        toml_edit::Value::Integer(i) => Value::Integer(*i.value()),
        toml_edit::Value::Float(f) => Value::Float(*f.value()),
        toml_edit::Value::Boolean(b) => Value::Bool(*b.value()),
        toml_edit::Value::Datetime(dt) => Value::String(dt.value().to_string()),
        toml_edit::Value::Array(arr) => Value::Array(arr.iter().map(toml_value_to_column).collect()),
        toml_edit::Value::InlineTable(table) => Value::Object(
            table
                .iter()
                .map(|(key, val)| (key.to_string(), toml_value_to_column(val)))
                .collect(),
        ),
    }
}

fn value_to_item(value: &Value) -> Result<toml_edit::Item, String> {
    match value {
        Value::Object(obj) => {
            let mut table = toml_edit::Table::new();
            for k in sorted_keys(obj) {
                table.insert(k, value_to_item(&obj[k])?);
            }
            Ok(toml_edit::Item::Table(table))
        }
        other => Ok(toml_edit::Item::Value(value_to_toml(other)?)),
    }
}

fn value_to_toml(value: &Value) -> Result<toml_edit::Value, String> {
    match value {
        Value::Null => Err("TOML has no null type".to_string()),
        Value::Bool(b) => Ok(toml_edit::Value::Boolean(toml_edit::Formatted::new(*b))),
        Value::Integer(n) => Ok(toml_edit::Value::Integer(toml_edit::Formatted::new(*n))),
        Value::Float(f) => Ok(toml_edit::Value::Float(toml_edit::Formatted::new(*f))),
        Value::String(s) => Ok(toml_edit::Value::String(toml_edit::Formatted::new(
            s.clone(),
        ))),
        Value::Array(arr) => {
            let mut toml_arr = toml_edit::Array::new();
            for v in arr {
                toml_arr.push(value_to_toml(v)?);
            }
            Ok(toml_edit::Value::Array(toml_arr))
        }
        Value::Object(obj) => {
            let mut inline = toml_edit::InlineTable::new();
            for k in sorted_keys(obj) {
                inline.insert(k.as_str(), value_to_toml(&obj[k])?);
            }
            Ok(toml_edit::Value::InlineTable(inline))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(entries: Vec<(&str, Value)>) -> Value {
        Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    #[test]
    fn test_encode_tables() {
        let value = obj(vec![
            ("name", "app".into()),
            ("server", obj(vec![("port", 8080i64.into())])),
        ]);
        let text = encode(&value).unwrap();
        assert!(text.starts_with("name = \"app\"\n"), "{}", text);
        assert!(text.contains("[server]\nport = 8080\n"), "{}", text);
        assert_eq!(decode(&text).unwrap(), value);
    }

    #[test]
    fn test_objects_in_arrays_are_inline() {
        let value = obj(vec![(
            "people",
            Value::Array(vec![obj(vec![("name", "Ann".into())])]),
        )]);
        let text = encode(&value).unwrap();
        assert_eq!(decode(&text).unwrap(), value);
    }

    #[test]
    fn test_null_is_rejected() {
        let value = obj(vec![("a", Value::Null)]);
        assert!(encode(&value).is_err());
        assert!(encode(&Value::Array(vec![])).is_err());
    }

    #[test]
    fn test_decode() {
        let value = decode("title = \"x\"\n[db]\nport = 5432\n").unwrap();
        assert_eq!(value.pointer("db.port"), Some(&Value::Integer(5432)));
        assert_eq!(value.get("title"), Some(&Value::from("x")));
    }
}
