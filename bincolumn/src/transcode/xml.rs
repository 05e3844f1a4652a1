//! XML output for Column values.
//!
//! The document becomes a `<column>` root element (or the section name for
//! per-section output). Object entries become child elements named by their
//! key, or `<entry key="...">` when the key is not a valid XML name. Array
//! items become `<item>` elements. A `type` attribute records everything
//! that is not a string, so the output stays unambiguous.

use libcolumn::Value;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

/// Encode a value under a `<column>` root element.
pub fn encode(value: &Value) -> Result<String, String> {
    encode_with_root(value, "column")
}

/// Encode a value under a root element with the given name.
pub fn encode_with_root(value: &Value, root: &str) -> Result<String, String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| format!("XML encode error: {}", e))?;
    write_element(&mut writer, root, value)?;

    let bytes = writer.into_inner().into_inner();
    let mut text = String::from_utf8(bytes).map_err(|e| format!("XML encode error: {}", e))?;
    text.push('\n');
    Ok(text)
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    !name.to_ascii_lowercase().starts_with("xml")
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn type_name(value: &Value) -> Option<&'static str> {
    match value {
        Value::Null => Some("null"),
        Value::Bool(_) => Some("bool"),
        Value::Integer(_) => Some("integer"),
        Value::Float(_) => Some("float"),
        Value::String(_) => None,
        Value::Array(_) => Some("array"),
        Value::Object(_) => Some("object"),
    }
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &Value,
) -> Result<(), String> {
    let (tag, key) = if is_xml_name(name) {
        (name, None)
    } else {
        ("entry", Some(name))
    };

    let mut start = BytesStart::new(tag);
    if let Some(key) = key {
        start.push_attribute(("key", key));
    }
    if let Some(kind) = type_name(value) {
        start.push_attribute(("type", kind));
    }

    let text = match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Integer(n) => Some(n.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(arr) if arr.is_empty() => None,
        Value::Object(obj) if obj.is_empty() => None,
        Value::Array(arr) => {
            emit(writer, Event::Start(start))?;
            for item in arr {
                write_element(writer, "item", item)?;
            }
            return emit(writer, Event::End(BytesEnd::new(tag)));
        }
        Value::Object(obj) => {
            emit(writer, Event::Start(start))?;
            let mut keys: Vec<&String> = obj.keys().collect();
            keys.sort();
            for k in keys {
                write_element(writer, k, &obj[k])?;
            }
            return emit(writer, Event::End(BytesEnd::new(tag)));
        }
    };

    match text {
        None => emit(writer, Event::Empty(start)),
        Some(text) => {
            emit(writer, Event::Start(start))?;
            emit(writer, Event::Text(BytesText::new(&text)))?;
            emit(writer, Event::End(BytesEnd::new(tag)))
        }
    }
}

fn emit<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), String> {
    writer
        .write_event(event)
        .map_err(|e| format!("XML encode error: {}", e))
}
