//! Encode values back to Column text.
//!
//! Keys are written in sorted order. Strings that would be read back as
//! another type (or as syntax) are quoted, and empty containers use type
//! annotations, so decoding the output yields the same value.

use crate::tokenizer::{is_comment_lead_in, is_key_char, starts_key_value};
use crate::types::{detect_type, ScalarType};
use crate::Value;
use std::collections::HashMap;

/// Encode a value as Column text.
///
/// Non-empty objects and arrays become documents. Any other value becomes
/// a single scalar literal, which is not a document on its own.
pub fn encode(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Object(obj) => write_object(obj, 0, &mut out),
        Value::Array(arr) if !arr.is_empty() => write_array(arr, 0, &mut out),
        _ => {
            out.push_str(&encode_scalar(value));
            out.push('\n');
        }
    }
    out
}

fn sorted_keys(obj: &HashMap<String, Value>) -> Vec<&String> {
    let mut keys: Vec<&String> = obj.keys().collect();
    keys.sort();
    keys
}

fn is_block_value(v: &Value) -> bool {
    match v {
        Value::Array(arr) => !arr.is_empty(),
        Value::Object(obj) => !obj.is_empty(),
        _ => false,
    }
}

fn write_object(obj: &HashMap<String, Value>, indent: usize, out: &mut String) {
    for key in sorted_keys(obj) {
        write_entry(key, &obj[key], indent, out);
    }
}

fn write_entry(key: &str, value: &Value, indent: usize, out: &mut String) {
    out.push_str(&"  ".repeat(indent));
    out.push_str(&encode_key(key));
    out.push(':');
    write_value(value, indent, out);
}

/// The rest of a line after `key:` or `-`: an inline scalar, or a newline
/// and an indented block.
fn write_value(value: &Value, indent: usize, out: &mut String) {
    match value {
        Value::Object(obj) if !obj.is_empty() => {
            out.push('\n');
            write_object(obj, indent + 1, out);
        }
        Value::Array(arr) if !arr.is_empty() => {
            out.push('\n');
            write_array(arr, indent + 1, out);
        }
        _ => {
            out.push(' ');
            out.push_str(&encode_scalar(value));
            out.push('\n');
        }
    }
}

fn write_array(arr: &[Value], indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    for item in arr {
        out.push_str(&pad);
        out.push('-');
        match item {
            Value::Object(obj) if !obj.is_empty() => {
                let keys = sorted_keys(obj);
                match keys.first() {
                    // `- key: scalar` with the other pairs continuing the item.
                    Some(first) if !is_block_value(&obj[*first]) => {
                        out.push(' ');
                        out.push_str(&encode_key(first));
                        out.push(':');
                        write_value(&obj[*first], indent, out);
                        for key in &keys[1..] {
                            write_entry(key, &obj[*key], indent + 1, out);
                        }
                    }
                    _ => {
                        out.push_str(" \n");
                        write_object(obj, indent + 1, out);
                    }
                }
            }
            Value::Array(inner) if !inner.is_empty() => {
                out.push_str(" \n");
                write_array(inner, indent + 1, out);
            }
            _ => {
                out.push(' ');
                out.push_str(&encode_scalar(item));
                out.push('\n');
            }
        }
    }
}

/// A value written inline after `key:` or `- `.
fn encode_scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Float(f) => {
            if !f.is_finite() {
                "null".to_string()
            } else {
                let s = format!("{}", f);
                if s.contains('.') {
                    s
                } else {
                    format!("{}.0", s)
                }
            }
        }
        Value::String(s) => {
            if needs_quotes(s) {
                quote(s)
            } else {
                s.clone()
            }
        }
        Value::Array(_) => "{ARRAY}".to_string(),
        Value::Object(_) => "{OBJECT}".to_string(),
    }
}

/// Whether a bare string would be read back as something else.
fn needs_quotes(s: &str) -> bool {
    if s.is_empty() || s.trim() != s || detect_type(s) != ScalarType::String {
        return true;
    }
    if s.chars().any(|c| c.is_control()) {
        return true;
    }
    const LEADS: [&str; 6] = ["\"", "`", "$_", "{", "|", "<"];
    if LEADS.iter().any(|lead| s.starts_with(lead)) || is_comment_lead_in(s) {
        return true;
    }
    // List items re-read `- x` as a nested list and `k: v` as a pair.
    if s.starts_with("- ") || starts_key_value(s) {
        return true;
    }
    s.char_indices()
        .any(|(i, c)| matches!(c, ' ' | '\t') && is_comment_lead_in(&s[i + 1..]))
}

fn quote(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

fn encode_key(key: &str) -> String {
    let mut chars = key.chars();
    let bare = match chars.next() {
        Some(first) => (first.is_ascii_alphanumeric() || first == '_') && chars.all(is_key_char),
        None => false,
    };
    if bare {
        key.to_string()
    } else {
        quote(key)
    }
}
