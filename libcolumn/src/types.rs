//! Phase 4: Type Resolution
//!
//! Scalar text is classified by an ordered, first-match set of rules:
//! null, boolean, integer, float, date, time, datetime, duration, and
//! finally string. A leading `{TYPE}` annotation overrides detection; an
//! annotation that does not fit its text is advisory only and produces a
//! warning.

use crate::error::Warning;
use crate::position::Position;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use tracing::warn;

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+$").unwrap());

static FLOAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+\.[0-9]+$").unwrap());

static DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());

static TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{2}:[0-9]{2}(:[0-9]{2})?$").unwrap());

static DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[0-9]{4}-[0-9]{2}-[0-9]{2}[T ][0-9]{2}:[0-9]{2}(:[0-9]{2}(\.[0-9]+)?)?(Z|[+-][0-9]{2}:?[0-9]{2})?$",
    )
    .unwrap()
});

static DURATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+[hmsd]([0-9]+[hmsd])*$").unwrap());

static ANNOTATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\{([A-Z]+)\}").unwrap());

const DATETIME_OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];
const DATETIME_NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// The result of scalar classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Null,
    Boolean,
    Integer,
    Float,
    Date,
    Time,
    DateTime,
    Duration,
    String,
}

/// Classify scalar text. Pure and deterministic; surrounding whitespace is
/// ignored.
pub fn detect_type(text: &str) -> ScalarType {
    let text = text.trim();
    match text {
        "" | "null" | "?" => ScalarType::Null,
        "true" | "false" | "!!" | "!" => ScalarType::Boolean,
        _ if INTEGER.is_match(text) => ScalarType::Integer,
        _ if FLOAT.is_match(text) => ScalarType::Float,
        _ if DATE.is_match(text) => ScalarType::Date,
        _ if TIME.is_match(text) => ScalarType::Time,
        _ if DATETIME.is_match(text) => ScalarType::DateTime,
        _ if DURATION.is_match(text) => ScalarType::Duration,
        _ => ScalarType::String,
    }
}

/// The coarse type tag carried by value nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Null,
    Date,
    Time,
    Complex,
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Null => "null",
            ValueType::Date => "date",
            ValueType::Time => "time",
            ValueType::Complex => "complex",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A date and time, with or without a UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeValue {
    Naive(NaiveDateTime),
    Offset(DateTime<FixedOffset>),
}

impl DateTimeValue {
    pub fn to_iso_string(&self) -> String {
        match self {
            DateTimeValue::Naive(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            DateTimeValue::Offset(dt) => dt.to_rfc3339(),
        }
    }
}

/// A resolved scalar payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(DateTimeValue),
    /// Kept verbatim, e.g. `1h30m`.
    Duration(String),
    String(String),
    /// From an `{ARRAY}` annotation.
    Array(Vec<Scalar>),
    /// From an `{OBJECT}` annotation.
    EmptyObject,
}

impl Scalar {
    pub fn value_type(&self) -> ValueType {
        match self {
            Scalar::Null => ValueType::Null,
            Scalar::Bool(_) => ValueType::Boolean,
            Scalar::Integer(_) | Scalar::Float(_) => ValueType::Number,
            Scalar::Date(_) | Scalar::DateTime(_) => ValueType::Date,
            Scalar::Time(_) => ValueType::Time,
            Scalar::Duration(_) | Scalar::String(_) => ValueType::String,
            Scalar::Array(_) | Scalar::EmptyObject => ValueType::Complex,
        }
    }
}

/// A scalar together with its type tag and source position.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    pub value_type: ValueType,
    pub scalar: Scalar,
    pub position: Position,
}

impl TypedValue {
    pub fn new(scalar: Scalar, position: Position) -> Self {
        Self {
            value_type: scalar.value_type(),
            scalar,
            position,
        }
    }
}

/// Resolve the text of a value token, honoring a leading `{TYPE}`
/// annotation.
pub fn resolve(raw: &str, position: Position) -> (TypedValue, Vec<Warning>) {
    let text = raw.trim();
    let mut warnings = Vec::new();

    let scalar = match ANNOTATION.captures(text) {
        Some(caps) => {
            let name = caps.get(1).map_or("", |m| m.as_str());
            let rest = text[caps.get(0).map_or(0, |m| m.end())..].trim();
            match annotated(name, rest) {
                Ok(scalar) => scalar,
                Err(reason) => {
                    let warning =
                        Warning::new(format!("{{{}}} annotation ignored: {}", name, reason), position);
                    warn!("{}", warning);
                    warnings.push(warning);
                    auto_detect(rest)
                }
            }
        }
        None => auto_detect(text),
    };

    (TypedValue::new(scalar, position), warnings)
}

/// Resolve unannotated scalar text. A value wrapped in double quotes is a
/// string with its escapes applied.
pub fn auto_detect(text: &str) -> Scalar {
    let text = text.trim();
    if let Some(unquoted) = unquote(text) {
        return Scalar::String(unquoted);
    }
    convert(text, detect_type(text))
}

fn convert(text: &str, kind: ScalarType) -> Scalar {
    let string = || Scalar::String(text.to_string());
    match kind {
        ScalarType::Null => Scalar::Null,
        ScalarType::Boolean => Scalar::Bool(matches!(text, "true" | "!!")),
        ScalarType::Integer => match text.parse::<i64>() {
            Ok(n) => Scalar::Integer(n),
            Err(_) => text.parse::<f64>().map_or_else(|_| string(), Scalar::Float),
        },
        ScalarType::Float => text.parse::<f64>().map_or_else(|_| string(), Scalar::Float),
        ScalarType::Date => parse_date(text).map_or_else(string, Scalar::Date),
        ScalarType::Time => parse_time(text).map_or_else(string, Scalar::Time),
        ScalarType::DateTime => parse_datetime(text).map_or_else(string, Scalar::DateTime),
        ScalarType::Duration => Scalar::Duration(text.to_string()),
        ScalarType::String => string(),
    }
}

fn annotated(name: &str, text: &str) -> Result<Scalar, String> {
    let detected = detect_type(text);
    match name {
        "STRING" => Ok(Scalar::String(
            unquote(text).unwrap_or_else(|| text.to_string()),
        )),
        "NUMBER" => match detected {
            ScalarType::Integer | ScalarType::Float => Ok(convert(text, detected)),
            _ => Err(format!("{:?} is not a number", text)),
        },
        "INT" => text
            .parse::<i64>()
            .map(Scalar::Integer)
            .map_err(|_| format!("{:?} is not an integer", text)),
        "FLOAT" => match detected {
            ScalarType::Integer | ScalarType::Float => text
                .parse::<f64>()
                .map(Scalar::Float)
                .map_err(|e| format!("{:?} is not a float: {}", text, e)),
            _ => Err(format!("{:?} is not a float", text)),
        },
        "BOOL" => match text {
            "true" | "!!" => Ok(Scalar::Bool(true)),
            "false" | "!" => Ok(Scalar::Bool(false)),
            _ => Err(format!("{:?} is not a boolean", text)),
        },
        "NULL" => match detected {
            ScalarType::Null => Ok(Scalar::Null),
            _ => Err(format!("{:?} is not null", text)),
        },
        "DATE" => parse_date(text)
            .map(Scalar::Date)
            .ok_or_else(|| format!("{:?} is not a date", text)),
        "TIME" => parse_time(text)
            .map(Scalar::Time)
            .ok_or_else(|| format!("{:?} is not a time", text)),
        "DATETIME" => parse_datetime(text)
            .map(Scalar::DateTime)
            .ok_or_else(|| format!("{:?} is not a datetime", text)),
        "DURATION" if DURATION.is_match(text) => Ok(Scalar::Duration(text.to_string())),
        "DURATION" => Err(format!("{:?} is not a duration", text)),
        "ARRAY" => Ok(Scalar::Array(parse_array(text))),
        "OBJECT" => match text {
            "" | "{}" => Ok(Scalar::EmptyObject),
            _ => Err("only an empty object can be written inline".to_string()),
        },
        _ => Err(format!("unknown type {:?}", name)),
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    if !DATE.is_match(text) {
        return None;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    if !TIME.is_match(text) {
        return None;
    }
    let format = if text.len() == 5 { "%H:%M" } else { "%H:%M:%S" };
    NaiveTime::parse_from_str(text, format).ok()
}

fn parse_datetime(text: &str) -> Option<DateTimeValue> {
    if !DATETIME.is_match(text) {
        return None;
    }
    let mut normalized = text.replacen(' ', "T", 1);
    if normalized.ends_with('Z') {
        normalized.pop();
        normalized.push_str("+00:00");
    }

    DATETIME_OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(&normalized, format).ok())
        .map(DateTimeValue::Offset)
        .or_else(|| {
            DATETIME_NAIVE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(&normalized, format).ok())
                .map(DateTimeValue::Naive)
        })
}

/// Comma-separated items, optionally wrapped in brackets.
fn parse_array(text: &str) -> Vec<Scalar> {
    let inner = text
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .unwrap_or(text)
        .trim();
    if inner.is_empty() {
        return Vec::new();
    }
    inner.split(',').map(auto_detect).collect()
}

/// The contents of a fully double-quoted value with `\n \t \r \" \\`
/// applied, or `None` when the text is not one quoted string.
pub(crate) fn unquote(text: &str) -> Option<String> {
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                other => out.push(other),
            },
            '"' => return None,
            c => out.push(c),
        }
    }
    Some(out)
}
