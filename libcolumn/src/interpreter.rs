//! Phase 5: Interpretation
//!
//! Walks a `Document` and produces plain values. Environment references
//! are resolved here, multiline content is formatted, and sections become
//! one output each.

use crate::env::EnvProvider;
use crate::error::{Error, ErrorCode, Result, Warning};
use crate::multiline::apply_format;
use crate::syntax::{
    Document, EnvVarRef, KeyValue, ListItem, ListItemValue, SyntaxNode, ValueNode,
};
use crate::types::{auto_detect, Scalar};
use crate::value::Value;
use std::collections::HashMap;
use tracing::debug;

/// One evaluated document body: the whole document, or one section.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    /// The section name, `None` for an unsectioned document.
    pub name: Option<String>,
    pub value: Value,
}

/// The result of interpreting a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub namespace: Option<String>,
    pub notices: Vec<String>,
    /// One output per section, in declaration order, or a single unnamed
    /// output.
    pub outputs: Vec<Output>,
    /// Warnings from parsing.
    pub warnings: Vec<Warning>,
}

impl Interpretation {
    pub fn is_sectioned(&self) -> bool {
        self.outputs.iter().any(|o| o.name.is_some())
    }

    /// The value of a section.
    pub fn section(&self, name: &str) -> Option<&Value> {
        self.outputs
            .iter()
            .find(|o| o.name.as_deref() == Some(name))
            .map(|o| &o.value)
    }

    /// Collapse the outputs into one value. Sections become the keys of an
    /// object.
    pub fn into_value(self) -> Value {
        if self.is_sectioned() {
            let sections = self
                .outputs
                .into_iter()
                .map(|o| (o.name.unwrap_or_default(), o.value))
                .collect();
            return Value::Object(sections);
        }
        self.outputs
            .into_iter()
            .next()
            .map_or_else(|| Value::Object(HashMap::new()), |o| o.value)
    }
}

/// Evaluate a parsed document.
pub fn interpret(doc: &Document, env: &dyn EnvProvider) -> Result<Interpretation> {
    let interpreter = Interpreter { env };

    let outputs = if doc.is_sectioned() {
        doc.sections
            .iter()
            .map(|section| {
                Ok(Output {
                    name: Some(section.name.clone()),
                    value: interpreter.block(&section.children)?,
                })
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        vec![Output {
            name: None,
            value: interpreter.block(&doc.children)?,
        }]
    };

    debug!("interpreted {} output(s)", outputs.len());
    Ok(Interpretation {
        namespace: doc.namespace.as_ref().map(|n| n.name.clone()),
        notices: doc.notices.iter().map(|n| n.content.clone()).collect(),
        outputs,
        warnings: doc.warnings.clone(),
    })
}

struct Interpreter<'e> {
    env: &'e dyn EnvProvider,
}

impl Interpreter<'_> {
    /// A block of list items is an array; a block of pairs is an object.
    fn block(&self, nodes: &[SyntaxNode]) -> Result<Value> {
        let is_list = nodes
            .iter()
            .find(|n| !n.is_comment())
            .map_or(false, |n| matches!(n, SyntaxNode::ListItem(_)));

        if is_list {
            let items = nodes
                .iter()
                .filter_map(|n| match n {
                    SyntaxNode::ListItem(item) => Some(self.list_item(item)),
                    _ => None,
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(Value::Array(items));
        }

        let mut object = HashMap::new();
        for node in nodes {
            if let SyntaxNode::KeyValue(kv) = node {
                if object.insert(kv.key.clone(), self.key_value(kv)?).is_some() {
                    debug!("key {:?} at {} replaces an earlier value", kv.key, kv.position);
                }
            }
        }
        Ok(Value::Object(object))
    }

    /// An indented block wins over an inline value.
    fn key_value(&self, kv: &KeyValue) -> Result<Value> {
        if !kv.children.is_empty() {
            return self.block(&kv.children);
        }
        match &kv.value {
            Some(value) => self.value(value),
            None => Ok(Value::Null),
        }
    }

    fn list_item(&self, item: &ListItem) -> Result<Value> {
        match &item.value {
            ListItemValue::Value(value) => self.value(value),
            ListItemValue::Nested(nodes) => self.block(nodes),
            ListItemValue::KeyValue(kv) => {
                let mut object = HashMap::new();
                let continues_item = kv.value.is_some()
                    && kv
                        .children
                        .iter()
                        .any(|c| matches!(c, SyntaxNode::KeyValue(_)));

                match (&kv.value, continues_item) {
                    // `- name: x` followed by sibling pairs of the same item.
                    (Some(value), true) => {
                        object.insert(kv.key.clone(), self.value(value)?);
                        for child in &kv.children {
                            if let SyntaxNode::KeyValue(sibling) = child {
                                object.insert(sibling.key.clone(), self.key_value(sibling)?);
                            }
                        }
                    }
                    _ => {
                        object.insert(kv.key.clone(), self.key_value(kv)?);
                    }
                }
                Ok(Value::Object(object))
            }
        }
    }

    fn value(&self, node: &ValueNode) -> Result<Value> {
        match node {
            ValueNode::Scalar(typed) => Ok(scalar_value(&typed.scalar)),
            ValueNode::Multiline(multiline) => Ok(Value::String(apply_format(
                multiline.format,
                &multiline.content,
            ))),
            ValueNode::EnvVar(env) => self.env_var(env),
            ValueNode::Raw(raw) => Ok(Value::String(raw.content.clone())),
        }
    }

    /// The environment value, else the default, auto-typed.
    fn env_var(&self, env: &EnvVarRef) -> Result<Value> {
        let text = match self.env.get(&env.name) {
            Some(text) => text,
            None => match &env.default_value {
                Some(default) => {
                    debug!("${} is not set, using its default", env.name);
                    default.clone()
                }
                None => {
                    return Err(Error::interpretation(
                        ErrorCode::UndefinedEnvVar,
                        format!(
                            "environment variable {} is not set and has no default",
                            env.name
                        ),
                        env.position,
                    ))
                }
            },
        };
        Ok(scalar_value(&auto_detect(&text)))
    }
}

/// Dates, times and durations become strings.
pub fn scalar_value(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Null => Value::Null,
        Scalar::Bool(b) => Value::Bool(*b),
        Scalar::Integer(n) => Value::Integer(*n),
        Scalar::Float(f) => Value::Float(*f),
        Scalar::Date(date) => Value::String(date.format("%Y-%m-%d").to_string()),
        Scalar::Time(time) => Value::String(time.format("%H:%M:%S").to_string()),
        Scalar::DateTime(dt) => Value::String(dt.to_iso_string()),
        Scalar::Duration(s) | Scalar::String(s) => Value::String(s.clone()),
        Scalar::Array(items) => Value::Array(items.iter().map(scalar_value).collect()),
        Scalar::EmptyObject => Value::Object(HashMap::new()),
    }
}
