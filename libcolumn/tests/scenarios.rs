//! End-to-end scenarios through the public API.

use std::collections::HashMap;

use libcolumn::{
    lex, load, load_with_options, parse, tokenize, EmptyEnv, Error, ErrorCode, IndentPolicy,
    LexOptions, ParseOptions, Scalar, SyntaxNode, TokenKind, Value, ValueNode, ValueType,
};

fn lexed_kinds(source: &str) -> Vec<TokenKind> {
    lex(tokenize(source).unwrap())
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn env(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_flat_key_values() {
    use TokenKind as K;

    let source = "name: John Doe\nage: 30";
    let tokens = tokenize(source).unwrap();
    let summary: Vec<(TokenKind, &str)> = tokens
        .iter()
        .map(|t| match t.kind {
            K::Key | K::Value => (t.kind, t.text.as_str()),
            kind => (kind, ""),
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            (K::Key, "name"),
            (K::Colon, ""),
            (K::Value, "John Doe"),
            (K::Newline, ""),
            (K::Key, "age"),
            (K::Colon, ""),
            (K::Value, "30"),
            (K::Newline, ""),
            (K::Eof, ""),
        ]
    );

    let doc = parse(source).unwrap();
    match &doc.children[1] {
        SyntaxNode::KeyValue(kv) => match &kv.value {
            Some(ValueNode::Scalar(typed)) => {
                assert_eq!(typed.value_type, ValueType::Number);
                assert_eq!(typed.scalar, Scalar::Integer(30));
            }
            other => panic!("expected a scalar, got {:?}", other),
        },
        other => panic!("expected a key-value, got {:?}", other),
    }

    let value = load(source, &EmptyEnv).unwrap().into_value();
    assert_eq!(value.get("name"), Some(&Value::from("John Doe")));
    assert_eq!(value.get("age"), Some(&Value::Integer(30)));
}

#[test]
fn test_list_under_key() {
    use TokenKind as K;

    let source = "fruits:\n  - apple\n  - banana";
    let kinds = lexed_kinds(source);
    assert_eq!(
        kinds,
        vec![
            K::Key,
            K::Colon,
            K::Newline,
            K::Indent,
            K::ListItem,
            K::Value,
            K::Newline,
            K::ListItem,
            K::Value,
            K::Newline,
            K::Dedent,
            K::Eof,
        ]
    );

    let value = load(source, &EmptyEnv).unwrap().into_value();
    assert_eq!(
        value.get("fruits"),
        Some(&Value::Array(vec!["apple".into(), "banana".into()]))
    );
}

#[test]
fn test_preserved_multiline() {
    let source = "description: |\n  Line 1\n  Line 2";
    let tokens = lex(tokenize(source).unwrap()).unwrap();

    let start = tokens
        .iter()
        .find(|t| t.kind == TokenKind::MultilineStart)
        .unwrap();
    assert_eq!(start.text, "|");
    let lines: Vec<&str> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::MultilineString)
        .map(|t| t.text.as_str())
        .collect();
    assert_eq!(lines, vec!["Line 1", "Line 2"]);
    assert_eq!(
        tokens
            .iter()
            .filter(|t| t.kind == TokenKind::MultilineEnd)
            .count(),
        1
    );

    let value = load(source, &EmptyEnv).unwrap().into_value();
    assert_eq!(value.get("description"), Some(&Value::from("Line 1\nLine 2")));
}

#[test]
fn test_folded_multiline() {
    let value = load("note: <\n  a\n  b", &EmptyEnv).unwrap().into_value();
    assert_eq!(value.get("note"), Some(&Value::from("a b")));
}

#[test]
fn test_namespace_with_sections_fails_before_statements() {
    // The undefined variable would fail interpretation if statements ran.
    let err = load("@- ns\n@/ sec\nhost: $_UNDEFINED_HOST", &EmptyEnv).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
    assert_eq!(err.code(), ErrorCode::NamespaceAndSections);
    assert_eq!(err.position().line, 2);

    // Declaration order errors are not reported first either.
    let err = parse("a: 1\n@- ns\n@/ sec").unwrap_err();
    assert_eq!(err.code(), ErrorCode::NamespaceAndSections);
}

#[test]
fn test_env_default_and_override() {
    let source = "host: $_HOST || localhost";

    let value = load(source, &EmptyEnv).unwrap().into_value();
    assert_eq!(value.get("host"), Some(&Value::from("localhost")));

    let value = load(source, &env(&[("HOST", "x")])).unwrap().into_value();
    assert_eq!(value.get("host"), Some(&Value::from("x")));
}

#[test]
fn test_error_display() {
    let err = parse("items:\n  - a\n  b: 1").unwrap_err();
    let text = err.to_string();
    assert!(
        text.starts_with("MIXED_BLOCK at line 3, column 3: "),
        "unexpected message: {}",
        text
    );
}

#[test]
fn test_annotation_mismatch_is_a_warning() {
    let result = load("port: {INT} eighty", &EmptyEnv).unwrap();
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].position.line, 1);
    let value = result.into_value();
    assert_eq!(value.get("port"), Some(&Value::from("eighty")));
}

#[test]
fn test_sections_are_separate_outputs() {
    let source = "/! (c) Example\n@/ dev\nurl: a\n@/ prod\nurl: b\n";
    let result = load(source, &EmptyEnv).unwrap();
    assert_eq!(result.notices, vec!["(c) Example".to_string()]);
    assert_eq!(result.outputs.len(), 2);
    assert_eq!(
        result.section("prod").and_then(|v| v.get("url")),
        Some(&Value::from("b"))
    );
}

#[test]
fn test_namespace_is_reported() {
    let result = load("@- com.example\na: 1", &EmptyEnv).unwrap();
    assert_eq!(result.namespace.as_deref(), Some("com.example"));
    assert!(!result.is_sectioned());
}

fn object(entries: Vec<(&str, Value)>) -> Value {
    Value::Object(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

#[test]
fn test_multiline_value_in_list_item_object() {
    let source = "items:\n  - text: |\n      a\n      b\n    other: 1\n";
    let value = load(source, &EmptyEnv).unwrap().into_value();
    let expected = object(vec![(
        "items",
        Value::Array(vec![object(vec![
            ("text", "a\nb".into()),
            ("other", Value::Integer(1)),
        ])]),
    )]);
    assert_eq!(value, expected);

    let folded = "items:\n  - text: <\n      a\n      b\n    other: 1\n";
    let value = load(folded, &EmptyEnv).unwrap().into_value();
    assert_eq!(value.pointer("items.0.text"), Some(&Value::from("a b")));
    assert_eq!(value.pointer("items.0.other"), Some(&Value::Integer(1)));
}

#[test]
fn test_round_down_keeps_siblings_in_place() {
    let options = ParseOptions {
        lex: LexOptions {
            indent_policy: IndentPolicy::RoundDown,
        },
    };
    let source = "a:\n  b:\n      c: 1\n    d: 2\n  e: 3\n";
    let value = load_with_options(source, &EmptyEnv, &options)
        .unwrap()
        .into_value();
    let expected = object(vec![(
        "a",
        object(vec![
            ("b", object(vec![("c", Value::Integer(1))])),
            ("d", Value::Integer(2)),
            ("e", Value::Integer(3)),
        ]),
    )]);
    assert_eq!(value, expected);
}

#[test]
fn test_slash_equals_in_plain_value() {
    let value = load("ratio: a /= b\n", &EmptyEnv).unwrap().into_value();
    assert_eq!(value.get("ratio"), Some(&Value::from("a /= b")));
}
