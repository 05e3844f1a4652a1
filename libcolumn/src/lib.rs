//! Column configuration language.
//!
//! Column is an indentation-significant configuration format with typed
//! scalars, multiline strings, environment references, and an optional
//! namespace or named sections.
//!
//! # Pipeline
//!
//! Processing runs in forward-only phases:
//!
//! 1. **Tokenizer**: Converts source text into a flat token stream with
//!    exact positions.
//!
//! 2. **Indentation Lexer**: Inserts `Indent`/`Dedent` tokens from line
//!    indentation and segments multiline bodies.
//!
//! 3. **Parser**: Builds a `Document` tree by recursive descent.
//!
//! 4. **Type Resolution**: Classifies scalar text and applies `{TYPE}`
//!    annotations. The parser runs it on every value token.
//!
//! 5. **Interpreter**: Evaluates the tree to plain `Value`s, resolving
//!    environment references and multiline formats.

mod encode;
mod env;
mod error;
mod interpreter;
mod lexer;
mod multiline;
mod parser;
mod position;
mod syntax;
mod token;
mod tokenizer;
mod types;
mod value;

pub use encode::encode;
pub use env::{EmptyEnv, EnvProvider, ProcessEnv};
pub use error::{Error, ErrorCode, Result, Warning};
pub use interpreter::{interpret, scalar_value, Interpretation, Output};
pub use lexer::{lex, lex_with_options, IndentPolicy, LexOptions};
pub use multiline::{apply_format, MultilineFormat};
pub use parser::parse_tokens;
pub use position::Position;
pub use syntax::{
    Comment, Document, EnvVarRef, KeyValue, ListItem, ListItemValue, MultilineString,
    NamespaceDecl, NodeKind, RawContent, SectionDecl, SyntaxNode, ValueNode,
};
pub use token::{Token, TokenKind};
pub use tokenizer::tokenize;
pub use types::{
    auto_detect, detect_type, resolve, DateTimeValue, Scalar, ScalarType, TypedValue, ValueType,
};
pub use value::Value;

/// Options for the whole pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub lex: LexOptions,
}

/// Parse Column source into a document.
///
/// # Example
///
/// ```
/// use libcolumn::parse;
///
/// let doc = parse("name: John Doe\nage: 30").unwrap();
/// assert_eq!(doc.children.len(), 2);
/// ```
pub fn parse(source: &str) -> Result<Document> {
    parse_with_options(source, &ParseOptions::default())
}

/// Parse Column source into a document with explicit options.
pub fn parse_with_options(source: &str, options: &ParseOptions) -> Result<Document> {
    // Phase 1: Split source into tokens
    let tokens = tokenize(source)?;

    // Phase 2: Make block structure explicit
    let tokens = lex_with_options(tokens, &options.lex)?;

    // Phase 3: Build the tree, typing scalars along the way
    parse_tokens(&tokens)
}

/// Parse and interpret Column source.
///
/// # Example
///
/// ```
/// use libcolumn::{load, EmptyEnv, Value};
///
/// let value = load("port: $_PORT || 8080", &EmptyEnv).unwrap().into_value();
/// assert_eq!(value.get("port"), Some(&Value::Integer(8080)));
/// ```
pub fn load(source: &str, env: &dyn EnvProvider) -> Result<Interpretation> {
    load_with_options(source, env, &ParseOptions::default())
}

/// Parse and interpret Column source with explicit options.
pub fn load_with_options(
    source: &str,
    env: &dyn EnvProvider,
    options: &ParseOptions,
) -> Result<Interpretation> {
    let doc = parse_with_options(source, options)?;
    interpret(&doc, env)
}
