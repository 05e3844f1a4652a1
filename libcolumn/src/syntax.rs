//! The syntax tree produced by the parser.
//!
//! The tree strictly owns its children and is not mutated after parsing.

use crate::error::Warning;
use crate::multiline::MultilineFormat;
use crate::position::Position;
use crate::types::TypedValue;

/// A parsed Column document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// `/!` notices from the document header.
    pub notices: Vec<Comment>,
    pub namespace: Option<NamespaceDecl>,
    /// Empty unless the document is divided into sections. A document never
    /// has both a namespace and sections.
    pub sections: Vec<SectionDecl>,
    /// Top-level statements of an unsectioned document.
    pub children: Vec<SyntaxNode>,
    /// Recoverable problems found while parsing.
    pub warnings: Vec<Warning>,
}

impl Document {
    pub fn is_sectioned(&self) -> bool {
        !self.sections.is_empty()
    }
}

/// Discriminant of every node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    KeyValue,
    Value,
    ListItem,
    MultilineString,
    Comment,
    TodoComment,
    Notice,
    NamespaceDecl,
    SectionDecl,
    EnvVarRef,
    RawContent,
}

/// A statement inside a block.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxNode {
    KeyValue(KeyValue),
    ListItem(ListItem),
    Comment(Comment),
    TodoComment(Comment),
}

impl SyntaxNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            SyntaxNode::KeyValue(_) => NodeKind::KeyValue,
            SyntaxNode::ListItem(_) => NodeKind::ListItem,
            SyntaxNode::Comment(_) => NodeKind::Comment,
            SyntaxNode::TodoComment(_) => NodeKind::TodoComment,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            SyntaxNode::KeyValue(kv) => kv.position,
            SyntaxNode::ListItem(item) => item.position,
            SyntaxNode::Comment(c) | SyntaxNode::TodoComment(c) => c.position,
        }
    }

    /// Comments carry no data.
    pub fn is_comment(&self) -> bool {
        matches!(self, SyntaxNode::Comment(_) | SyntaxNode::TodoComment(_))
    }
}

/// `key: value`, optionally followed by an indented block.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: Option<ValueNode>,
    /// The indented block. When present it is authoritative over `value`.
    pub children: Vec<SyntaxNode>,
    pub position: Position,
}

/// What can follow a colon on the same line.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueNode {
    Scalar(TypedValue),
    Multiline(MultilineString),
    EnvVar(EnvVarRef),
    Raw(RawContent),
}

impl ValueNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            ValueNode::Scalar(_) => NodeKind::Value,
            ValueNode::Multiline(_) => NodeKind::MultilineString,
            ValueNode::EnvVar(_) => NodeKind::EnvVarRef,
            ValueNode::Raw(_) => NodeKind::RawContent,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            ValueNode::Scalar(v) => v.position,
            ValueNode::Multiline(m) => m.position,
            ValueNode::EnvVar(e) => e.position,
            ValueNode::Raw(r) => r.position,
        }
    }
}

/// `- ...`
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub value: ListItemValue,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListItemValue {
    /// `- value`. A bare `-` holds a null scalar.
    Value(ValueNode),
    /// `- key: value`
    KeyValue(KeyValue),
    /// `- - value`, or a bare `-` followed by an indented block.
    Nested(Vec<SyntaxNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultilineString {
    pub format: MultilineFormat,
    /// Body lines joined with `\n`, before formatting.
    pub content: String,
    pub position: Position,
}

/// A comment, TODO comment or notice, without its marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub content: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub name: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionDecl {
    pub name: String,
    pub children: Vec<SyntaxNode>,
    pub position: Position,
}

/// `$_NAME || default`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVarRef {
    pub name: String,
    pub default_value: Option<String>,
    pub position: Position,
}

/// Backtick-delimited content, verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContent {
    pub content: String,
    pub position: Position,
}
