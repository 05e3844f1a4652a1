//! Phase 3: Parser
//!
//! A recursive-descent parser over the indentation lexer's output. It
//! builds a `Document` in a single forward pass with one token of
//! lookahead:
//! - Header: notices, then a namespace or section declarations
//! - Statements: key-value pairs, list items, comments
//! - Values: typed scalars, multiline blocks, environment references,
//!   raw content
//!
//! The parser fails on the first structural error; there is no recovery.

use crate::error::{Error, ErrorCode, Result, Warning};
use crate::multiline::MultilineFormat;
use crate::position::Position;
use crate::syntax::{
    Comment, Document, EnvVarRef, KeyValue, ListItem, ListItemValue, MultilineString,
    NamespaceDecl, NodeKind, RawContent, SectionDecl, SyntaxNode, ValueNode,
};
use crate::token::{Token, TokenKind};
use crate::types::{resolve, Scalar, TypedValue};
use tracing::{debug, warn};

/// Build a document from lexed tokens.
pub fn parse_tokens(tokens: &[Token]) -> Result<Document> {
    Parser::new(tokens).parse_document()
}

/// Where a block of statements lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    /// The document body or a section. Ends at a declaration, a notice or
    /// end of input, which the document loop handles.
    TopLevel,
    /// An indented block. Ends at its `Dedent`.
    Nested,
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    warnings: Vec<Warning>,
    /// Returned by `peek` past the end of a stream without `Eof`.
    end: Token,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        let position = tokens.last().map_or(Position::start(), |t| t.position);
        Self {
            tokens,
            pos: 0,
            warnings: Vec::new(),
            end: Token::synthetic(TokenKind::Eof, "", position),
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.end)
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self, expected: &str) -> Error {
        let token = self.peek();
        let found = if token.text.is_empty() {
            token.kind.to_string()
        } else {
            format!("{} {:?}", token.kind, token.text)
        };
        Error::parse(
            ErrorCode::UnexpectedToken,
            format!("expected {}, found {}", expected, found),
            token.position,
        )
    }

    // ------------------------------------------------------------------
    // Document
    // ------------------------------------------------------------------

    fn parse_document(mut self) -> Result<Document> {
        self.check_declarations()?;

        let mut doc = Document::default();
        loop {
            let statements = self.parse_block(Block::TopLevel)?;
            match doc.sections.last_mut() {
                Some(section) => section.children.extend(statements),
                None => doc.children.extend(statements),
            }

            let token = self.peek().clone();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Notice => {
                    if doc.namespace.is_some()
                        || doc.is_sectioned()
                        || has_statements(&doc.children)
                    {
                        return Err(Error::parse(
                            ErrorCode::MisplacedNotice,
                            "notices must come before any declaration or statement",
                            token.position,
                        ));
                    }
                    self.bump();
                    doc.notices.push(comment(&token, "/!"));
                }
                TokenKind::NamespaceDeclaration => {
                    if doc.namespace.is_some() {
                        return Err(Error::parse(
                            ErrorCode::DuplicateNamespace,
                            "a document can declare only one namespace",
                            token.position,
                        ));
                    }
                    if has_statements(&doc.children) {
                        return Err(misplaced_declaration(&token));
                    }
                    self.bump();
                    let name = declaration_name(&token)?;
                    debug!("namespace {:?}", name);
                    doc.namespace = Some(NamespaceDecl {
                        name,
                        position: token.position,
                    });
                }
                TokenKind::SectionDeclaration => {
                    if !doc.is_sectioned() && has_statements(&doc.children) {
                        return Err(misplaced_declaration(&token));
                    }
                    self.bump();
                    let name = declaration_name(&token)?;
                    if doc.sections.iter().any(|s| s.name == name) {
                        return Err(Error::parse(
                            ErrorCode::DuplicateSection,
                            format!("section {:?} is already declared", name),
                            token.position,
                        ));
                    }
                    debug!("section {:?}", name);
                    doc.sections.push(SectionDecl {
                        name,
                        children: Vec::new(),
                        position: token.position,
                    });
                }
                _ => return Err(self.unexpected("a statement")),
            }
        }

        debug!(
            "parsed document: {} notices, {} sections, {} top-level nodes",
            doc.notices.len(),
            doc.sections.len(),
            doc.children.len()
        );
        doc.warnings = self.warnings;
        Ok(doc)
    }

    /// A namespace and sections never share a document. This is checked
    /// before any statement so the error does not depend on order.
    fn check_declarations(&self) -> Result<()> {
        let namespace = self
            .tokens
            .iter()
            .find(|t| t.kind == TokenKind::NamespaceDeclaration);
        let section = self
            .tokens
            .iter()
            .find(|t| t.kind == TokenKind::SectionDeclaration);

        if let (Some(namespace), Some(section)) = (namespace, section) {
            let later = if namespace.position > section.position {
                namespace
            } else {
                section
            };
            return Err(Error::parse(
                ErrorCode::NamespaceAndSections,
                "a document declares either a namespace or sections, not both",
                later.position,
            ));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_block(&mut self, block: Block) -> Result<Vec<SyntaxNode>> {
        let mut nodes = Vec::new();
        let mut shape: Option<NodeKind> = None;

        loop {
            let (kind, position) = {
                let token = self.peek();
                (token.kind, token.position)
            };
            match kind {
                TokenKind::Newline => {
                    self.bump();
                }
                TokenKind::Comment | TokenKind::TodoComment => {
                    let token = self.bump();
                    nodes.push(comment_node(&token));
                }
                TokenKind::Key => {
                    check_shape(&mut shape, NodeKind::KeyValue, position)?;
                    let (kv, trailing) = self.parse_key_value(false)?;
                    nodes.push(SyntaxNode::KeyValue(kv));
                    nodes.extend(trailing);
                }
                TokenKind::ListItem => {
                    check_shape(&mut shape, NodeKind::ListItem, position)?;
                    let (item, trailing) = self.parse_list_item()?;
                    nodes.push(SyntaxNode::ListItem(item));
                    nodes.extend(trailing);
                }
                TokenKind::Eof => break,
                TokenKind::Dedent if block == Block::Nested => break,
                TokenKind::Notice
                | TokenKind::NamespaceDeclaration
                | TokenKind::SectionDeclaration
                    if block == Block::TopLevel =>
                {
                    break
                }
                TokenKind::Notice => {
                    return Err(Error::parse(
                        ErrorCode::MisplacedNotice,
                        "notices are only allowed in the document header",
                        position,
                    ))
                }
                TokenKind::NamespaceDeclaration | TokenKind::SectionDeclaration => {
                    return Err(Error::parse(
                        ErrorCode::MisplacedDeclaration,
                        "declarations are only allowed at the top level",
                        position,
                    ))
                }
                TokenKind::Indent => {
                    return Err(Error::parse(
                        ErrorCode::UnexpectedIndent,
                        "unexpected indentation",
                        position,
                    ))
                }
                _ => return Err(self.unexpected("a key or a list item")),
            }
        }
        Ok(nodes)
    }

    /// `KEY COLON value? NEWLINE (INDENT block DEDENT)?`
    ///
    /// Comments that trail the key line are returned separately so they
    /// land next to the pair in the enclosing block.
    fn parse_key_value(&mut self, in_list_item: bool) -> Result<(KeyValue, Vec<SyntaxNode>)> {
        let key = self.bump();

        if self.peek().kind != TokenKind::Colon {
            return Err(Error::parse(
                ErrorCode::ExpectedColon,
                format!("expected ':' after key {:?}", key.text),
                self.peek().position,
            ));
        }
        self.bump();

        let value = self.parse_value()?;
        let trailing = self.trailing_comments();
        self.end_of_line()?;
        let children = self.parse_children()?;

        if value.is_some() && !children.is_empty() {
            let continues_item = in_list_item
                && children
                    .iter()
                    .any(|c| matches!(c, SyntaxNode::KeyValue(_)));
            if !continues_item {
                let warning = Warning::new(
                    format!(
                        "the value of {:?} is superseded by its indented block",
                        key.text
                    ),
                    key.position,
                );
                warn!("{}", warning);
                self.warnings.push(warning);
            }
        }

        let kv = KeyValue {
            key: key.text,
            value,
            children,
            position: key.position,
        };
        Ok((kv, trailing))
    }

    /// `LIST_ITEM (KeyValue | ListItem | value)?`
    fn parse_list_item(&mut self) -> Result<(ListItem, Vec<SyntaxNode>)> {
        let dash = self.bump();

        let (value, trailing) = match self.peek().kind {
            TokenKind::Key => {
                let (kv, trailing) = self.parse_key_value(true)?;
                (ListItemValue::KeyValue(kv), trailing)
            }
            TokenKind::ListItem => {
                let (inner, trailing) = self.parse_list_item()?;
                let mut nested = vec![SyntaxNode::ListItem(inner)];
                nested.extend(trailing);
                nested.extend(self.parse_children()?);
                if let Some(node) = nested
                    .iter()
                    .find(|n| matches!(n, SyntaxNode::KeyValue(_)))
                {
                    return Err(mixed_block(node.position()));
                }
                (ListItemValue::Nested(nested), Vec::new())
            }
            TokenKind::Value
            | TokenKind::MultilineStart
            | TokenKind::EnvVar
            | TokenKind::RawContent => {
                let value = match self.parse_value()? {
                    Some(value) => value,
                    None => return Err(self.unexpected("a list item value")),
                };
                let trailing = self.trailing_comments();
                self.end_of_line()?;
                (ListItemValue::Value(value), trailing)
            }
            TokenKind::Newline
            | TokenKind::Eof
            | TokenKind::Dedent
            | TokenKind::Comment
            | TokenKind::TodoComment => {
                let trailing = self.trailing_comments();
                self.end_of_line()?;
                let children = self.parse_children()?;
                if children.is_empty() {
                    let null = TypedValue::new(Scalar::Null, dash.position);
                    (ListItemValue::Value(ValueNode::Scalar(null)), trailing)
                } else {
                    let mut nested = trailing;
                    nested.extend(children);
                    (ListItemValue::Nested(nested), Vec::new())
                }
            }
            _ => return Err(self.unexpected("a list item value")),
        };

        let item = ListItem {
            value,
            position: dash.position,
        };
        Ok((item, trailing))
    }

    /// An indented block, if one follows.
    fn parse_children(&mut self) -> Result<Vec<SyntaxNode>> {
        if self.peek().kind != TokenKind::Indent {
            return Ok(Vec::new());
        }
        self.bump();
        let children = self.parse_block(Block::Nested)?;
        if self.peek().kind != TokenKind::Dedent {
            return Err(self.unexpected("the end of the indented block"));
        }
        self.bump();
        Ok(children)
    }

    fn trailing_comments(&mut self) -> Vec<SyntaxNode> {
        let mut comments = Vec::new();
        while matches!(
            self.peek().kind,
            TokenKind::Comment | TokenKind::TodoComment
        ) {
            let token = self.bump();
            comments.push(comment_node(&token));
        }
        comments
    }

    fn end_of_line(&mut self) -> Result<()> {
        match self.peek().kind {
            TokenKind::Newline => {
                self.bump();
                Ok(())
            }
            TokenKind::Eof | TokenKind::Dedent => Ok(()),
            TokenKind::Notice => Err(Error::parse(
                ErrorCode::MisplacedNotice,
                "notices are only allowed in the document header",
                self.peek().position,
            )),
            _ => Err(self.unexpected("the end of the line")),
        }
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    fn parse_value(&mut self) -> Result<Option<ValueNode>> {
        let node = match self.peek().kind {
            TokenKind::Value => {
                let token = self.bump();
                let (typed, warnings) = resolve(&token.text, token.position);
                self.warnings.extend(warnings);
                ValueNode::Scalar(typed)
            }
            TokenKind::MultilineStart => ValueNode::Multiline(self.parse_multiline()?),
            TokenKind::EnvVar => {
                let token = self.bump();
                ValueNode::EnvVar(env_ref(&token))
            }
            TokenKind::RawContent => {
                let token = self.bump();
                ValueNode::Raw(RawContent {
                    content: token.text,
                    position: token.position,
                })
            }
            _ => return Ok(None),
        };
        Ok(Some(node))
    }

    /// `MULTILINE_START trivia* MULTILINE_STRING* MULTILINE_END`
    fn parse_multiline(&mut self) -> Result<MultilineString> {
        let start = self.bump();
        let format = MultilineFormat::from_marker(&start.text).ok_or_else(|| {
            Error::parse(
                ErrorCode::UnexpectedToken,
                format!("unknown multiline marker {:?}", start.text),
                start.position,
            )
        })?;

        // Comments on the marker line carry no content.
        self.trailing_comments();

        let mut lines = Vec::new();
        while self.peek().kind == TokenKind::MultilineString {
            lines.push(self.bump().text);
        }

        if self.peek().kind != TokenKind::MultilineEnd {
            return Err(Error::parse(
                ErrorCode::UnterminatedMultiline,
                "multiline block is not terminated",
                start.position,
            ));
        }
        self.bump();

        Ok(MultilineString {
            format,
            content: lines.join("\n"),
            position: start.position,
        })
    }
}

fn has_statements(nodes: &[SyntaxNode]) -> bool {
    nodes.iter().any(|n| !n.is_comment())
}

fn check_shape(shape: &mut Option<NodeKind>, kind: NodeKind, position: Position) -> Result<()> {
    match shape {
        None => {
            *shape = Some(kind);
            Ok(())
        }
        Some(existing) if *existing == kind => Ok(()),
        Some(_) => Err(mixed_block(position)),
    }
}

fn mixed_block(position: Position) -> Error {
    Error::parse(
        ErrorCode::MixedBlock,
        "list items and key-value pairs cannot be siblings in the same block",
        position,
    )
}

fn misplaced_declaration(token: &Token) -> Error {
    Error::parse(
        ErrorCode::MisplacedDeclaration,
        "declarations must come before any top-level statement",
        token.position,
    )
}

fn declaration_name(token: &Token) -> Result<String> {
    let name = token.text.trim();
    if name.is_empty() {
        let what = match token.kind {
            TokenKind::NamespaceDeclaration => "namespace",
            _ => "section",
        };
        return Err(Error::parse(
            ErrorCode::EmptyDeclarationName,
            format!("{} declaration has no name", what),
            token.position,
        ));
    }
    Ok(name.to_string())
}

fn comment(token: &Token, marker: &str) -> Comment {
    let text = token.text.as_str();
    Comment {
        content: text.strip_prefix(marker).unwrap_or(text).trim().to_string(),
        position: token.position,
    }
}

fn comment_node(token: &Token) -> SyntaxNode {
    match token.kind {
        TokenKind::TodoComment => SyntaxNode::TodoComment(comment(token, "/=>")),
        _ => SyntaxNode::Comment(comment(token, "//")),
    }
}

fn env_ref(token: &Token) -> EnvVarRef {
    let (name, default_value) = match token.text.split_once("||") {
        Some((name, default)) => (name.trim(), Some(default.trim().to_string())),
        None => (token.text.trim(), None),
    };
    EnvVarRef {
        name: name.to_string(),
        default_value,
        position: token.position,
    }
}
