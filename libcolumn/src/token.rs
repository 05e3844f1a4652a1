//! Token types shared by the tokenizer, the indentation lexer and the parser.

use crate::position::Position;
use std::fmt;

/// The kind of a token. This is a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A bare or quoted key.
    Key,
    /// `:`
    Colon,
    /// A scalar value run (also a raw multiline body line before lexing).
    Value,
    /// Synthetic: indentation increased. Text holds the new level.
    Indent,
    /// Synthetic: indentation decreased.
    Dedent,
    /// End of a physical line.
    Newline,
    /// `- `
    ListItem,
    /// `|`, `|+` or `<`
    MultilineStart,
    /// One physical line of a multiline body.
    MultilineString,
    /// Synthetic: end of a multiline body.
    MultilineEnd,
    /// `/! ...`
    Notice,
    /// `// ...`
    Comment,
    /// `/=> ...`
    TodoComment,
    /// `@- name`
    NamespaceDeclaration,
    /// `@/ name`
    SectionDeclaration,
    /// `$_NAME || default`
    EnvVar,
    /// Backtick-delimited raw content.
    RawContent,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Stable upper-snake name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Key => "KEY",
            TokenKind::Colon => "COLON",
            TokenKind::Value => "VALUE",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::Newline => "NEWLINE",
            TokenKind::ListItem => "LIST_ITEM",
            TokenKind::MultilineStart => "MULTILINE_START",
            TokenKind::MultilineString => "MULTILINE_STRING",
            TokenKind::MultilineEnd => "MULTILINE_END",
            TokenKind::Notice => "NOTICE",
            TokenKind::Comment => "COMMENT",
            TokenKind::TodoComment => "TODO_COMMENT",
            TokenKind::NamespaceDeclaration => "NAMESPACE_DECLARATION",
            TokenKind::SectionDeclaration => "SECTION_DECLARATION",
            TokenKind::EnvVar => "ENV_VAR",
            TokenKind::RawContent => "RAW_CONTENT",
            TokenKind::Eof => "EOF",
        }
    }

    /// Whether this token is a comment-like token that occupies a whole
    /// line on its own without carrying structure.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::Comment | TokenKind::TodoComment | TokenKind::Notice
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Start of the lexeme.
    pub position: Position,
    /// Leading whitespace width of the token's line (a tab counts as 2).
    pub indent: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position, indent: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
            indent,
        }
    }

    /// A token with no source text of its own, placed at `position`.
    pub(crate) fn synthetic(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Self::new(kind, text, position, 0)
    }
}
