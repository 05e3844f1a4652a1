//! Error types for Column processing.

use crate::position::Position;
use std::fmt;
use thiserror::Error;

/// Result type for Column operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Stable error codes. The string form is part of the public contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// No tokenizer rule applies to a character.
    UnexpectedCharacter,
    /// `-` not followed by a space in key position.
    ExpectedSpaceAfterDash,
    /// Quoted key without its closing `"`.
    UnterminatedQuotedKey,
    /// Raw content without its closing backtick.
    UnterminatedRawContent,
    /// `$_` not followed by `[A-Z0-9_]+`.
    InvalidEnvVarName,
    /// A dedent to a width that no enclosing block uses.
    InconsistentIndentation,
    /// A token the grammar does not allow here.
    UnexpectedToken,
    /// An indented block where none can start.
    UnexpectedIndent,
    /// A key not followed by `:`.
    ExpectedColon,
    /// A multiline start without its end.
    UnterminatedMultiline,
    /// Both a namespace and sections in one document.
    NamespaceAndSections,
    /// A second namespace declaration.
    DuplicateNamespace,
    /// Two sections with the same name.
    DuplicateSection,
    /// `@-` or `@/` without a name.
    EmptyDeclarationName,
    /// A notice after a declaration or statement.
    MisplacedNotice,
    /// A declaration after top-level statements.
    MisplacedDeclaration,
    /// List items and key-value pairs as siblings.
    MixedBlock,
    /// An environment reference with no value and no default.
    UndefinedEnvVar,
}

impl ErrorCode {
    /// The stable string form of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UnexpectedCharacter => "UNEXPECTED_CHARACTER",
            ErrorCode::ExpectedSpaceAfterDash => "EXPECTED_SPACE_AFTER_DASH",
            ErrorCode::UnterminatedQuotedKey => "UNTERMINATED_QUOTED_KEY",
            ErrorCode::UnterminatedRawContent => "UNTERMINATED_RAW_CONTENT",
            ErrorCode::InvalidEnvVarName => "INVALID_ENV_VAR_NAME",
            ErrorCode::InconsistentIndentation => "INCONSISTENT_INDENTATION",
            ErrorCode::UnexpectedToken => "UNEXPECTED_TOKEN",
            ErrorCode::UnexpectedIndent => "UNEXPECTED_INDENT",
            ErrorCode::ExpectedColon => "EXPECTED_COLON",
            ErrorCode::UnterminatedMultiline => "UNTERMINATED_MULTILINE",
            ErrorCode::NamespaceAndSections => "NAMESPACE_AND_SECTIONS",
            ErrorCode::DuplicateNamespace => "DUPLICATE_NAMESPACE",
            ErrorCode::DuplicateSection => "DUPLICATE_SECTION",
            ErrorCode::EmptyDeclarationName => "EMPTY_DECLARATION_NAME",
            ErrorCode::MisplacedNotice => "MISPLACED_NOTICE",
            ErrorCode::MisplacedDeclaration => "MISPLACED_DECLARATION",
            ErrorCode::MixedBlock => "MIXED_BLOCK",
            ErrorCode::UndefinedEnvVar => "UNDEFINED_ENV_VAR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for Column processing. One variant per pipeline stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Raised by the tokenizer.
    #[error("{code} at {position}: {message}")]
    Tokenization {
        code: ErrorCode,
        message: String,
        position: Position,
    },

    /// Raised by the indentation lexer and the parser.
    #[error("{code} at {position}: {message}")]
    Parse {
        code: ErrorCode,
        message: String,
        position: Position,
    },

    /// Raised while walking the tree to a value.
    #[error("{code} at {position}: {message}")]
    Interpretation {
        code: ErrorCode,
        message: String,
        position: Position,
    },
}

impl Error {
    pub fn tokenization(code: ErrorCode, message: impl Into<String>, position: Position) -> Self {
        Error::Tokenization {
            code,
            message: message.into(),
            position,
        }
    }

    pub fn parse(code: ErrorCode, message: impl Into<String>, position: Position) -> Self {
        Error::Parse {
            code,
            message: message.into(),
            position,
        }
    }

    pub fn interpretation(code: ErrorCode, message: impl Into<String>, position: Position) -> Self {
        Error::Interpretation {
            code,
            message: message.into(),
            position,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Tokenization { code, .. }
            | Error::Parse { code, .. }
            | Error::Interpretation { code, .. } => *code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Error::Tokenization { message, .. }
            | Error::Parse { message, .. }
            | Error::Interpretation { message, .. } => message,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Error::Tokenization { position, .. }
            | Error::Parse { position, .. }
            | Error::Interpretation { position, .. } => *position,
        }
    }
}

/// A recoverable problem. Processing continues after recording it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
    pub position: Position,
}

impl Warning {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "warning at {}: {}", self.position, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let err = Error::parse(
            ErrorCode::ExpectedColon,
            "expected ':' after key",
            Position::new(3, 7, 20),
        );
        assert_eq!(
            err.to_string(),
            "EXPECTED_COLON at line 3, column 7: expected ':' after key"
        );
    }

    #[test]
    fn test_accessors() {
        let err = Error::tokenization(
            ErrorCode::UnterminatedRawContent,
            "unterminated raw content",
            Position::new(1, 5, 4),
        );
        assert_eq!(err.code(), ErrorCode::UnterminatedRawContent);
        assert_eq!(err.code().as_str(), "UNTERMINATED_RAW_CONTENT");
        assert_eq!(err.message(), "unterminated raw content");
        assert_eq!(err.position(), Position::new(1, 5, 4));
    }
}
