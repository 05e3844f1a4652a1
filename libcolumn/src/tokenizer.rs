//! Phase 1: Tokenizer
//!
//! The tokenizer converts raw source text into a flat token stream. It
//! records exact positions but has no notion of block structure:
//! - Keys (bare, escaped or quoted), colons and scalar value runs
//! - Comments, notices and TODO comments
//! - Namespace and section declarations
//! - Environment references and backtick raw content
//! - Multiline starts, followed by their raw body lines
//!
//! Each line starts in key position. A colon switches to value position,
//! where free-form value runs replace identifiers.

use crate::error::{Error, ErrorCode, Result};
use crate::position::Position;
use crate::token::{Token, TokenKind};
use tracing::{debug, trace};

/// Tokenize Column source text. The stream ends with exactly one `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Tokenizer::new(source).run()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Key,
    Value,
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    offset: usize,
    line: usize,
    column: usize,
}

struct Tokenizer<'src> {
    source: &'src str,
    cursor: Cursor,
    mode: Mode,
    /// Leading whitespace width of the current line.
    line_indent: usize,
    /// Column of the first non-blank character of the current line.
    content_column: usize,
    /// Effective indent of the key (or line) that opened a multiline block whose body starts
    /// on the next line.
    multiline_owner: Option<usize>,
    tokens: Vec<Token>,
}

impl<'src> Tokenizer<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            cursor: Cursor {
                offset: 0,
                line: 1,
                column: 1,
            },
            mode: Mode::Key,
            line_indent: 0,
            content_column: 1,
            multiline_owner: None,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        self.start_line();
        while let Some(c) = self.peek() {
            self.next_lexeme(c)?;
        }

        // Every statement line ends with a newline, even the last one.
        if self
            .tokens
            .last()
            .map_or(false, |t| t.kind != TokenKind::Newline)
        {
            let position = self.position();
            self.push(TokenKind::Newline, "", position);
        }
        let position = self.position();
        self.push(TokenKind::Eof, "", position);

        debug!("tokenized {} tokens", self.tokens.len());
        Ok(self.tokens)
    }

    // ------------------------------------------------------------------
    // Cursor helpers
    // ------------------------------------------------------------------

    fn remaining(&self) -> &'src str {
        &self.source[self.cursor.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.remaining().chars().nth(n)
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.remaining().starts_with(prefix)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor.offset += c.len_utf8();
        if c == '\n' {
            self.cursor.line += 1;
            self.cursor.column = 1;
        } else {
            self.cursor.column += 1;
        }
        Some(c)
    }

    fn advance_chars(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn position(&self) -> Position {
        Position::new(self.cursor.line, self.cursor.column, self.cursor.offset)
    }

    /// The rest of the current line, without its line terminator.
    fn line_rest(&self) -> &'src str {
        self.current_line().0
    }

    /// The rest of the current line and whether a newline terminates it.
    fn current_line(&self) -> (&'src str, bool) {
        let rest = self.remaining();
        match rest.find('\n') {
            Some(end) => (rest[..end].trim_end_matches('\r'), true),
            None => (rest, false),
        }
    }

    /// Move to the line terminator (or end of input) without consuming it.
    fn skip_to_line_end(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' || (c == '\r' && self.peek_nth(1) == Some('\n')) {
                break;
            }
            self.advance();
        }
    }

    fn consume_newline(&mut self) {
        if self.peek() == Some('\r') {
            self.advance();
        }
        self.advance();
    }

    fn push(&mut self, kind: TokenKind, text: impl Into<String>, position: Position) {
        let token = Token::new(kind, text, position, self.line_indent);
        trace!("Token {} at {}: {:?}", token.kind, token.position, token.text);
        self.tokens.push(token);
    }

    // ------------------------------------------------------------------
    // Lines
    // ------------------------------------------------------------------

    fn start_line(&mut self) {
        if let Some(owner) = self.multiline_owner.take() {
            self.scan_multiline_body(owner);
        }
        self.mode = Mode::Key;
        let rest = self.line_rest();
        self.line_indent = indent_width(rest);
        self.content_column =
            self.cursor.column + rest.chars().take_while(|c| matches!(c, ' ' | '\t')).count();
    }

    fn newline(&mut self) {
        let start = self.position();
        self.consume_newline();
        self.push(TokenKind::Newline, "\n", start);
        self.start_line();
    }

    /// Emit the body of a multiline block: every following line that is
    /// blank or indented deeper than `owner`, verbatim, as one `Value`
    /// token at column 1. Blank lines after the last body line are left
    /// out of the body.
    fn scan_multiline_body(&mut self, owner: usize) {
        let mut blank_lines: Vec<(Position, Position)> = Vec::new();

        while !self.remaining().is_empty() {
            let (line, terminated) = self.current_line();

            if line.trim().is_empty() {
                if !terminated {
                    break;
                }
                let start = self.position();
                self.skip_to_line_end();
                let newline = self.position();
                self.consume_newline();
                blank_lines.push((start, newline));
                continue;
            }

            let indent = indent_width(line);
            if indent <= owner {
                break;
            }

            self.line_indent = 0;
            for (start, newline) in blank_lines.drain(..) {
                self.push(TokenKind::Value, "", start);
                self.push(TokenKind::Newline, "\n", newline);
            }

            self.line_indent = indent;
            let start = self.position();
            self.push(TokenKind::Value, line, start);
            self.skip_to_line_end();
            if terminated {
                let newline = self.position();
                self.consume_newline();
                self.push(TokenKind::Newline, "\n", newline);
            }
        }

        for (_, newline) in blank_lines {
            self.push(TokenKind::Newline, "\n", newline);
        }
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    fn next_lexeme(&mut self, c: char) -> Result<()> {
        match c {
            ' ' | '\t' => {
                self.advance();
                Ok(())
            }
            '\n' => {
                self.newline();
                Ok(())
            }
            '\r' if self.peek_nth(1) == Some('\n') => {
                self.newline();
                Ok(())
            }
            '\r' => {
                self.advance();
                Ok(())
            }
            _ => match self.mode {
                Mode::Key => self.key_lexeme(c),
                Mode::Value => self.value_lexeme(c),
            },
        }
    }

    fn key_lexeme(&mut self, c: char) -> Result<()> {
        let start = self.position();

        if c == ':' {
            self.advance();
            self.push(TokenKind::Colon, ":", start);
            self.mode = Mode::Value;
            return Ok(());
        }

        if let Some(kind) = self.comment_kind() {
            self.comment(kind);
            return Ok(());
        }

        if self.starts_with("@-") {
            self.declaration(TokenKind::NamespaceDeclaration);
            return Ok(());
        }
        if self.starts_with("@/") {
            self.declaration(TokenKind::SectionDeclaration);
            return Ok(());
        }

        if c == '-' {
            if self.peek_nth(1) != Some(' ') {
                return Err(Error::tokenization(
                    ErrorCode::ExpectedSpaceAfterDash,
                    "expected a space after '-' (list items are written as '- value')",
                    start,
                ));
            }
            self.advance();
            self.push(TokenKind::ListItem, "-", start);
            self.mode = self.mode_after_list_item();
            return Ok(());
        }

        if c == '"' {
            let key = self.quoted_key()?;
            self.push(TokenKind::Key, key, start);
            return Ok(());
        }

        if is_key_start(c) || c == '\\' {
            let key = self.bare_key();
            if !key.is_empty() {
                self.push(TokenKind::Key, key, start);
                return Ok(());
            }
        }

        Err(Error::tokenization(
            ErrorCode::UnexpectedCharacter,
            format!("unexpected character {:?}", c),
            start,
        ))
    }

    fn value_lexeme(&mut self, c: char) -> Result<()> {
        let start = self.position();

        if let Some(kind) = self.comment_kind() {
            self.comment(kind);
            return Ok(());
        }

        if self.starts_with("$_") {
            return self.env_var();
        }

        if c == '`' {
            let content = self.raw_content()?;
            self.push(TokenKind::RawContent, content, start);
            return Ok(());
        }

        if let Some(marker) = self.multiline_marker() {
            self.advance_chars(marker.len());
            self.push(TokenKind::MultilineStart, marker, start);
            self.multiline_owner = Some(self.multiline_owner_indent());
            return Ok(());
        }

        let text = self.value_run();
        self.push(TokenKind::Value, text, start);
        Ok(())
    }

    /// The indent a multiline body must exceed. After `key:` that is the
    /// key's own indent, so `- key: |` closes its body at the item's next
    /// key rather than at the dash.
    fn multiline_owner_indent(&self) -> usize {
        let line = self.cursor.line;
        let mut recent = self.tokens.iter().rev().take_while(|t| t.position.line == line);
        match (recent.next(), recent.next()) {
            (Some(colon), Some(key))
                if colon.kind == TokenKind::Colon && key.kind == TokenKind::Key =>
            {
                self.line_indent + key.position.column.saturating_sub(self.content_column)
            }
            _ => self.line_indent,
        }
    }

    // ------------------------------------------------------------------
    // Lexemes
    // ------------------------------------------------------------------

    fn comment_kind(&self) -> Option<TokenKind> {
        if self.starts_with("//") {
            Some(TokenKind::Comment)
        } else if self.starts_with("/!") {
            Some(TokenKind::Notice)
        } else if self.starts_with("/=>") {
            Some(TokenKind::TodoComment)
        } else {
            None
        }
    }

    /// Comments run to the end of the line and keep their marker.
    fn comment(&mut self, kind: TokenKind) {
        let start = self.position();
        let text = self.line_rest().trim_end();
        self.skip_to_line_end();
        self.push(kind, text, start);
    }

    /// `@- name` / `@/ name`: the trimmed name, cut at an embedded `/`.
    fn declaration(&mut self, kind: TokenKind) {
        let start = self.position();
        self.advance_chars(2);
        let rest = self.line_rest();
        let end = rest.find('/').unwrap_or(rest.len());
        let name = rest[..end].trim();
        self.advance_chars(rest[..end].chars().count());
        self.push(kind, name, start);
    }

    /// After `- `, stay in key position only for `key:` or a nested `- `.
    fn mode_after_list_item(&self) -> Mode {
        let rest = self.line_rest()[1..].trim_start_matches([' ', '\t']);
        if rest.starts_with("- ") || starts_key_value(rest) {
            Mode::Key
        } else {
            Mode::Value
        }
    }

    fn quoted_key(&mut self) -> Result<String> {
        let start = self.position();
        let unterminated = || {
            Error::tokenization(
                ErrorCode::UnterminatedQuotedKey,
                "unterminated quoted key (missing closing '\"')",
                start,
            )
        };

        self.advance();
        let mut key = String::new();
        loop {
            match self.advance() {
                None | Some('\n') => return Err(unterminated()),
                Some('"') => return Ok(key),
                Some('\\') => match self.advance() {
                    None | Some('\n') => return Err(unterminated()),
                    Some('n') => key.push('\n'),
                    Some('t') => key.push('\t'),
                    Some('r') => key.push('\r'),
                    Some(other) => key.push(other),
                },
                Some(c) => key.push(c),
            }
        }
    }

    /// Identifier scan. A backslash takes the next character verbatim.
    fn bare_key(&mut self) -> String {
        let mut key = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                match self.peek_nth(1) {
                    Some(next) if next != '\n' && next != '\r' => {
                        self.advance_chars(2);
                        key.push(next);
                    }
                    _ => break,
                }
            } else if is_key_char(c) {
                self.advance();
                key.push(c);
            } else {
                break;
            }
        }
        key
    }

    /// A multiline marker counts only when nothing but whitespace or a
    /// comment follows it on the line.
    fn multiline_marker(&self) -> Option<&'static str> {
        let rest = self.line_rest();
        let marker = if rest.starts_with("|+") {
            "|+"
        } else if rest.starts_with('|') {
            "|"
        } else if rest.starts_with('<') {
            "<"
        } else {
            return None;
        };
        let after = rest[marker.len()..].trim_start();
        if after.is_empty() || is_comment_lead_in(after) {
            Some(marker)
        } else {
            None
        }
    }

    fn value_run(&mut self) -> &'src str {
        let line = self.line_rest();
        let run = &line[..value_run_end(line)];
        self.advance_chars(run.chars().count());
        run.trim_end()
    }

    /// `$_NAME` with an optional `|| default`. The token text is the
    /// lexeme without the `$_` prefix, normalized to `NAME || default`.
    fn env_var(&mut self) -> Result<()> {
        let start = self.position();
        self.advance_chars(2);

        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(Error::tokenization(
                ErrorCode::InvalidEnvVarName,
                "expected an environment variable name made of [A-Z0-9_] after '$_'",
                start,
            ));
        }

        let mut text = name;
        let rest = self.line_rest();
        let trimmed = rest.trim_start_matches([' ', '\t']);
        if let Some(after) = trimmed.strip_prefix("||") {
            let default_start = after.trim_start_matches([' ', '\t']);
            let default_end = if is_comment_lead_in(default_start) {
                0
            } else {
                value_run_end(default_start)
            };
            let default = default_start[..default_end].trim_end();
            let consumed = rest.len() - default_start.len() + default_end;
            self.advance_chars(rest[..consumed].chars().count());
            text = format!("{} || {}", text, default);
        }

        self.push(TokenKind::EnvVar, text, start);
        Ok(())
    }

    /// Backtick raw content. Only `` \` `` is interpreted; everything else,
    /// newlines included, is kept verbatim.
    fn raw_content(&mut self) -> Result<String> {
        let start = self.position();
        self.advance();
        let mut content = String::new();
        loop {
            match self.advance() {
                None => {
                    return Err(Error::tokenization(
                        ErrorCode::UnterminatedRawContent,
                        "unterminated raw content (missing closing '`')",
                        start,
                    ))
                }
                Some('\\') if self.peek() == Some('`') => {
                    self.advance();
                    content.push('`');
                }
                Some('`') => return Ok(content),
                Some(c) => content.push(c),
            }
        }
    }
}

/// Leading whitespace width; a tab counts as 2.
fn indent_width(line: &str) -> usize {
    line.chars()
        .map_while(|c| match c {
            ' ' => Some(1),
            '\t' => Some(2),
            _ => None,
        })
        .sum()
}

fn is_key_start(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub(crate) fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '^' | '+')
}

/// The markers `comment_kind` recognizes.
pub(crate) fn is_comment_lead_in(text: &str) -> bool {
    text.starts_with("//") || text.starts_with("/=>") || text.starts_with("/!")
}

/// End of a value run: the end of the line, or an inline comment lead-in
/// preceded by whitespace. A run opening with `"` is not cut inside the
/// quotes.
fn value_run_end(line: &str) -> usize {
    let mut in_quotes = false;
    let mut escaped = false;
    let mut prev_blank = false;

    for (i, c) in line.char_indices() {
        if in_quotes {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quotes = false;
            }
            continue;
        }
        if i == 0 && c == '"' {
            in_quotes = true;
            continue;
        }
        if prev_blank && is_comment_lead_in(&line[i..]) {
            return i;
        }
        prev_blank = c == ' ' || c == '\t';
    }
    line.len()
}

/// Whether `text` opens with a key followed by `:` and whitespace (or the
/// end of the line).
pub(crate) fn starts_key_value(text: &str) -> bool {
    let after_key = if text.starts_with('"') {
        let mut escaped = false;
        let mut end = None;
        for (i, c) in text.char_indices().skip(1) {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                end = Some(i + 1);
                break;
            }
        }
        match end {
            Some(end) => &text[end..],
            None => return false,
        }
    } else {
        let mut end = 0;
        let mut escaped = false;
        for (i, c) in text.char_indices() {
            if escaped {
                escaped = false;
                end = i + c.len_utf8();
            } else if c == '\\' {
                escaped = true;
            } else if is_key_char(c) {
                end = i + c.len_utf8();
            } else {
                break;
            }
        }
        if end == 0 {
            return false;
        }
        &text[end..]
    };

    match after_key.trim_start_matches([' ', '\t']).strip_prefix(':') {
        Some(rest) => rest.is_empty() || rest.starts_with([' ', '\t']),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().iter().map(|t| t.kind).collect()
    }

    fn texts(source: &str, kind: TokenKind) -> Vec<String> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.text)
            .collect()
    }

    fn error_code(source: &str) -> ErrorCode {
        tokenize(source).unwrap_err().code()
    }

    use TokenKind::*;

    #[test]
    fn test_simple_pairs() {
        let source = "name: John Doe\nage: 30";
        assert_eq!(
            kinds(source),
            vec![Key, Colon, Value, Newline, Key, Colon, Value, Newline, Eof]
        );
        assert_eq!(texts(source, Key), vec!["name", "age"]);
        assert_eq!(texts(source, Value), vec!["John Doe", "30"]);
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(kinds(""), vec![Eof]);
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("a: 1\n  b: two").unwrap();
        let b = tokens.iter().find(|t| t.text == "b").unwrap();
        assert_eq!(b.position, Position::new(2, 3, 7));
        assert_eq!(b.indent, 2);
        let two = tokens.iter().find(|t| t.text == "two").unwrap();
        assert_eq!(two.position, Position::new(2, 6, 10));
    }

    #[test]
    fn test_tab_indent_counts_two() {
        let tokens = tokenize("a:\n\tb: 1").unwrap();
        let b = tokens.iter().find(|t| t.text == "b").unwrap();
        assert_eq!(b.indent, 2);
        assert_eq!(b.position.column, 2);
    }

    #[test]
    fn test_inline_comment_not_absorbed() {
        let source = "key: value // note";
        assert_eq!(kinds(source), vec![Key, Colon, Value, Comment, Newline, Eof]);
        assert_eq!(texts(source, Value), vec!["value"]);
        assert_eq!(texts(source, Comment), vec!["// note"]);
    }

    #[test]
    fn test_url_value_keeps_slashes() {
        assert_eq!(
            texts("site: http://example.com/a", Value),
            vec!["http://example.com/a"]
        );
    }

    #[test]
    fn test_quoted_value_keeps_comment_markers() {
        assert_eq!(
            texts("msg: \"a // b\" // real", Value),
            vec!["\"a // b\""]
        );
    }

    #[test]
    fn test_negative_number_value() {
        assert_eq!(texts("n: -5", Value), vec!["-5"]);
    }

    #[test]
    fn test_dash_without_space_fails() {
        assert_eq!(error_code("-foo: 1"), ErrorCode::ExpectedSpaceAfterDash);
    }

    #[test]
    fn test_list_items() {
        assert_eq!(kinds("- apple"), vec![ListItem, Value, Newline, Eof]);
        assert_eq!(
            kinds("- name: x"),
            vec![ListItem, Key, Colon, Value, Newline, Eof]
        );
        assert_eq!(
            kinds("- - a"),
            vec![ListItem, ListItem, Value, Newline, Eof]
        );
        // A colon inside a scalar does not make a key.
        assert_eq!(texts("- 12:30", Value), vec!["12:30"]);
        assert_eq!(texts("- http://x.org", Value), vec!["http://x.org"]);
    }

    #[test]
    fn test_quoted_key() {
        let source = "\"a\\tb c\": 1";
        assert_eq!(kinds(source), vec![Key, Colon, Value, Newline, Eof]);
        assert_eq!(texts(source, Key), vec!["a\tb c"]);
    }

    #[test]
    fn test_unterminated_quoted_key() {
        assert_eq!(error_code("\"abc: 1"), ErrorCode::UnterminatedQuotedKey);
    }

    #[test]
    fn test_escaped_key() {
        assert_eq!(texts("a\\:b: 1", Key), vec!["a:b"]);
    }

    #[test]
    fn test_version_like_key() {
        assert_eq!(texts("lib-a_1.0^2+x: 1", Key), vec!["lib-a_1.0^2+x"]);
    }

    #[test]
    fn test_raw_content() {
        let tokens = tokenize("s: `a\n  b \\` c`\nt: 1").unwrap();
        let raw = tokens.iter().find(|t| t.kind == RawContent).unwrap();
        assert_eq!(raw.text, "a\n  b ` c");
        assert_eq!(raw.position, Position::new(1, 4, 3));
        let t = tokens.iter().find(|t| t.text == "t").unwrap();
        assert_eq!(t.position.line, 3);
    }

    #[test]
    fn test_unterminated_raw_content() {
        let err = tokenize("s: `abc").unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnterminatedRawContent);
        assert_eq!(err.position(), Position::new(1, 4, 3));
    }

    #[test]
    fn test_env_var() {
        let source = "host: $_HOST || localhost // c";
        assert_eq!(kinds(source), vec![Key, Colon, EnvVar, Comment, Newline, Eof]);
        assert_eq!(texts(source, EnvVar), vec!["HOST || localhost"]);
        assert_eq!(texts("port: $_PORT", EnvVar), vec!["PORT"]);
    }

    #[test]
    fn test_env_var_invalid_name() {
        assert_eq!(error_code("p: $_lower"), ErrorCode::InvalidEnvVarName);
    }

    #[test]
    fn test_declarations() {
        let source = "@- my.ns // trailing";
        assert_eq!(kinds(source), vec![NamespaceDeclaration, Comment, Newline, Eof]);
        assert_eq!(texts(source, NamespaceDeclaration), vec!["my.ns"]);
        assert_eq!(texts("@/ prod", SectionDeclaration), vec!["prod"]);
        assert_eq!(texts("@/", SectionDeclaration), vec![""]);
    }

    #[test]
    fn test_comment_kinds() {
        assert_eq!(texts("/! Copyright", Notice), vec!["/! Copyright"]);
        assert_eq!(texts("/=> fix me", TodoComment), vec!["/=> fix me"]);
        assert_eq!(texts("// plain", Comment), vec!["// plain"]);
    }

    #[test]
    fn test_multiline_body() {
        let source = "d: |\n  Line 1\n\n  Line 2\nnext: 1";
        assert_eq!(
            kinds(source),
            vec![
                Key,
                Colon,
                MultilineStart,
                Newline,
                Value,
                Newline,
                Value,
                Newline,
                Value,
                Newline,
                Key,
                Colon,
                Value,
                Newline,
                Eof
            ]
        );
        assert_eq!(
            texts(source, Value),
            vec!["  Line 1", "", "  Line 2", "1"]
        );
        let tokens = tokenize(source).unwrap();
        assert_eq!(tokens[4].position, Position::new(2, 1, 5));
    }

    #[test]
    fn test_multiline_body_keeps_special_characters() {
        let source = "d: <\n  it's -not- a `key`: really\n";
        assert_eq!(
            texts(source, Value),
            vec!["  it's -not- a `key`: really"]
        );
    }

    #[test]
    fn test_multiline_trailing_blank_lines_excluded() {
        let source = "d: |\n  x\n\n\ne: 1";
        assert_eq!(
            kinds(source),
            vec![
                Key,
                Colon,
                MultilineStart,
                Newline,
                Value,
                Newline,
                Newline,
                Newline,
                Key,
                Colon,
                Value,
                Newline,
                Eof
            ]
        );
    }

    #[test]
    fn test_multiline_body_under_list_item_key() {
        let source = "items:\n  - text: |\n      a\n    other: 1\n";
        assert_eq!(texts(source, Value), vec!["      a", "1"]);
        assert_eq!(texts(source, Key), vec!["items", "text", "other"]);

        let folded = "items:\n  - text: <\n      a\n    other: 1\n";
        assert_eq!(texts(folded, Key), vec!["items", "text", "other"]);
    }

    #[test]
    fn test_multiline_body_under_bare_list_item() {
        let source = "- |\n  a\n- b\n";
        assert_eq!(texts(source, Value), vec!["  a", "b"]);
        assert_eq!(kinds(source).iter().filter(|k| **k == ListItem).count(), 2);
    }

    #[test]
    fn test_slash_equals_stays_in_value() {
        assert_eq!(texts("ratio: a /= b", Value), vec!["a /= b"]);
        assert_eq!(kinds("ratio: a /= b"), vec![Key, Colon, Value, Newline, Eof]);

        let source = "ratio: a /=> check";
        assert_eq!(texts(source, Value), vec!["a"]);
        assert_eq!(texts(source, TodoComment), vec!["/=> check"]);
    }

    #[test]
    fn test_pipe_with_text_is_a_value() {
        assert_eq!(kinds("a: |x"), vec![Key, Colon, Value, Newline, Eof]);
        assert_eq!(texts("a: < 3", Value), vec!["< 3"]);
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("a: 1\n%").unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnexpectedCharacter);
        assert_eq!(err.position(), Position::new(2, 1, 5));
    }

    #[test]
    fn test_crlf_newlines() {
        let source = "a: 1\r\nb: 2\r\n";
        assert_eq!(
            kinds(source),
            vec![Key, Colon, Value, Newline, Key, Colon, Value, Newline, Eof]
        );
        assert_eq!(texts(source, Value), vec!["1", "2"]);
    }
}
