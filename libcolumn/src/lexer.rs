//! Phase 2: Indentation Lexer
//!
//! The indentation lexer re-emits the tokenizer's flat stream with block
//! structure made explicit. It tracks indentation levels using a stack and
//! emits:
//! - `Indent`: When a line is indented deeper than the enclosing block
//! - `Dedent`: Once per block closed by a shallower line or end of input
//! - `MultilineString`/`MultilineEnd`: For the body of a multiline block
//!
//! Comment-only and blank lines never drive indentation. They are held back
//! and emitted after the indentation tokens of the next content line.

use crate::error::{Error, ErrorCode, Result};
use crate::position::Position;
use crate::token::{Token, TokenKind};
use std::iter::Peekable;
use std::vec::IntoIter;
use tracing::{debug, trace};

/// What to do when a line dedents to a level no enclosing block uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndentPolicy {
    /// Fail with `INCONSISTENT_INDENTATION`.
    #[default]
    Strict,
    /// Close the deeper blocks and continue at the new width as a
    /// continuation of the nearest lower block. Enclosing levels keep
    /// their widths.
    RoundDown,
}

/// Options for the indentation lexer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexOptions {
    pub indent_policy: IndentPolicy,
}

/// Insert `Indent`/`Dedent` tokens and segment multiline bodies using the
/// default (strict) options.
pub fn lex(tokens: Vec<Token>) -> Result<Vec<Token>> {
    lex_with_options(tokens, &LexOptions::default())
}

/// Insert `Indent`/`Dedent` tokens and segment multiline bodies.
pub fn lex_with_options(tokens: Vec<Token>, options: &LexOptions) -> Result<Vec<Token>> {
    IndentLexer::new(options).run(tokens)
}

type Stream = Peekable<IntoIter<Token>>;

#[derive(Debug, Clone, Copy)]
struct Block {
    level: usize,
    /// Whether an `Indent` token opened this block. Closing a block that
    /// was only re-anchored by `RoundDown` emits no `Dedent`.
    opened: bool,
}

struct IndentLexer<'o> {
    options: &'o LexOptions,
    /// Open indentation levels, strictly increasing. The base entry is
    /// never popped.
    stack: Vec<Block>,
    /// Comment-only and blank lines waiting for the next content line.
    pending: Vec<Token>,
    out: Vec<Token>,
}

impl<'o> IndentLexer<'o> {
    fn new(options: &'o LexOptions) -> Self {
        Self {
            options,
            stack: vec![Block {
                level: 0,
                opened: false,
            }],
            pending: Vec::new(),
            out: Vec::new(),
        }
    }

    fn run(mut self, tokens: Vec<Token>) -> Result<Vec<Token>> {
        let mut stream = tokens.into_iter().peekable();
        let mut line = Vec::new();
        let mut eof = None;

        while let Some(token) = stream.next() {
            match token.kind {
                TokenKind::Eof => {
                    eof = Some(token);
                    break;
                }
                TokenKind::Newline => {
                    line.push(token);
                    self.line(std::mem::take(&mut line), &mut stream)?;
                }
                _ => line.push(token),
            }
        }
        if !line.is_empty() {
            self.line(line, &mut stream)?;
        }

        self.finish(eof);
        debug!("lexed {} tokens", self.out.len());
        Ok(self.out)
    }

    fn top(&self) -> usize {
        self.stack.last().map_or(0, |block| block.level)
    }

    fn synthesize(&mut self, kind: TokenKind, text: String, position: Position) {
        trace!("Synthetic {} at {}", kind, position);
        self.out.push(Token::synthetic(kind, text, position));
    }

    /// Handle one physical line (a run of tokens ending in `Newline`).
    fn line(&mut self, mut line: Vec<Token>, stream: &mut Stream) -> Result<()> {
        let Some(first) = line.first() else {
            return Ok(());
        };
        if first.kind == TokenKind::Newline || first.kind.is_trivia() {
            self.pending.append(&mut line);
            return Ok(());
        }

        let indent = first.indent;
        let start = first.position;
        let anchor = self.pending.first().map_or(start, |t| t.position);
        self.indent_to(indent, start, anchor)?;
        self.out.append(&mut self.pending);

        let marker = line
            .iter()
            .find(|t| t.kind == TokenKind::MultilineStart)
            .map(|t| t.text.clone());
        match marker {
            Some(marker) => {
                let held = match line.last() {
                    Some(last) if last.kind == TokenKind::Newline => line.pop(),
                    _ => None,
                };
                self.out.append(&mut line);
                self.multiline_body(&marker, held, stream);
            }
            None => self.out.append(&mut line),
        }
        Ok(())
    }

    /// Move the stack to the level of a line whose leading width is
    /// `indent`. Synthetic tokens are placed at `anchor`.
    fn indent_to(&mut self, indent: usize, start: Position, anchor: Position) -> Result<()> {
        let level = indent / 2;
        let top = self.top();

        if level > top {
            self.stack.push(Block {
                level,
                opened: true,
            });
            self.synthesize(TokenKind::Indent, level.to_string(), anchor);
            return Ok(());
        }

        while self.stack.len() > 1 && self.top() > level {
            self.close_block(anchor);
        }

        if self.top() != level {
            match self.options.indent_policy {
                IndentPolicy::Strict => {
                    return Err(Error::parse(
                        ErrorCode::InconsistentIndentation,
                        format!(
                            "dedent to level {} does not match any enclosing block (nearest is level {})",
                            level,
                            self.top()
                        ),
                        start,
                    ));
                }
                IndentPolicy::RoundDown => {
                    debug!(
                        "continuing level {} at level {} at {}",
                        self.top(),
                        level,
                        start
                    );
                    self.stack.push(Block {
                        level,
                        opened: false,
                    });
                }
            }
        }
        Ok(())
    }

    fn close_block(&mut self, anchor: Position) {
        if let Some(block) = self.stack.pop() {
            if block.opened {
                self.synthesize(TokenKind::Dedent, String::new(), anchor);
            }
        }
    }

    /// Convert the raw body lines that follow a multiline start into
    /// `MultilineString` tokens, then close the block with `MultilineEnd`
    /// and the last newline seen.
    fn multiline_body(&mut self, marker: &str, mut held: Option<Token>, stream: &mut Stream) {
        let keep_indent = marker == "|+";

        while let Some(body) =
            stream.next_if(|t| t.kind == TokenKind::Value && t.position.column == 1)
        {
            let (text, position) = if keep_indent {
                (body.text, body.position)
            } else {
                let text = body.text.trim_start();
                let margin = &body.text[..body.text.len() - text.len()];
                let position = Position::new(
                    body.position.line,
                    body.position.column + margin.chars().count(),
                    body.position.offset + margin.len(),
                );
                (text.to_string(), position)
            };
            let token = Token::new(TokenKind::MultilineString, text, position, body.indent);
            trace!("Token {} at {}: {:?}", token.kind, token.position, token.text);
            self.out.push(token);

            if let Some(newline) = stream.next_if(|t| t.kind == TokenKind::Newline) {
                held = Some(newline);
            }
        }

        let position = match (&held, self.out.last()) {
            (Some(newline), _) => newline.position,
            (None, Some(last)) => last.position,
            (None, None) => Position::start(),
        };
        self.synthesize(TokenKind::MultilineEnd, String::new(), position);
        if let Some(newline) = held {
            self.out.push(newline);
        }
    }

    /// Close every open block and flush whatever is still pending.
    fn finish(&mut self, eof: Option<Token>) {
        let eof = eof.unwrap_or_else(|| {
            let position = self.out.last().map_or(Position::start(), |t| t.position);
            Token::synthetic(TokenKind::Eof, "", position)
        });
        let anchor = self.pending.first().map_or(eof.position, |t| t.position);

        while self.stack.len() > 1 {
            self.close_block(anchor);
        }
        self.out.append(&mut self.pending);
        self.out.push(eof);
    }
}
