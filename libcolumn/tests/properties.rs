//! Property-based tests for the tokenizer, indentation lexer and scalar
//! classification.

use libcolumn::{
    apply_format, detect_type, lex, lex_with_options, load, tokenize, EmptyEnv, IndentPolicy,
    LexOptions, MultilineFormat, ScalarType, Token, TokenKind,
};
use proptest::prelude::*;

/// Nesting depths where each line is at most one level deeper than the
/// previous one, so every dedent lands on a level that is still open.
fn depths_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..5, 1..24).prop_map(|raw| {
        let mut depths = Vec::with_capacity(raw.len());
        let mut prev = 0;
        for (i, d) in raw.into_iter().enumerate() {
            let depth = if i == 0 { 0 } else { d.min(prev + 1) };
            depths.push(depth);
            prev = depth;
        }
        depths
    })
}

/// A well-indented document of `key: value` and bare `key:` lines,
/// sometimes separated by blank or comment lines.
fn document_strategy() -> impl Strategy<Value = String> {
    (
        depths_strategy(),
        prop::collection::vec("[a-z][a-z0-9 ]{0,8}[a-z0-9]", 24),
        prop::collection::vec(0u8..6, 24),
    )
        .prop_map(|(depths, values, extras)| {
            let mut out = String::new();
            for (i, depth) in depths.iter().enumerate() {
                let pad = "  ".repeat(*depth);
                match extras[i] {
                    0 => out.push('\n'),
                    1 => out.push_str(&format!("{}// note {}\n", pad, i)),
                    _ => {}
                }
                if extras[i] == 5 {
                    out.push_str(&format!("{}k{}:\n", pad, i));
                } else {
                    out.push_str(&format!("{}k{}: {}\n", pad, i, values[i]));
                }
            }
            out
        })
}

fn count(tokens: &[Token], kind: TokenKind) -> usize {
    tokens.iter().filter(|t| t.kind == kind).count()
}

/// Line and column of a byte offset, counted the way the tokenizer counts.
fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = source[line_start..offset].chars().count() + 1;
    (line, column)
}

proptest! {
    #[test]
    fn indents_and_dedents_balance(source in document_strategy()) {
        let tokens = lex(tokenize(&source).unwrap()).unwrap();
        prop_assert_eq!(count(&tokens, TokenKind::Indent), count(&tokens, TokenKind::Dedent));
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn offsets_never_decrease(source in document_strategy()) {
        let tokens = lex(tokenize(&source).unwrap()).unwrap();
        for pair in tokens.windows(2) {
            prop_assert!(
                pair[0].position.offset <= pair[1].position.offset,
                "{:?} comes after {:?}",
                pair[1],
                pair[0]
            );
        }
    }

    #[test]
    fn positions_match_source(source in document_strategy()) {
        let tokens = tokenize(&source).unwrap();
        for token in &tokens {
            if !matches!(token.kind, TokenKind::Key | TokenKind::Colon | TokenKind::Value | TokenKind::Comment) {
                continue;
            }
            let offset = token.position.offset;
            prop_assert!(source[offset..].starts_with(&token.text) || token.kind == TokenKind::Comment);
            prop_assert_eq!(
                line_column(&source, offset),
                (token.position.line, token.position.column),
                "position of {:?}",
                token
            );
        }
    }

    #[test]
    fn well_indented_documents_load(source in document_strategy()) {
        prop_assert!(load(&source, &EmptyEnv).is_ok(), "failed to load:\n{}", source);
    }

    #[test]
    fn round_down_accepts_any_indentation(
        indents in prop::collection::vec(0usize..9, 1..16),
    ) {
        let source: String = indents
            .iter()
            .enumerate()
            .map(|(i, n)| format!("{}k{}: v\n", " ".repeat(if i == 0 { 0 } else { *n }), i))
            .collect();
        let options = LexOptions { indent_policy: IndentPolicy::RoundDown };
        let tokens = lex_with_options(tokenize(&source).unwrap(), &options).unwrap();
        prop_assert_eq!(count(&tokens, TokenKind::Indent), count(&tokens, TokenKind::Dedent));
    }

    #[test]
    fn fold_is_idempotent(text in "[ a-z\t\n]{0,60}") {
        let once = apply_format(MultilineFormat::Fold, &text);
        let twice = apply_format(MultilineFormat::Fold, &once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn detection_is_deterministic(text in "\\PC{0,20}") {
        prop_assert_eq!(detect_type(&text), detect_type(&text));
    }

    #[test]
    fn digit_runs_are_integers(text in "-?[1-9][0-9]{0,12}") {
        prop_assert_eq!(detect_type(&text), ScalarType::Integer);
    }

    #[test]
    fn words_are_strings(text in "[g-z][a-z ]{0,10}[a-z]") {
        prop_assume!(!matches!(text.as_str(), "null" | "true" | "false"));
        prop_assert_eq!(detect_type(&text), ScalarType::String);
    }
}
