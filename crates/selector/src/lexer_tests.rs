// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the selector lexer

use super::*;
use crate::token::TokenKind::*;
use yare::parameterized;

fn kinds(input: &str) -> Vec<TokenKind> {
    lex(input).unwrap().into_iter().map(|t| t.kind).collect()
}

#[parameterized(
    simple_comparison = { r#"env == "dev""#, &[Ident, Eq, Str, Eof] },
    and_expression = { r#"cluster == "db" && env == "dev""#, &[Ident, Eq, Str, And, Ident, Eq, Str, Eof] },
    or_expression = { r#"env == "dev" || env == "staging""#, &[Ident, Eq, Str, Or, Ident, Eq, Str, Eof] },
    not_equal = { r#"env != "prod""#, &[Ident, Neq, Str, Eof] },
    regex_match = { r#"name =~ "db-[0-9]+""#, &[Ident, Match, Str, Eof] },
    regex_not_match = { r#"name !~ "test.*""#, &[Ident, NotMatch, Str, Eof] },
    negation = { r#"!active == "true""#, &[Not, Ident, Eq, Str, Eof] },
    parentheses = { r#"(env == "dev")"#, &[LParen, Ident, Eq, Str, RParen, Eof] },
    ident_with_dots_and_dashes = { r#"k8s.io/cluster-name == "main""#, &[Ident, Eq, Str, Eof] },
    whitespace_skipped = { "env\t==\n\"dev\"\r\n", &[Ident, Eq, Str, Eof] },
)]
fn lex_kinds(input: &str, want: &[TokenKind]) {
    assert_eq!(kinds(input), want);
}

#[parameterized(
    unterminated_string = { r#"env == "dev"# },
    unexpected_character = { r#"env @ "dev""# },
    lone_ampersand = { r#"env == "a" & env == "b""# },
    lone_pipe = { r#"env == "a" | env == "b""# },
    equals_then_junk = { r#"env =x "dev""# },
    trailing_equals = { "env =" },
)]
fn lex_errors(input: &str) {
    assert!(lex(input).is_err());
}

#[test]
fn tokens_carry_byte_positions() {
    let tokens = lex(r#"env == "dev""#).unwrap();
    assert_eq!(tokens[0].pos, 0);
    assert_eq!(tokens[1].pos, 4);
    assert_eq!(tokens[2].pos, 7);
}

#[test]
fn string_escapes_kept_verbatim() {
    let tokens = lex(r#"k == "a\"b""#).unwrap();
    assert_eq!(tokens[2].kind, Str);
    assert_eq!(tokens[2].text, r#"a\"b"#);
}

#[test]
fn unexpected_character_reports_position() {
    let err = lex(r#"env @ "dev""#).unwrap_err();
    assert_eq!(err, LexError::UnexpectedChar { ch: '@', pos: 4 });
    assert_eq!(
        err.to_string(),
        "unexpected character '@' at position 4"
    );
}

#[test]
fn unterminated_string_reports_opening_quote() {
    let err = lex(r#"env == "dev"#).unwrap_err();
    assert_eq!(err, LexError::UnterminatedString { pos: 7 });
}

#[test]
fn empty_input_lexes_to_eof() {
    assert_eq!(kinds(""), vec![Eof]);
}
