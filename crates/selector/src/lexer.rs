// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Byte-oriented selector lexer.

use crate::token::{Token, TokenKind};
use thiserror::Error;

/// Lex errors carry the byte position of the offending input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character {ch:?} at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("unexpected character at position {pos}, expected {expected:?}")]
    ExpectedDouble { expected: &'static str, pos: usize },
    #[error("unexpected end of input at position {pos}, expected '=' or '~' after '='")]
    EofAfterEquals { pos: usize },
    #[error("unexpected character {ch:?} at position {pos}, expected '=' or '~'")]
    BadAfterEquals { ch: char, pos: usize },
    #[error("unterminated string starting at position {pos}")]
    UnterminatedString { pos: usize },
}

/// Lex a selector expression into tokens (EOF-terminated).
pub fn lex(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer {
        input: input.as_bytes(),
        src: input,
        pos: 0,
        tokens: Vec::new(),
    }
    .lex()
}

struct Lexer<'a> {
    input: &'a [u8],
    src: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl Lexer<'_> {
    fn lex(mut self) -> Result<Vec<Token>, LexError> {
        while self.pos < self.input.len() {
            let ch = self.input[self.pos];

            if ch == b' ' || ch == b'\t' || ch == b'\n' || ch == b'\r' {
                self.pos += 1;
                continue;
            }

            match ch {
                b'(' => self.emit(TokenKind::LParen, "("),
                b')' => self.emit(TokenKind::RParen, ")"),
                b'=' => self.lex_equals()?,
                b'!' => self.lex_bang(),
                b'&' => {
                    self.expect_double(b'&', "&&")?;
                    self.emit(TokenKind::And, "&&");
                }
                b'|' => {
                    self.expect_double(b'|', "||")?;
                    self.emit(TokenKind::Or, "||");
                }
                b'"' => self.lex_string()?,
                _ if is_ident_start(ch) => self.lex_ident(),
                _ => {
                    return Err(LexError::UnexpectedChar {
                        ch: byte_as_char(ch),
                        pos: self.pos,
                    })
                }
            }
        }

        self.tokens.push(Token::new(TokenKind::Eof, "", self.pos));
        Ok(self.tokens)
    }

    fn emit(&mut self, kind: TokenKind, text: &str) {
        self.tokens.push(Token::new(kind, text, self.pos));
        self.pos += 1;
    }

    /// `==` or `=~` starting at the current `=`.
    fn lex_equals(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let Some(&next) = self.input.get(self.pos + 1) else {
            return Err(LexError::EofAfterEquals { pos: start });
        };
        let kind = match next {
            b'=' => TokenKind::Eq,
            b'~' => TokenKind::Match,
            _ => {
                return Err(LexError::BadAfterEquals {
                    ch: byte_as_char(next),
                    pos: self.pos + 1,
                })
            }
        };
        let text = if kind == TokenKind::Eq { "==" } else { "=~" };
        self.tokens.push(Token::new(kind, text, start));
        self.pos += 2;
        Ok(())
    }

    /// `!=`, `!~`, or bare `!`.
    fn lex_bang(&mut self) {
        match self.input.get(self.pos + 1) {
            Some(b'=') => {
                self.pos += 1;
                self.emit(TokenKind::Neq, "!=");
            }
            Some(b'~') => {
                self.pos += 1;
                self.emit(TokenKind::NotMatch, "!~");
            }
            _ => self.emit(TokenKind::Not, "!"),
        }
    }

    fn expect_double(&mut self, ch: u8, op: &'static str) -> Result<(), LexError> {
        if self.input.get(self.pos + 1) != Some(&ch) {
            return Err(LexError::ExpectedDouble {
                expected: op,
                pos: self.pos,
            });
        }
        self.pos += 1;
        Ok(())
    }

    /// Double-quoted string. A backslash skips the following byte, and both
    /// bytes are kept verbatim in the token text.
    fn lex_string(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        self.pos += 1; // opening quote
        while self.pos < self.input.len() {
            match self.input[self.pos] {
                b'\\' => self.pos += 2,
                b'"' => {
                    let text = &self.src[start + 1..self.pos];
                    self.tokens.push(Token::new(TokenKind::Str, text, start));
                    self.pos += 1;
                    return Ok(());
                }
                _ => self.pos += 1,
            }
        }
        Err(LexError::UnterminatedString { pos: start })
    }

    fn lex_ident(&mut self) {
        let start = self.pos;
        while self.pos < self.input.len() && is_ident_part(self.input[self.pos]) {
            self.pos += 1;
        }
        let text = &self.src[start..self.pos];
        self.tokens.push(Token::new(TokenKind::Ident, text, start));
    }
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_ident_part(ch: u8) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit() || ch == b'-' || ch == b'.' || ch == b'/'
}

fn byte_as_char(ch: u8) -> char {
    char::from(ch)
}

#[cfg(test)]
#[path = "lexer_tests.rs"]
mod tests;
