// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Selector evaluation against a tag map.

use crate::ast::{CmpOp, Expr};
use crate::lexer::{lex, LexError};
use crate::parser::{parse, ParseError};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// One evaluation failure (an invalid regex, in practice).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError {
    pub message: String,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Evaluation failures, reported together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalErrors {
    pub errors: Vec<EvalError>,
}

impl fmt::Display for EvalErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|e| e.message.clone())
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{joined}")
    }
}

impl std::error::Error for EvalErrors {}

/// Any failure from the full lex → parse → eval pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Eval(EvalErrors),
}

/// Lex, parse, and evaluate a selector against the given tags.
pub fn eval(selector: &str, tags: &HashMap<String, String>) -> Result<bool, SelectorError> {
    let tokens = lex(selector)?;
    let expr = parse(&tokens)?;
    eval_expr(&expr, tags).map_err(|errors| SelectorError::Eval(EvalErrors { errors }))
}

/// Evaluate a parsed expression against the given tags.
///
/// Logical operators short-circuit; a missing tag makes `==`/`=~` false and
/// `!=`/`!~` true.
pub fn eval_expr(expr: &Expr, tags: &HashMap<String, String>) -> Result<bool, Vec<EvalError>> {
    match expr {
        Expr::Comparison { key, op, value } => eval_comparison(key, *op, value, tags),
        Expr::And(left, right) => {
            if !eval_expr(left, tags)? {
                return Ok(false);
            }
            eval_expr(right, tags)
        }
        Expr::Or(left, right) => {
            if eval_expr(left, tags)? {
                return Ok(true);
            }
            eval_expr(right, tags)
        }
        Expr::Not(inner) => Ok(!eval_expr(inner, tags)?),
    }
}

fn eval_comparison(
    key: &str,
    op: CmpOp,
    value: &str,
    tags: &HashMap<String, String>,
) -> Result<bool, Vec<EvalError>> {
    let tag = tags.get(key);
    match op {
        CmpOp::Eq => Ok(tag.is_some_and(|t| t == value)),
        CmpOp::Neq => Ok(tag.is_none_or(|t| t != value)),
        CmpOp::Match => {
            let re = compile(value)?;
            Ok(tag.is_some_and(|t| re.is_match(t)))
        }
        CmpOp::NotMatch => {
            let re = compile(value)?;
            Ok(tag.is_none_or(|t| !re.is_match(t)))
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, Vec<EvalError>> {
    Regex::new(pattern).map_err(|e| {
        vec![EvalError {
            message: format!("invalid regex {pattern:?}: {e}"),
        }]
    })
}

#[cfg(test)]
#[path = "eval_tests.rs"]
mod tests;
