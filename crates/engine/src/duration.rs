// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Duration strings for the `wait` action: `"30s"`, `"5m"`, `"1h30m"`,
//! `"500ms"`.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid duration {0:?}")]
pub struct DurationParseError(pub String);

/// Parse a compound duration string. Units: `ms`, `s`, `m`, `h`.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DurationParseError(input.to_string()));
    }

    let bytes = s.as_bytes();
    let mut pos = 0;
    let mut total = Duration::ZERO;
    while pos < bytes.len() {
        let digits_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        let value: u64 = s[digits_start..pos]
            .parse()
            .map_err(|_| DurationParseError(input.to_string()))?;

        let unit_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        total += match &s[unit_start..pos] {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value * 60),
            "h" => Duration::from_secs(value * 3600),
            _ => return Err(DurationParseError(input.to_string())),
        };
    }
    Ok(total)
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod tests;
