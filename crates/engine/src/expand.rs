// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `${VAR}` expansion against a runtime environment.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("constant regex pattern is valid"));

/// Lenient expansion: unknown variables are left as literal `${VAR}`.
pub fn expand_env_vars(input: &str, env: &HashMap<String, String>) -> String {
    ENV_VAR_PATTERN
        .replace_all(input, |caps: &regex::Captures<'_>| {
            env.get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Strict expansion: unknown variables fail, listing every missing name in
/// order of first appearance.
pub fn expand_env_strict(
    input: &str,
    env: &HashMap<String, String>,
) -> Result<String, Vec<String>> {
    let mut missing: Vec<String> = Vec::new();
    let expanded = ENV_VAR_PATTERN
        .replace_all(input, |caps: &regex::Captures<'_>| {
            match env.get(&caps[1]) {
                Some(value) => value.clone(),
                None => {
                    let name = caps[1].to_string();
                    if !missing.contains(&name) {
                        missing.push(name);
                    }
                    caps[0].to_string()
                }
            }
        })
        .into_owned();

    if missing.is_empty() {
        Ok(expanded)
    } else {
        Err(missing)
    }
}

#[cfg(test)]
#[path = "expand_tests.rs"]
mod tests;
