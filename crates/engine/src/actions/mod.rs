// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action execution and dry-run projection.
//!
//! Dispatch is a closed match over [`ActionKind`] so adding an action is a
//! compile error until every operation handles it.

mod mkdir;
mod pull;
mod push;
mod run;
mod template;
mod wait;

use crate::error::ExecError;
use crate::expand::expand_env_strict;
use crate::runtime::Runtime;
use hades_core::ActionKind;
use std::collections::HashMap;

/// Execute one action against the runtime context.
pub async fn execute(action: &ActionKind, rt: &mut Runtime<'_>) -> Result<(), ExecError> {
    match action {
        ActionKind::Run { command } => run::execute(command, rt).await,
        ActionKind::Mkdir { path, mode } => mkdir::execute(path, *mode, rt).await,
        ActionKind::Template { src, dst } => template::execute(src, dst, rt).await,
        ActionKind::Pull {
            registry,
            name,
            tag,
            to,
        } => pull::execute(registry, name, tag, to, rt).await,
        ActionKind::Push {
            registry,
            artifact,
            name,
            tag,
        } => push::execute(registry, artifact, name, tag, rt).await,
        ActionKind::Wait { message, timeout } => {
            wait::execute(message.as_deref(), timeout.as_deref(), rt).await
        }
    }
}

/// The action's human-readable one-liner, with expansions applied and no
/// side effects.
pub fn dry_run(action: &ActionKind, env: &HashMap<String, String>) -> String {
    match action {
        ActionKind::Run { command } => run::dry_run(command, env),
        ActionKind::Mkdir { path, mode } => mkdir::dry_run(path, *mode, env),
        ActionKind::Template { src, dst } => template::dry_run(src, dst),
        ActionKind::Pull {
            registry,
            name,
            tag,
            to,
        } => pull::dry_run(registry, name, tag, to, env),
        ActionKind::Push {
            registry,
            artifact,
            name,
            tag,
        } => push::dry_run(registry, artifact, name, tag, env),
        ActionKind::Wait { message, timeout } => {
            wait::dry_run(message.as_deref(), timeout.as_deref())
        }
    }
}

/// Strict expansion of one named field, for actions where an unresolved
/// variable must stop execution before any effect happens.
fn expand_field(
    field: &str,
    value: &str,
    env: &HashMap<String, String>,
) -> Result<String, ExecError> {
    expand_env_strict(value, env).map_err(|missing| {
        ExecError::ConfigInvalid(format!(
            "failed to expand {field}: missing environment variables: {}",
            missing.join(", ")
        ))
    })
}

/// Best-effort strict expansion for dry-run display; unresolved fields
/// show as-is.
fn expand_field_lossy(value: &str, env: &HashMap<String, String>) -> String {
    expand_env_strict(value, env).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
#[path = "dry_run_tests.rs"]
mod tests;
