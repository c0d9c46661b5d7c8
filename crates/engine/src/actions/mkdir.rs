// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mkdir`: create a remote directory with a mode.

use crate::error::ExecError;
use crate::expand::expand_env_vars;
use crate::runtime::Runtime;
use std::collections::HashMap;

pub async fn execute(path: &str, mode: u32, rt: &mut Runtime<'_>) -> Result<(), ExecError> {
    let path = expand_env_vars(path, rt.env);
    let cmd = format!("mkdir -p {path} && chmod {mode:o} {path}");
    let mut stdout = rt.stdout.clone();
    let mut stderr = rt.stderr.clone();
    rt.session
        .run(rt.cancel, &cmd, &mut stdout, &mut stderr)
        .await
        .map_err(ExecError::from_session)
}

pub fn dry_run(path: &str, mode: u32, env: &HashMap<String, String>) -> String {
    format!("mkdir: {} (mode: {mode:o})", expand_env_vars(path, env))
}
