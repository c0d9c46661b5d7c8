// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `run`: execute a shell command on the session.

use crate::error::ExecError;
use crate::expand::expand_env_vars;
use crate::runtime::Runtime;
use std::collections::HashMap;

pub async fn execute(command: &str, rt: &mut Runtime<'_>) -> Result<(), ExecError> {
    let cmd = expand_env_vars(command, rt.env);
    let mut stdout = rt.stdout.clone();
    let mut stderr = rt.stderr.clone();
    rt.session
        .run(rt.cancel, &cmd, &mut stdout, &mut stderr)
        .await
        .map_err(ExecError::from_session)
}

pub fn dry_run(command: &str, env: &HashMap<String, String>) -> String {
    format!("run: {}", expand_env_vars(command, env))
}
