// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pull`: fetch a registry entry and copy it to the host.

use super::{expand_field, expand_field_lossy};
use crate::error::ExecError;
use crate::runtime::Runtime;
use std::collections::HashMap;

pub async fn execute(
    registry: &str,
    name: &str,
    tag: &str,
    to: &str,
    rt: &mut Runtime<'_>,
) -> Result<(), ExecError> {
    let registry = expand_field("registry", registry, rt.env)?;
    let name = expand_field("name", name, rt.env)?;
    let tag = expand_field("tag", tag, rt.env)?;
    let to = expand_field("to", to, rt.env)?;

    let reg = rt.registries.get(&registry)?;
    let mut stream = reg.pull(&name, &tag).await?;

    rt.session
        .copy_file(rt.cancel, &mut stream, &to, 0o644)
        .await
        .map_err(ExecError::from_session)
}

pub fn dry_run(
    registry: &str,
    name: &str,
    tag: &str,
    to: &str,
    env: &HashMap<String, String>,
) -> String {
    format!(
        "pull: {}:{} from registry={} to {}",
        expand_field_lossy(name, env),
        expand_field_lossy(tag, env),
        expand_field_lossy(registry, env),
        expand_field_lossy(to, env),
    )
}
