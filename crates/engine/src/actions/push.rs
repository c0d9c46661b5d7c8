// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `push`: publish a stored artifact to a registry.

use super::{expand_field, expand_field_lossy};
use crate::error::ExecError;
use crate::runtime::Runtime;
use std::collections::HashMap;

pub async fn execute(
    registry: &str,
    artifact: &str,
    name: &str,
    tag: &str,
    rt: &mut Runtime<'_>,
) -> Result<(), ExecError> {
    let registry = expand_field("registry", registry, rt.env)?;
    let artifact = expand_field("artifact", artifact, rt.env)?;
    let name = expand_field("name", name, rt.env)?;
    let tag = expand_field("tag", tag, rt.env)?;

    let reg = rt.registries.get(&registry)?;
    let mut data = rt.artifacts.get(&artifact)?;
    reg.push(&name, &tag, &mut data).await?;
    Ok(())
}

pub fn dry_run(
    registry: &str,
    artifact: &str,
    name: &str,
    tag: &str,
    env: &HashMap<String, String>,
) -> String {
    format!(
        "push: artifact={} to registry={} as {}:{}",
        expand_field_lossy(artifact, env),
        expand_field_lossy(registry, env),
        expand_field_lossy(name, env),
        expand_field_lossy(tag, env),
    )
}
