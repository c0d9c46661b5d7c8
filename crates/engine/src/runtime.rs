// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-worker runtime context.

use crate::logger::LogSink;
use hades_core::{Host, RunId};
use hades_session::Session;
use hades_store::{ArtifactManager, RegistryManager};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Everything an action needs while it executes on one host.
///
/// Built when a worker starts and dropped when it finishes; the env is
/// frozen for the worker's lifetime and already carries the `HADES_*`
/// overlay.
pub struct Runtime<'a> {
    pub run_id: &'a RunId,
    pub host: &'a Host,
    pub target: &'a str,
    pub env: &'a HashMap<String, String>,
    pub stdout: LogSink,
    pub stderr: LogSink,
    pub session: &'a mut dyn Session,
    pub registries: &'a RegistryManager,
    pub artifacts: &'a ArtifactManager,
    pub cancel: &'a CancellationToken,
    /// Where rendered templates are snapshotted for post-mortems.
    pub rendered_dir: PathBuf,
}
