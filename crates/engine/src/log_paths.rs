// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical locations for run logs and rendered-template snapshots.

use hades_core::RunId;
use std::path::{Path, PathBuf};

/// Directory holding every file of one run: `<log_root>/<run-id>`.
pub fn run_dir(log_root: &Path, run_id: &RunId) -> PathBuf {
    log_root.join(run_id.as_str())
}

/// Stdout log: `<log_root>/<run-id>/<plan>.<host>.out.log`.
pub fn stdout_log(log_root: &Path, run_id: &RunId, plan: &str, host: &str) -> PathBuf {
    run_dir(log_root, run_id).join(format!("{plan}.{host}.out.log"))
}

/// Stderr log: `<log_root>/<run-id>/<plan>.<host>.err.log`.
pub fn stderr_log(log_root: &Path, run_id: &RunId, plan: &str, host: &str) -> PathBuf {
    run_dir(log_root, run_id).join(format!("{plan}.{host}.err.log"))
}

/// Snapshot root for templates rendered for one host:
/// `<log_root>/<run-id>/rendered/<host>`.
pub fn rendered_dir(log_root: &Path, run_id: &RunId, host: &str) -> PathBuf {
    run_dir(log_root, run_id).join("rendered").join(host)
}

#[cfg(test)]
#[path = "log_paths_tests.rs"]
mod tests;
