// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured results of a plan run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error taxonomy carried in results and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    ConfigInvalid,
    ResolveFailed,
    ConnectFailed,
    ActionFailed,
    RegistryConflict,
    RegistryMissing,
    ArtifactMissing,
    UserDeclined,
    WaitTimeout,
    Aborted,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::ConfigInvalid => "config-invalid",
            ErrorKind::ResolveFailed => "resolve-failed",
            ErrorKind::ConnectFailed => "connect-failed",
            ErrorKind::ActionFailed => "action-failed",
            ErrorKind::RegistryConflict => "registry-conflict",
            ErrorKind::RegistryMissing => "registry-missing",
            ErrorKind::ArtifactMissing => "artifact-missing",
            ErrorKind::UserDeclined => "user-declined",
            ErrorKind::WaitTimeout => "wait-timeout",
            ErrorKind::Aborted => "aborted",
        };
        write!(f, "{s}")
    }
}

/// How one host fared in one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostOutcome {
    Ok,
    Failed { kind: ErrorKind, message: String },
    /// Cancellation reached the worker before it could finish.
    Aborted,
}

impl HostOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, HostOutcome::Ok)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostResult {
    pub host: String,
    pub outcome: HostOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub name: String,
    pub host_results: Vec<HostResult>,
}

impl StepResult {
    pub fn is_ok(&self) -> bool {
        self.host_results.iter().all(|r| r.outcome.is_ok())
    }
}

/// The outcome of a whole plan run.
///
/// `aborted` is set when a step failure (or external cancellation) stopped
/// the plan before all steps ran; `step_results` holds every step that
/// started, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub step_results: Vec<StepResult>,
    pub aborted: bool,
    /// Kind of the failure that stopped the plan, when `aborted` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl RunResult {
    pub fn success(&self) -> bool {
        !self.aborted && self.step_results.iter().all(StepResult::is_ok)
    }
}
