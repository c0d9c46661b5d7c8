// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution events published for external renderers.
//!
//! The executor is the only publisher; subscribers (a TUI, a log tailer)
//! observe transitions but cannot mutate execution state.

use crate::result::ErrorKind;
use crate::run::RunId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-host display state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostState {
    Waiting,
    Running,
    Ok,
    Failed,
    Aborted,
}

impl fmt::Display for HostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HostState::Waiting => "waiting",
            HostState::Running => "running",
            HostState::Ok => "ok",
            HostState::Failed => "failed",
            HostState::Aborted => "aborted",
        };
        write!(f, "{s}")
    }
}

/// Events emitted while a plan runs.
///
/// Serializes with `{"type": "scope:name", ...fields}` format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExecEvent {
    #[serde(rename = "run:started")]
    RunStarted { run_id: RunId, plan: String },

    #[serde(rename = "step:started")]
    StepStarted {
        index: usize,
        name: String,
        job: String,
        hosts: Vec<String>,
    },

    #[serde(rename = "step:finished")]
    StepFinished {
        index: usize,
        name: String,
        ok: bool,
    },

    #[serde(rename = "host:transition")]
    HostTransition {
        step: String,
        host: String,
        state: HostState,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ErrorKind>,
    },

    #[serde(rename = "log:line")]
    LogLine { host: String, line: String },
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
