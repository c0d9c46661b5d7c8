// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed action set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One action in a job, with an optional display name used in log
/// delimiters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub kind: ActionKind,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self { name: None, kind }
    }

    pub fn named(name: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            name: Some(name.into()),
            kind,
        }
    }
}

impl From<ActionKind> for Action {
    fn from(kind: ActionKind) -> Self {
        Self::new(kind)
    }
}

/// A single effect. The set is closed so dispatch stays exhaustive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Run a shell command on the session.
    Run { command: String },
    /// Create a directory with the given Unix mode.
    Mkdir { path: String, mode: u32 },
    /// Render a local template file to a remote path.
    Template { src: String, dst: String },
    /// Pull `name:tag` from a named registry to a remote path.
    Pull {
        registry: String,
        name: String,
        tag: String,
        to: String,
    },
    /// Push a stored artifact to a named registry as `name:tag`.
    Push {
        registry: String,
        artifact: String,
        name: String,
        tag: String,
    },
    /// Pause for operator confirmation on stdin.
    Wait {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout: Option<String>,
    },
}

impl ActionKind {
    /// Short kind label used in log delimiters and events.
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Run { .. } => "run",
            ActionKind::Mkdir { .. } => "mkdir",
            ActionKind::Template { .. } => "template",
            ActionKind::Pull { .. } => "pull",
            ActionKind::Push { .. } => "push",
            ActionKind::Wait { .. } => "wait",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
