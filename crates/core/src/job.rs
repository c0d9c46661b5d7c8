// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job definitions: an ordered action list plus an env contract.

use crate::action::Action;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One declared environment variable in a job's contract.
///
/// A declaration without a default is required; with a default it is
/// optional and the default is used when no layer provides a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl EnvDecl {
    /// A required variable (no default).
    pub fn required() -> Self {
        Self { default: None }
    }

    /// An optional variable with a default value.
    pub fn with_default(value: impl Into<String>) -> Self {
        Self {
            default: Some(value.into()),
        }
    }
}

/// A reusable ordered list of actions with an env contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Run on the orchestrator host instead of a remote.
    #[serde(default)]
    pub local: bool,
    /// Env contract, in declaration order.
    #[serde(default)]
    pub env: IndexMap<String, EnvDecl>,
    #[serde(default)]
    pub actions: Vec<Action>,
}
