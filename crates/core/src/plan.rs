// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plans and steps.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// How a step fans out over its hosts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parallelism {
    /// One host at a time (the default when nothing is declared).
    #[default]
    Sequential,
    /// Every host at once.
    All,
    /// At most `limit` hosts at once.
    Bounded,
}

/// Errors from step parallelism validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StepConfigError {
    #[error("step {step:?}: parallelism \"bounded\" requires limit > 0")]
    BoundedWithoutLimit { step: String },
    #[error("step {step:?}: limit {limit} requires parallelism \"bounded\"")]
    LimitWithoutBounded { step: String, limit: usize },
}

/// One job applied to a set of targets under a parallelism policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub job: String,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub parallelism: Parallelism,
    #[serde(default)]
    pub limit: usize,
}

impl Step {
    pub fn new(name: impl Into<String>, job: impl Into<String>, targets: Vec<String>) -> Self {
        Self {
            name: name.into(),
            job: job.into(),
            targets,
            env: HashMap::new(),
            parallelism: Parallelism::default(),
            limit: 0,
        }
    }

    /// The number of concurrent worker permits for this step.
    ///
    /// Ambiguous combinations (a limit without `bounded`, or `bounded`
    /// without a positive limit) are rejected rather than guessed at.
    pub fn permits(&self, host_count: usize) -> Result<usize, StepConfigError> {
        match self.parallelism {
            Parallelism::Bounded => {
                if self.limit == 0 {
                    return Err(StepConfigError::BoundedWithoutLimit {
                        step: self.name.clone(),
                    });
                }
                Ok(self.limit)
            }
            Parallelism::All | Parallelism::Sequential if self.limit != 0 => {
                Err(StepConfigError::LimitWithoutBounded {
                    step: self.name.clone(),
                    limit: self.limit,
                })
            }
            Parallelism::All => Ok(host_count.max(1)),
            Parallelism::Sequential => Ok(1),
        }
    }
}

/// An ordered list of steps run under a single run ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
