// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error type and its mapping onto the result taxonomy.

use hades_core::{EnvContractError, ErrorKind, InventoryError, StepConfigError};
use hades_session::SessionError;
use hades_store::{ArtifactError, RegistryError};
use thiserror::Error;

/// Anything that can stop a worker, a step, or the whole plan.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),
    #[error("inventory resolution failed: {0}")]
    ResolveFailed(String),
    #[error("failed to connect to host {host}: {source}")]
    ConnectFailed {
        host: String,
        #[source]
        source: SessionError,
    },
    #[error("action failed: {0}")]
    ActionFailed(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error("user declined to continue")]
    UserDeclined,
    #[error("wait timed out after {0}")]
    WaitTimeout(String),
    #[error("aborted")]
    Aborted,
}

impl ExecError {
    /// Collapse into the coarse taxonomy reported in results and events.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecError::ConfigInvalid(_) => ErrorKind::ConfigInvalid,
            ExecError::ResolveFailed(_) => ErrorKind::ResolveFailed,
            ExecError::ConnectFailed { .. } => ErrorKind::ConnectFailed,
            ExecError::ActionFailed(_) => ErrorKind::ActionFailed,
            ExecError::Registry(e) => match e {
                RegistryError::Conflict { .. } => ErrorKind::RegistryConflict,
                RegistryError::Missing { .. } => ErrorKind::RegistryMissing,
                RegistryError::UnknownRegistry(_) | RegistryError::Config(_) => {
                    ErrorKind::ConfigInvalid
                }
                RegistryError::Backend(_) | RegistryError::Io(_) => ErrorKind::ActionFailed,
            },
            ExecError::Artifact(e) => match e {
                ArtifactError::NotFound(_) => ErrorKind::ArtifactMissing,
                ArtifactError::Io { .. } => ErrorKind::ActionFailed,
            },
            ExecError::UserDeclined => ErrorKind::UserDeclined,
            ExecError::WaitTimeout(_) => ErrorKind::WaitTimeout,
            ExecError::Aborted => ErrorKind::Aborted,
        }
    }

    /// Session failures during an action: cancellation stays cancellation,
    /// everything else is an action failure.
    pub(crate) fn from_session(err: SessionError) -> Self {
        if err.is_cancelled() {
            ExecError::Aborted
        } else {
            ExecError::ActionFailed(err.to_string())
        }
    }
}

impl From<EnvContractError> for ExecError {
    fn from(e: EnvContractError) -> Self {
        ExecError::ConfigInvalid(e.to_string())
    }
}

impl From<InventoryError> for ExecError {
    fn from(e: InventoryError) -> Self {
        ExecError::ConfigInvalid(e.to_string())
    }
}

impl From<StepConfigError> for ExecError {
    fn from(e: StepConfigError) -> Self {
        ExecError::ConfigInvalid(e.to_string())
    }
}
