// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hades-session: run commands and copy files on a host, over SSH or
//! locally.
//!
//! A [`SessionClient`] hands out logical [`Session`]s. The SSH client pools
//! one transport per `user@address`; sessions multiplex over it and
//! dropping a session never tears the transport down.

mod local;
mod ssh;

pub use local::LocalClient;
pub use ssh::{AcceptAll, HostKeyVerifier, SshClient};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSessionClient, SessionCall};

use async_trait::async_trait;
use hades_core::Host;
use std::io::Write;
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read SSH key {path:?}: {message}")]
    KeyRead { path: String, message: String },
    #[error("SSH authentication failed for {user}@{address}")]
    Auth { user: String, address: String },
    #[error("failed to connect to {addr}: {message}")]
    Connect { addr: String, message: String },
    #[error("command failed with exit status {status}")]
    CommandFailed { status: u32 },
    #[error("command terminated without an exit status")]
    NoExitStatus,
    #[error("operation cancelled")]
    Cancelled,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("ssh error: {0}")]
    Ssh(#[from] russh::Error),
}

impl SessionError {
    /// True when the error is cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SessionError::Cancelled)
    }
}

/// One logical session on a host. Commands and copies are serial within a
/// session; every blocking call races the cancellation token.
#[async_trait]
pub trait Session: Send {
    /// Run a shell command, streaming stdout and stderr into the writers.
    /// A non-zero exit status is an error.
    async fn run(
        &mut self,
        cancel: &CancellationToken,
        cmd: &str,
        stdout: &mut (dyn Write + Send),
        stderr: &mut (dyn Write + Send),
    ) -> Result<(), SessionError>;

    /// Stream `data` to `dest` with the given Unix mode, creating parent
    /// directories and renaming into place atomically.
    async fn copy_file(
        &mut self,
        cancel: &CancellationToken,
        data: &mut (dyn AsyncRead + Send + Unpin),
        dest: &str,
        mode: u32,
    ) -> Result<(), SessionError>;
}

/// Hands out sessions for hosts. Implementations decide whether "connect"
/// means dialing a remote or just handing back a local shell.
#[async_trait]
pub trait SessionClient: Send + Sync {
    async fn connect(
        &self,
        cancel: &CancellationToken,
        host: &Host,
    ) -> Result<Box<dyn Session>, SessionError>;
}
