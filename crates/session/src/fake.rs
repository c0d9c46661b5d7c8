// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake session client for other crates' tests.

use crate::{Session, SessionClient, SessionError};
use async_trait::async_trait;
use hades_core::Host;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

/// One recorded call against the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    Connect {
        host: String,
    },
    Run {
        host: String,
        cmd: String,
    },
    CopyFile {
        host: String,
        dest: String,
        mode: u32,
        bytes: Vec<u8>,
    },
}

#[derive(Default)]
struct FakeState {
    calls: Mutex<Vec<SessionCall>>,
    fail_connect: Mutex<HashSet<String>>,
    fail_run: Mutex<HashSet<String>>,
    run_delay: Mutex<Duration>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

/// Records every call; commands "succeed" after an optional delay and echo
/// themselves to the stdout writer. Failures are opt-in per host.
#[derive(Clone, Default)]
pub struct FakeSessionClient {
    state: Arc<FakeState>,
}

impl FakeSessionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `run` on this fake sleeps this long first (for concurrency
    /// observations).
    pub fn set_run_delay(&self, delay: Duration) {
        *self.state.run_delay.lock() = delay;
    }

    /// Make `connect` fail for the given host.
    pub fn fail_connect(&self, host: &str) {
        self.state.fail_connect.lock().insert(host.to_string());
    }

    /// Make every `run` fail for the given host.
    pub fn fail_run(&self, host: &str) {
        self.state.fail_run.lock().insert(host.to_string());
    }

    pub fn calls(&self) -> Vec<SessionCall> {
        self.state.calls.lock().clone()
    }

    /// Commands run on one host, in order.
    pub fn commands_for(&self, host: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SessionCall::Run { host: h, cmd } if h == host => Some(cmd),
                _ => None,
            })
            .collect()
    }

    /// High-water mark of concurrently running commands.
    pub fn max_active(&self) -> usize {
        self.state.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionClient for FakeSessionClient {
    async fn connect(
        &self,
        _cancel: &CancellationToken,
        host: &Host,
    ) -> Result<Box<dyn Session>, SessionError> {
        self.state.calls.lock().push(SessionCall::Connect {
            host: host.name.clone(),
        });
        if self.state.fail_connect.lock().contains(&host.name) {
            return Err(SessionError::Connect {
                addr: format!("{}:{}", host.address, host.effective_port()),
                message: "fake connect failure".to_string(),
            });
        }
        Ok(Box::new(FakeSession {
            host: host.name.clone(),
            state: Arc::clone(&self.state),
        }))
    }
}

struct FakeSession {
    host: String,
    state: Arc<FakeState>,
}

#[async_trait]
impl Session for FakeSession {
    async fn run(
        &mut self,
        cancel: &CancellationToken,
        cmd: &str,
        stdout: &mut (dyn Write + Send),
        _stderr: &mut (dyn Write + Send),
    ) -> Result<(), SessionError> {
        self.state.calls.lock().push(SessionCall::Run {
            host: self.host.clone(),
            cmd: cmd.to_string(),
        });

        let now_active = self.state.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_active.fetch_max(now_active, Ordering::SeqCst);
        let delay = *self.state.run_delay.lock();
        let waited = tokio::select! {
            _ = cancel.cancelled() => Err(SessionError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        };
        self.state.active.fetch_sub(1, Ordering::SeqCst);
        waited?;

        if self.state.fail_run.lock().contains(&self.host) {
            return Err(SessionError::CommandFailed { status: 1 });
        }
        writeln!(stdout, "{cmd}")?;
        Ok(())
    }

    async fn copy_file(
        &mut self,
        _cancel: &CancellationToken,
        data: &mut (dyn AsyncRead + Send + Unpin),
        dest: &str,
        mode: u32,
    ) -> Result<(), SessionError> {
        let mut bytes = Vec::new();
        data.read_to_end(&mut bytes).await?;
        self.state.calls.lock().push(SessionCall::CopyFile {
            host: self.host.clone(),
            dest: dest.to_string(),
            mode,
            bytes,
        });
        Ok(())
    }
}
