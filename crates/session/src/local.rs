// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local sessions: commands run on the orchestrator host itself.

use crate::{Session, SessionClient, SessionError};
use async_trait::async_trait;
use hades_core::Host;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Runs commands through `sh -c` on the local machine.
#[derive(Clone, Default)]
pub struct LocalClient;

impl LocalClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionClient for LocalClient {
    async fn connect(
        &self,
        _cancel: &CancellationToken,
        _host: &Host,
    ) -> Result<Box<dyn Session>, SessionError> {
        Ok(Box::new(LocalSession))
    }
}

struct LocalSession;

#[async_trait]
impl Session for LocalSession {
    async fn run(
        &mut self,
        cancel: &CancellationToken,
        cmd: &str,
        stdout: &mut (dyn Write + Send),
        stderr: &mut (dyn Write + Send),
    ) -> Result<(), SessionError> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let out_pipe = child.stdout.take();
        let err_pipe = child.stderr.take();

        // Drain both pipes concurrently so a full stderr buffer can never
        // stall a stdout-heavy command (or vice versa).
        let wait = async {
            let drain_out = async {
                match out_pipe {
                    Some(pipe) => pump(pipe, stdout).await,
                    None => Ok(()),
                }
            };
            let drain_err = async {
                match err_pipe {
                    Some(pipe) => pump(pipe, stderr).await,
                    None => Ok(()),
                }
            };
            tokio::try_join!(drain_out, drain_err)?;
            Ok::<_, SessionError>(child.wait().await?)
        };

        let status = tokio::select! {
            _ = cancel.cancelled() => return Err(SessionError::Cancelled),
            status = wait => status?,
        };

        if !status.success() {
            let code = status.code().unwrap_or(-1);
            return Err(SessionError::CommandFailed {
                status: code as u32,
            });
        }
        Ok(())
    }

    async fn copy_file(
        &mut self,
        cancel: &CancellationToken,
        data: &mut (dyn AsyncRead + Send + Unpin),
        dest: &str,
        mode: u32,
    ) -> Result<(), SessionError> {
        let write = write_atomic(data, dest, mode);
        tokio::select! {
            _ = cancel.cancelled() => Err(SessionError::Cancelled),
            result = write => result,
        }
    }
}

/// Drain a pipe into a sink, chunk by chunk.
async fn pump(
    mut pipe: impl AsyncRead + Unpin,
    sink: &mut (dyn Write + Send),
) -> Result<(), SessionError> {
    let mut buf = [0u8; 8192];
    loop {
        let n = pipe.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        sink.write_all(&buf[..n])?;
    }
}

/// Write to `<dest>.tmp` then rename into place.
async fn write_atomic(
    data: &mut (dyn AsyncRead + Send + Unpin),
    dest: &str,
    mode: u32,
) -> Result<(), SessionError> {
    let dest_path = Path::new(dest);
    if let Some(parent) = dest_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = format!("{dest}.tmp");
    let result = write_file(data, &tmp, mode).await;
    if result.is_err() {
        let _ = tokio::fs::remove_file(&tmp).await;
        return result;
    }

    if let Err(e) = tokio::fs::rename(&tmp, dest_path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

async fn write_file(
    data: &mut (dyn AsyncRead + Send + Unpin),
    path: &str,
    mode: u32,
) -> Result<(), SessionError> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(mode);
    #[cfg(not(unix))]
    let _ = mode;
    let mut file = options.open(path).await?;
    tokio::io::copy(data, &mut file).await?;
    Ok(())
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
