// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SSH sessions over pooled russh transports.

use crate::{Session, SessionClient, SessionError};
use async_trait::async_trait;
use hades_core::Host;
use parking_lot::Mutex;
use russh::client::{self, AuthResult, Handle};
use russh::keys::{load_secret_key, PrivateKeyWithHashAlg};
use russh::{ChannelMsg, Disconnect};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

/// Decides whether a server's host key is acceptable.
///
/// The default [`AcceptAll`] mirrors the common bootstrap posture; deployers
/// wanting known-hosts checking inject their own implementation.
pub trait HostKeyVerifier: Send + Sync {
    fn verify(&self, host: &str, key: &russh::keys::ssh_key::PublicKey) -> bool;
}

/// Accepts every host key.
#[derive(Clone, Default)]
pub struct AcceptAll;

impl HostKeyVerifier for AcceptAll {
    fn verify(&self, _host: &str, _key: &russh::keys::ssh_key::PublicKey) -> bool {
        true
    }
}

struct ClientHandler {
    host: String,
    verifier: Arc<dyn HostKeyVerifier>,
}

impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &russh::keys::ssh_key::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(self.verifier.verify(&self.host, server_public_key))
    }
}

type Transport = Handle<ClientHandler>;

/// SSH client with one pooled transport per `user@address`.
///
/// The pool mutex guards only the map; dialing happens outside it behind a
/// per-key single-flight cell, so concurrent first connects to the same
/// host share one dial and connects to distinct hosts never serialize.
pub struct SshClient {
    config: Arc<client::Config>,
    verifier: Arc<dyn HostKeyVerifier>,
    pool: Mutex<HashMap<String, Arc<OnceCell<Arc<Transport>>>>>,
}

impl Default for SshClient {
    fn default() -> Self {
        Self::new(Arc::new(AcceptAll))
    }
}

impl SshClient {
    pub fn new(verifier: Arc<dyn HostKeyVerifier>) -> Self {
        Self {
            config: Arc::new(client::Config::default()),
            verifier,
            pool: Mutex::new(HashMap::new()),
        }
    }

    /// Disconnect every pooled transport. Sessions handed out earlier
    /// become unusable.
    pub async fn close_all(&self) {
        let cells: Vec<Arc<OnceCell<Arc<Transport>>>> =
            self.pool.lock().drain().map(|(_, cell)| cell).collect();
        for cell in cells {
            if let Some(transport) = cell.get() {
                if let Err(e) = transport
                    .disconnect(Disconnect::ByApplication, "", "en")
                    .await
                {
                    tracing::debug!(error = %e, "transport disconnect failed");
                }
            }
        }
    }

    async fn transport(
        &self,
        cancel: &CancellationToken,
        host: &Host,
    ) -> Result<Arc<Transport>, SessionError> {
        let cell = {
            let mut pool = self.pool.lock();
            Arc::clone(pool.entry(host.pool_key()).or_default())
        };

        let dial = cell.get_or_try_init(|| self.dial(host));
        let transport = tokio::select! {
            _ = cancel.cancelled() => return Err(SessionError::Cancelled),
            result = dial => result?,
        };
        Ok(Arc::clone(transport))
    }

    async fn dial(&self, host: &Host) -> Result<Arc<Transport>, SessionError> {
        let key = load_secret_key(&host.key_path, None).map_err(|e| SessionError::KeyRead {
            path: host.key_path.display().to_string(),
            message: e.to_string(),
        })?;

        let addr = format!("{}:{}", host.address, host.effective_port());
        tracing::debug!(host = %host.name, %addr, "dialing ssh transport");

        let handler = ClientHandler {
            host: host.address.clone(),
            verifier: Arc::clone(&self.verifier),
        };
        let mut handle = client::connect(
            Arc::clone(&self.config),
            (host.address.as_str(), host.effective_port()),
            handler,
        )
        .await
        .map_err(|e| SessionError::Connect {
            addr: addr.clone(),
            message: e.to_string(),
        })?;

        let hash_alg = handle.best_supported_rsa_hash().await?.flatten();
        let auth = handle
            .authenticate_publickey(
                &host.user,
                PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
            )
            .await?;
        if !matches!(auth, AuthResult::Success) {
            return Err(SessionError::Auth {
                user: host.user.clone(),
                address: host.address.clone(),
            });
        }

        Ok(Arc::new(handle))
    }
}

#[async_trait]
impl SessionClient for SshClient {
    async fn connect(
        &self,
        cancel: &CancellationToken,
        host: &Host,
    ) -> Result<Box<dyn Session>, SessionError> {
        let transport = self.transport(cancel, host).await?;
        Ok(Box::new(SshSession { transport }))
    }
}

/// A logical session: each operation opens a fresh channel over the shared
/// transport. Dropping the session leaves the transport pooled.
struct SshSession {
    transport: Arc<Transport>,
}

#[async_trait]
impl Session for SshSession {
    async fn run(
        &mut self,
        cancel: &CancellationToken,
        cmd: &str,
        stdout: &mut (dyn Write + Send),
        stderr: &mut (dyn Write + Send),
    ) -> Result<(), SessionError> {
        let exec = async {
            let mut channel = self.transport.channel_open_session().await?;
            channel.exec(true, cmd).await?;
            drain_channel(&mut channel, stdout, stderr).await
        };
        tokio::select! {
            _ = cancel.cancelled() => Err(SessionError::Cancelled),
            result = exec => result,
        }
    }

    async fn copy_file(
        &mut self,
        cancel: &CancellationToken,
        data: &mut (dyn AsyncRead + Send + Unpin),
        dest: &str,
        mode: u32,
    ) -> Result<(), SessionError> {
        let copy = async {
            let mut channel = self.transport.channel_open_session().await?;
            channel.exec(true, copy_command(dest, mode)).await?;
            channel.data(&mut *data).await?;
            channel.eof().await?;
            let mut sink = std::io::sink();
            let mut errors = std::io::sink();
            drain_channel(&mut channel, &mut sink, &mut errors).await
        };
        tokio::select! {
            _ = cancel.cancelled() => Err(SessionError::Cancelled),
            result = copy => result,
        }
    }
}

/// Stream channel output into the writers until the channel closes, then
/// check the exit status.
async fn drain_channel(
    channel: &mut russh::Channel<client::Msg>,
    stdout: &mut (dyn Write + Send),
    stderr: &mut (dyn Write + Send),
) -> Result<(), SessionError> {
    let mut status = None;
    while let Some(msg) = channel.wait().await {
        match msg {
            ChannelMsg::Data { ref data } => stdout.write_all(data)?,
            // ext 1 is the stderr stream
            ChannelMsg::ExtendedData { ref data, ext: 1 } => stderr.write_all(data)?,
            ChannelMsg::ExitStatus { exit_status } => status = Some(exit_status),
            _ => {}
        }
    }
    match status {
        Some(0) => Ok(()),
        Some(code) => Err(SessionError::CommandFailed { status: code }),
        None => Err(SessionError::NoExitStatus),
    }
}

/// Remote write pipeline: stage under a temp name, set the mode, rename
/// into place.
fn copy_command(dest: &str, mode: u32) -> String {
    let tmp = format!("{dest}.tmp");
    let mut cmd = String::new();
    if let Some(parent) = Path::new(dest).parent() {
        if !parent.as_os_str().is_empty() {
            cmd.push_str(&format!("mkdir -p {} && ", parent.display()));
        }
    }
    cmd.push_str(&format!(
        "cat > {tmp} && chmod {mode:o} {tmp} && mv {tmp} {dest}"
    ));
    cmd
}

#[cfg(test)]
#[path = "ssh_tests.rs"]
mod tests;
