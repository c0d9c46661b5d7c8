// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-(run, plan, host) file logger.
//!
//! Two append-mode files per host; writes are serialized under a mutex and
//! fsynced immediately so a crash never loses captured output. Before each
//! action the executor writes a delimiter block to the stdout log.

use crate::log_paths;
use crate::time_fmt::format_utc_now;
use hades_core::RunId;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};

/// Logger for one host in one plan run.
pub struct HostLogger {
    out: Arc<Mutex<File>>,
    err: Arc<Mutex<File>>,
}

impl HostLogger {
    /// Open (or append to) both log files, creating the run directory.
    pub fn open(log_root: &Path, run_id: &RunId, plan: &str, host: &str) -> io::Result<Self> {
        let dir = log_paths::run_dir(log_root, run_id);
        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o755);
        builder.create(&dir)?;

        let out = open_append(&log_paths::stdout_log(log_root, run_id, plan, host))?;
        let err = open_append(&log_paths::stderr_log(log_root, run_id, plan, host))?;
        Ok(Self {
            out: Arc::new(Mutex::new(out)),
            err: Arc::new(Mutex::new(err)),
        })
    }

    /// Writer into the stdout log. Every write is fsynced.
    pub fn stdout(&self) -> LogSink {
        LogSink {
            file: Arc::clone(&self.out),
        }
    }

    /// Writer into the stderr log. Every write is fsynced.
    pub fn stderr(&self) -> LogSink {
        LogSink {
            file: Arc::clone(&self.err),
        }
    }

    /// Delimiter block written to the stdout log before each action.
    pub fn write_action_delimiter(
        &self,
        job: &str,
        action_index: usize,
        action_kind: &str,
        action_name: Option<&str>,
    ) -> io::Result<()> {
        let action_desc = match action_name {
            Some(name) => format!("[{action_index}] {action_kind} // {name}"),
            None => format!("[{action_index}] {action_kind}"),
        };
        let delimiter = format!(
            "\n====================\nJOB: {job}, ACTION: {action_desc}\nSTARTED: {}\n--------------------\n\n",
            format_utc_now()
        );

        let mut file = self.out.lock();
        file.write_all(delimiter.as_bytes())?;
        file.sync_all()
    }

    /// Sync and release both files, aggregating any errors.
    pub fn close(self) -> io::Result<()> {
        let mut errors = Vec::new();
        if let Err(e) = self.out.lock().sync_all() {
            errors.push(format!("stdout log: {e}"));
        }
        if let Err(e) = self.err.lock().sync_all() {
            errors.push(format!("stderr log: {e}"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "errors closing log files: {}",
                errors.join("; ")
            )))
        }
    }
}

/// One of the logger's two writers. Clones share the underlying file.
#[derive(Clone)]
pub struct LogSink {
    file: Arc<Mutex<File>>,
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.file.lock();
        file.write_all(buf)?;
        file.sync_all()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.lock().sync_all()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    options.mode(0o644);
    options.open(path)
}

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;
