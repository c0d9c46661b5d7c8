// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wait`: pause for operator confirmation on stdin.

use crate::duration::parse_duration;
use crate::error::ExecError;
use crate::runtime::Runtime;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

const DEFAULT_MESSAGE: &str = "Continue?";

pub async fn execute(
    message: Option<&str>,
    timeout: Option<&str>,
    rt: &mut Runtime<'_>,
) -> Result<(), ExecError> {
    let message = message.unwrap_or(DEFAULT_MESSAGE);
    let timeout = match timeout {
        Some(t) => Some(
            parse_duration(t)
                .map_err(|e| ExecError::ConfigInvalid(format!("invalid timeout format: {e}")))?,
        ),
        None => None,
    };

    prompt(message)?;

    let read_answer = async {
        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        let n = reader.read_line(&mut line).await?;
        Ok::<_, std::io::Error>((n, line))
    };

    let answer = match timeout {
        Some(limit) => tokio::select! {
            _ = rt.cancel.cancelled() => return Err(ExecError::Aborted),
            _ = tokio::time::sleep(limit) => {
                return Err(ExecError::WaitTimeout(format_duration(limit)))
            }
            read = read_answer => read,
        },
        None => tokio::select! {
            _ = rt.cancel.cancelled() => return Err(ExecError::Aborted),
            read = read_answer => read,
        },
    };

    let (n, line) =
        answer.map_err(|e| ExecError::ActionFailed(format!("failed to read stdin: {e}")))?;
    // EOF is a decline
    if n == 0 {
        return Err(ExecError::UserDeclined);
    }
    let response = line.trim().to_lowercase();
    if response == "y" || response == "yes" {
        Ok(())
    } else {
        Err(ExecError::UserDeclined)
    }
}

fn prompt(message: &str) -> Result<(), ExecError> {
    let mut stdout = std::io::stdout();
    write!(stdout, "\n\u{23f8}\u{fe0f}  {message} [y/N]: ")
        .and_then(|()| stdout.flush())
        .map_err(|e| ExecError::ActionFailed(format!("failed to write prompt: {e}")))
}

fn format_duration(d: std::time::Duration) -> String {
    let total = d.as_secs();
    if total == 0 {
        return format!("{}ms", d.as_millis());
    }
    let mut out = String::new();
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        out.push_str(&format!("{h}h"));
    }
    if m > 0 {
        out.push_str(&format!("{m}m"));
    }
    if s > 0 || out.is_empty() {
        out.push_str(&format!("{s}s"));
    }
    out
}

pub fn dry_run(message: Option<&str>, timeout: Option<&str>) -> String {
    let message = message.unwrap_or(DEFAULT_MESSAGE);
    match timeout {
        Some(t) => format!("wait: {message} (timeout: {t})"),
        None => format!("wait: {message}"),
    }
}
