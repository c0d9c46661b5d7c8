// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Non-blocking event publication.

use hades_core::ExecEvent;
use tokio::sync::mpsc;

/// Hands execution events to an external subscriber without ever stalling
/// the executor: when the channel is full (or nobody subscribed) the event
/// is dropped with a warning.
#[derive(Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::Sender<ExecEvent>>,
}

impl EventSink {
    pub fn new(tx: mpsc::Sender<ExecEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sink that discards everything.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: ExecEvent) {
        let Some(tx) = &self.tx else { return };
        if let Err(e) = tx.try_send(event) {
            tracing::warn!(error = %e, "dropping execution event");
        }
    }
}
