// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hosts and the resolved inventory.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Default SSH port used when a host declares port 0.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// One SSH-reachable (or local) machine. Host names are unique within a run;
/// hosts are immutable once inventory resolution has finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub key_path: PathBuf,
    /// 0 means "use the default port".
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl Host {
    /// The port to dial, substituting the default for 0.
    pub fn effective_port(&self) -> u16 {
        if self.port == 0 {
            DEFAULT_SSH_PORT
        } else {
            self.port
        }
    }

    /// Pool key for transport sharing: `user@address`.
    pub fn pool_key(&self) -> String {
        format!("{}@{}", self.user, self.address)
    }
}

/// Errors from target resolution against an inventory.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("target {0:?} not found in inventory")]
    UnknownTarget(String),
    #[error("target {target:?} references unknown host {host:?}")]
    UnknownHost { target: String, host: String },
}

/// The resolved inventory: hosts by name plus named ordered host groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub hosts: HashMap<String, Host>,
    /// Target declaration order is preserved; steps reference targets by name.
    pub targets: IndexMap<String, Vec<String>>,
}

impl Inventory {
    /// Add a host unless one with the same name already exists (first wins).
    /// Returns whether the host was inserted.
    pub fn add_host(&mut self, host: Host) -> bool {
        if self.hosts.contains_key(&host.name) {
            return false;
        }
        self.hosts.insert(host.name.clone(), host);
        true
    }

    /// Append a host name to a target group, creating the group if needed.
    pub fn add_to_target(&mut self, target: &str, host_name: &str) {
        self.targets
            .entry(target.to_string())
            .or_default()
            .push(host_name.to_string());
    }

    /// Resolve a step's target list into a deduplicated, ordered list of
    /// hosts: targets in the given order, host names sorted within each
    /// target, duplicates suppressed. Each host is paired with the target
    /// it was resolved through (the first, when several reference it).
    pub fn hosts_for_targets(
        &self,
        targets: &[String],
    ) -> Result<Vec<(String, Host)>, InventoryError> {
        let mut seen: Vec<&str> = Vec::new();
        let mut out = Vec::new();
        for target in targets {
            let names = self
                .targets
                .get(target)
                .ok_or_else(|| InventoryError::UnknownTarget(target.clone()))?;
            let mut ordered: Vec<&String> = names.iter().collect();
            ordered.sort();
            for name in ordered {
                if seen.contains(&name.as_str()) {
                    continue;
                }
                let host = self
                    .hosts
                    .get(name)
                    .ok_or_else(|| InventoryError::UnknownHost {
                        target: target.clone(),
                        host: name.clone(),
                    })?;
                seen.push(name.as_str());
                out.push((target.clone(), host.clone()));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
