// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inventory resolution: static hosts unioned with provider-listed
//! instances filtered through a selector.

use crate::error::ExecError;
use async_trait::async_trait;
use hades_core::{Host, Inventory};
use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::PathBuf;
use thiserror::Error;

/// A provider-side failure (network, auth, quota).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

/// One machine reported by a cloud provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub name: String,
    pub public_ipv4: Option<Ipv4Addr>,
    pub public_ipv6: Option<Ipv6Addr>,
    pub tags: HashMap<String, String>,
}

/// Lists instances for one provider kind. The SDK-backed implementations
/// live outside the core and are injected by kind name.
#[async_trait]
pub trait InstanceProvider: Send + Sync {
    async fn list_instances(
        &self,
        config: &HashMap<String, String>,
    ) -> Result<Vec<Instance>, ProviderError>;
}

/// SSH settings applied to every host a provider contributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SshDefaults {
    pub user: String,
    pub port: u16,
    pub identity_file: String,
}

/// One provider block from the inventory document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    pub kind: String,
    pub config: HashMap<String, String>,
    /// Optional tag selector; empty keeps every instance.
    pub selector: String,
    /// Targets every surviving instance is appended to.
    pub targets: Vec<String>,
    pub ssh: SshDefaults,
}

/// Merge provider-listed instances into a static inventory.
///
/// Static entries win name collisions; provider order decides between
/// providers. Unnamed instances are skipped.
pub async fn resolve_inventory(
    mut inventory: Inventory,
    providers: &[ProviderConfig],
    listers: &HashMap<String, std::sync::Arc<dyn InstanceProvider>>,
) -> Result<Inventory, ExecError> {
    for provider in providers {
        let lister = listers.get(&provider.kind).ok_or_else(|| {
            ExecError::ConfigInvalid(format!("unknown provider {:?}", provider.kind))
        })?;

        let instances = lister
            .list_instances(&provider.config)
            .await
            .map_err(|e| ExecError::ResolveFailed(format!("provider {:?}: {e}", provider.kind)))?;

        for instance in instances {
            if instance.name.is_empty() {
                continue;
            }

            if !provider.selector.is_empty() {
                let matched = hades_selector::eval(&provider.selector, &instance.tags).map_err(
                    |e| {
                        ExecError::ConfigInvalid(format!(
                            "provider {:?}: selector error: {e}",
                            provider.kind
                        ))
                    },
                )?;
                if !matched {
                    continue;
                }
            }

            let host = instance_to_host(&instance, provider)?;
            if !inventory.add_host(host) {
                tracing::debug!(
                    provider = %provider.kind,
                    host = %instance.name,
                    "skipping provider instance, name already in inventory"
                );
                continue;
            }
            for target in &provider.targets {
                inventory.add_to_target(target, &instance.name);
            }
        }
    }
    Ok(inventory)
}

fn instance_to_host(instance: &Instance, provider: &ProviderConfig) -> Result<Host, ExecError> {
    let address = match (&instance.public_ipv4, &instance.public_ipv6) {
        (Some(v4), _) => v4.to_string(),
        (None, Some(v6)) => v6.to_string(),
        (None, None) => String::new(),
    };

    let key_path = if provider.ssh.identity_file.is_empty() {
        PathBuf::new()
    } else {
        expand_tilde(&provider.ssh.identity_file).ok_or_else(|| {
            ExecError::ResolveFailed(format!(
                "provider {:?}: host {:?}: failed to expand identity_file {:?}",
                provider.kind, instance.name, provider.ssh.identity_file
            ))
        })?
    };

    Ok(Host {
        name: instance.name.clone(),
        address,
        user: provider.ssh.user.clone(),
        key_path,
        port: provider.ssh.port,
        tags: instance.tags.clone(),
    })
}

/// Expand a leading `~` against the home directory.
fn expand_tilde(path: &str) -> Option<PathBuf> {
    if path == "~" {
        return dirs::home_dir();
    }
    if let Some(rest) = path.strip_prefix("~/") {
        return dirs::home_dir().map(|home| home.join(rest));
    }
    Some(PathBuf::from(path))
}

#[cfg(test)]
#[path = "inventory_tests.rs"]
mod tests;
