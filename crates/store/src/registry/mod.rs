// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Immutable stores of named+tagged byte streams.

mod filesystem;
mod object_store;

pub use filesystem::FilesystemRegistry;
pub use object_store::ObjectStoreRegistry;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// A streaming reader over one registry entry.
pub type RegistryStream = Pin<Box<dyn AsyncRead + Send>>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("artifact {name}:{tag} already exists (registries are immutable)")]
    Conflict { name: String, tag: String },
    #[error("artifact {name}:{tag} not found in registry")]
    Missing { name: String, tag: String },
    #[error("registry {0:?} not found")]
    UnknownRegistry(String),
    #[error("invalid registry config: {0}")]
    Config(String),
    #[error("registry backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An immutable push/pull store. A `(name, tag)` pair, once written, is
/// never modified.
#[async_trait]
pub trait Registry: Send + Sync {
    async fn push(
        &self,
        name: &str,
        tag: &str,
        data: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<(), RegistryError>;

    async fn pull(&self, name: &str, tag: &str) -> Result<RegistryStream, RegistryError>;

    async fn exists(&self, name: &str, tag: &str) -> Result<bool, RegistryError>;
}

/// Configuration for one named registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegistryConfig {
    Filesystem {
        path: PathBuf,
    },
    ObjectStore {
        bucket: String,
        #[serde(default)]
        region: String,
        #[serde(default)]
        endpoint: String,
    },
}

/// Named registries, built once at startup. Lookup is read-only and
/// thread-safe afterward.
#[derive(Default)]
pub struct RegistryManager {
    registries: HashMap<String, Box<dyn Registry>>,
}

impl RegistryManager {
    /// Build every configured registry, failing fast on a bad config.
    pub fn new(configs: &IndexMap<String, RegistryConfig>) -> Result<Self, RegistryError> {
        let mut registries: HashMap<String, Box<dyn Registry>> = HashMap::new();
        for (name, config) in configs {
            let registry = build_registry(config)
                .map_err(|e| RegistryError::Config(format!("registry {name:?}: {e}")))?;
            registries.insert(name.clone(), registry);
        }
        Ok(Self { registries })
    }

    pub fn get(&self, name: &str) -> Result<&dyn Registry, RegistryError> {
        self.registries
            .get(name)
            .map(|r| r.as_ref())
            .ok_or_else(|| RegistryError::UnknownRegistry(name.to_string()))
    }

    /// Insert a pre-built registry under a logical name (used by tests and
    /// embedders that construct backends directly).
    pub fn insert(&mut self, name: impl Into<String>, registry: Box<dyn Registry>) {
        self.registries.insert(name.into(), registry);
    }
}

fn build_registry(config: &RegistryConfig) -> Result<Box<dyn Registry>, RegistryError> {
    match config {
        RegistryConfig::Filesystem { path } => {
            if path.as_os_str().is_empty() {
                return Err(RegistryError::Config(
                    "filesystem registry requires a path".to_string(),
                ));
            }
            Ok(Box::new(FilesystemRegistry::new(path)?))
        }
        RegistryConfig::ObjectStore {
            bucket,
            region,
            endpoint,
        } => {
            if bucket.is_empty() {
                return Err(RegistryError::Config(
                    "object-store registry requires a bucket".to_string(),
                ));
            }
            Ok(Box::new(ObjectStoreRegistry::new(bucket, region, endpoint)))
        }
    }
}
