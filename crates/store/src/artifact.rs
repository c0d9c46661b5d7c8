// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content-addressed artifact store.
//!
//! Artifacts are addressed by logical name and held in memory once loaded.
//! A registered artifact is a lazy file reference; the file is read and
//! checksummed on first access.

use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// A fresh reader over an artifact's cached bytes. Readers are independent
/// and safe to consume in parallel; the type implements both `std::io::Read`
/// and `tokio::io::AsyncRead`.
pub type ArtifactReader = Cursor<Arc<[u8]>>;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact {0:?} not found")]
    NotFound(String),
    #[error("failed to read artifact {name:?}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

enum Entry {
    /// Registered but not yet read from disk.
    Lazy(PathBuf),
    Loaded { bytes: Arc<[u8]>, checksum: String },
}

/// Concurrent `name → artifact` mapping. Reads are shared; lazy loading
/// mutates the entry and therefore happens under the exclusive lock.
#[derive(Default)]
pub struct ArtifactManager {
    artifacts: RwLock<HashMap<String, Entry>>,
}

impl ArtifactManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a lazy file reference without reading it. Replaces any
    /// existing entry under the same name.
    pub fn register(&self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.artifacts
            .write()
            .insert(name.into(), Entry::Lazy(path.into()));
    }

    /// Read `data` fully, checksum it, and store it. Replaces any existing
    /// entry under the same name.
    pub fn store(&self, name: impl Into<String>, data: &mut dyn Read) -> Result<(), ArtifactError> {
        let name = name.into();
        let mut buf = Vec::new();
        data.read_to_end(&mut buf).map_err(|source| ArtifactError::Io {
            name: name.clone(),
            source,
        })?;
        let checksum = sha256_hex(&buf);
        self.artifacts.write().insert(
            name,
            Entry::Loaded {
                bytes: buf.into(),
                checksum,
            },
        );
        Ok(())
    }

    /// A fresh reader over the artifact's bytes, loading a lazy entry on
    /// first access.
    pub fn get(&self, name: &str) -> Result<ArtifactReader, ArtifactError> {
        self.load(name).map(|(bytes, _)| Cursor::new(bytes))
    }

    /// The artifact's hex SHA-256, loading a lazy entry on first access.
    pub fn checksum(&self, name: &str) -> Result<String, ArtifactError> {
        self.load(name).map(|(_, checksum)| checksum)
    }

    /// Registered artifact names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.artifacts.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn clear(&self) {
        self.artifacts.write().clear();
    }

    fn load(&self, name: &str) -> Result<(Arc<[u8]>, String), ArtifactError> {
        {
            let artifacts = self.artifacts.read();
            match artifacts.get(name) {
                None => return Err(ArtifactError::NotFound(name.to_string())),
                Some(Entry::Loaded { bytes, checksum }) => {
                    return Ok((Arc::clone(bytes), checksum.clone()))
                }
                Some(Entry::Lazy(_)) => {}
            }
        }

        // Lazy entry: reload under the exclusive lock. Another thread may
        // have loaded it while we dropped the read lock.
        let mut artifacts = self.artifacts.write();
        let entry = artifacts
            .get_mut(name)
            .ok_or_else(|| ArtifactError::NotFound(name.to_string()))?;
        match entry {
            Entry::Loaded { bytes, checksum } => Ok((Arc::clone(bytes), checksum.clone())),
            Entry::Lazy(path) => {
                let buf = std::fs::read(&path).map_err(|source| ArtifactError::Io {
                    name: name.to_string(),
                    source,
                })?;
                let checksum = sha256_hex(&buf);
                let bytes: Arc<[u8]> = buf.into();
                *entry = Entry::Loaded {
                    bytes: Arc::clone(&bytes),
                    checksum: checksum.clone(),
                };
                Ok((bytes, checksum))
            }
        }
    }
}

fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
