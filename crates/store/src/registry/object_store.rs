// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Object-store registry backend (placeholder).

use super::{Registry, RegistryError, RegistryStream};
use async_trait::async_trait;
use tokio::io::AsyncRead;

/// S3-compatible backend. The wire implementation is pending; every
/// operation fails with a backend error so callers exercise the same
/// non-local failure path a live object store would produce.
pub struct ObjectStoreRegistry {
    bucket: String,
    region: String,
    endpoint: String,
}

impl ObjectStoreRegistry {
    pub fn new(
        bucket: impl Into<String>,
        region: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            endpoint: endpoint.into(),
        }
    }

    fn unimplemented(&self) -> RegistryError {
        RegistryError::Backend(format!(
            "object-store registry (bucket {:?}, region {:?}, endpoint {:?}) is not yet implemented - use a filesystem registry",
            self.bucket, self.region, self.endpoint
        ))
    }
}

#[async_trait]
impl Registry for ObjectStoreRegistry {
    async fn push(
        &self,
        _name: &str,
        _tag: &str,
        _data: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<(), RegistryError> {
        Err(self.unimplemented())
    }

    async fn pull(&self, _name: &str, _tag: &str) -> Result<RegistryStream, RegistryError> {
        Err(self.unimplemented())
    }

    async fn exists(&self, _name: &str, _tag: &str) -> Result<bool, RegistryError> {
        Err(self.unimplemented())
    }
}
