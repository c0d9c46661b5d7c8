// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem registry backend: `<base>/<name>/<tag>`.

use super::{Registry, RegistryError, RegistryStream};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncRead;

#[cfg(unix)]
use std::os::unix::fs::DirBuilderExt;

/// Directories are created 0755, entry files 0644. Writes go to a temp
/// file and are renamed into place so a reader never observes a partial
/// entry.
pub struct FilesystemRegistry {
    base: PathBuf,
}

impl FilesystemRegistry {
    pub fn new(base: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let base = base.into();
        make_dirs(&base)?;
        Ok(Self { base })
    }

    fn entry_path(&self, name: &str, tag: &str) -> PathBuf {
        self.base.join(name).join(tag)
    }
}

#[async_trait]
impl Registry for FilesystemRegistry {
    async fn push(
        &self,
        name: &str,
        tag: &str,
        data: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<(), RegistryError> {
        let name_dir = self.base.join(name);
        make_dirs(&name_dir)?;

        let final_path = name_dir.join(tag);
        if tokio::fs::metadata(&final_path).await.is_ok() {
            return Err(RegistryError::Conflict {
                name: name.to_string(),
                tag: tag.to_string(),
            });
        }

        let tmp_path = name_dir.join(format!("{tag}.tmp"));
        let result = write_entry(&tmp_path, data).await;
        if result.is_err() {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return result;
        }

        if let Err(e) = tokio::fs::rename(&tmp_path, &final_path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn pull(&self, name: &str, tag: &str) -> Result<RegistryStream, RegistryError> {
        match tokio::fs::File::open(self.entry_path(name, tag)).await {
            Ok(file) => Ok(Box::pin(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(RegistryError::Missing {
                name: name.to_string(),
                tag: tag.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, name: &str, tag: &str) -> Result<bool, RegistryError> {
        match tokio::fs::metadata(self.entry_path(name, tag)).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_entry(
    path: &Path,
    data: &mut (dyn AsyncRead + Send + Unpin),
) -> Result<(), RegistryError> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o644);
    let mut file = options.open(path).await?;
    tokio::io::copy(data, &mut file).await?;
    Ok(())
}

fn make_dirs(path: &Path) -> Result<(), RegistryError> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o755);
    builder.create(path)?;
    Ok(())
}

#[cfg(test)]
#[path = "filesystem_tests.rs"]
mod tests;
