// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the filesystem registry

use super::super::{Registry, RegistryConfig, RegistryError, RegistryManager};
use super::*;
use tempfile::TempDir;
use tokio::io::AsyncReadExt;

async fn pull_bytes(reg: &dyn Registry, name: &str, tag: &str) -> Vec<u8> {
    let mut stream = reg.pull(name, tag).await.unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    buf
}

#[tokio::test]
async fn push_exists_pull_round_trip() {
    let dir = TempDir::new().unwrap();
    let reg = FilesystemRegistry::new(dir.path()).unwrap();

    reg.push("myapp", "v1.0.0", &mut &b"test artifact content"[..])
        .await
        .unwrap();

    // entry lands at <base>/<name>/<tag>
    assert!(dir.path().join("myapp").join("v1.0.0").is_file());
    assert!(reg.exists("myapp", "v1.0.0").await.unwrap());
    assert!(!reg.exists("nonexistent", "v0.0.0").await.unwrap());

    assert_eq!(
        pull_bytes(&reg, "myapp", "v1.0.0").await,
        b"test artifact content"
    );
}

#[tokio::test]
async fn second_push_conflicts_and_keeps_original() {
    let dir = TempDir::new().unwrap();
    let reg = FilesystemRegistry::new(dir.path()).unwrap();

    reg.push("myapp", "v1", &mut &b"a"[..]).await.unwrap();
    let err = reg.push("myapp", "v1", &mut &b"b"[..]).await.unwrap_err();
    assert!(matches!(err, RegistryError::Conflict { .. }));

    // original content untouched, no stray temp file left behind
    assert_eq!(pull_bytes(&reg, "myapp", "v1").await, b"a");
    assert!(!dir.path().join("myapp").join("v1.tmp").exists());
}

#[tokio::test]
async fn pull_missing_entry_fails() {
    let dir = TempDir::new().unwrap();
    let reg = FilesystemRegistry::new(dir.path()).unwrap();

    let err = reg.pull("nonexistent", "v0.0.0").await.unwrap_err();
    assert!(matches!(err, RegistryError::Missing { .. }));
}

#[cfg(unix)]
#[tokio::test]
async fn entry_files_are_created_0644() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let reg = FilesystemRegistry::new(dir.path()).unwrap();
    reg.push("myapp", "v1", &mut &b"a"[..]).await.unwrap();

    let meta = std::fs::metadata(dir.path().join("myapp").join("v1")).unwrap();
    assert_eq!(meta.permissions().mode() & 0o777, 0o644);
}

#[tokio::test]
async fn manager_builds_and_looks_up_registries() {
    let dir = TempDir::new().unwrap();
    let configs = [(
        "local".to_string(),
        RegistryConfig::Filesystem {
            path: dir.path().join("registry"),
        },
    )]
    .into_iter()
    .collect();

    let mgr = RegistryManager::new(&configs).unwrap();
    let reg = mgr.get("local").unwrap();
    reg.push("app", "v1", &mut &b"x"[..]).await.unwrap();
    assert!(reg.exists("app", "v1").await.unwrap());

    assert!(matches!(
        mgr.get("prod"),
        Err(RegistryError::UnknownRegistry(_))
    ));
}

#[test]
fn manager_rejects_empty_filesystem_path() {
    let configs = [(
        "local".to_string(),
        RegistryConfig::Filesystem {
            path: std::path::PathBuf::new(),
        },
    )]
    .into_iter()
    .collect();

    assert!(matches!(
        RegistryManager::new(&configs),
        Err(RegistryError::Config(_))
    ));
}

#[tokio::test]
async fn object_store_placeholder_reports_backend_error() {
    let reg = super::super::ObjectStoreRegistry::new("bucket", "eu-central-1", "");
    let err = reg.push("a", "v1", &mut &b"x"[..]).await.unwrap_err();
    assert!(matches!(err, RegistryError::Backend(_)));
}
