//! Shared fixtures for the behavioral specs.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use hades_core::{Host, Inventory, Job, Plan, RunId, RunResult};
use hades_engine::{EventSink, Executor, ExecutorConfig, ExecutorDeps};
use hades_session::LocalClient;
use hades_store::{ArtifactManager, RegistryManager};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

pub const RUN_ID: &str = "spec-run";
pub const PLAN_NAME: &str = "plan";

/// A workspace for one spec: a scratch dir for command side effects and a
/// log root, with every command executed through the local backend.
pub struct World {
    pub scratch: TempDir,
    pub log_root: TempDir,
    pub registries: Arc<RegistryManager>,
    pub artifacts: Arc<ArtifactManager>,
}

impl World {
    pub fn new() -> Self {
        Self {
            scratch: TempDir::new().unwrap(),
            log_root: TempDir::new().unwrap(),
            registries: Arc::new(RegistryManager::default()),
            artifacts: Arc::new(ArtifactManager::new()),
        }
    }

    pub fn with_registries(registries: RegistryManager) -> Self {
        Self {
            registries: Arc::new(registries),
            ..Self::new()
        }
    }

    pub fn scratch_path(&self, name: &str) -> String {
        self.scratch.path().join(name).to_string_lossy().to_string()
    }

    pub async fn run(
        &self,
        plan: Plan,
        jobs: IndexMap<String, Job>,
        inventory: Inventory,
    ) -> RunResult {
        self.run_with(plan, jobs, inventory, false).await
    }

    pub async fn run_with(
        &self,
        plan: Plan,
        jobs: IndexMap<String, Job>,
        inventory: Inventory,
        dry_run: bool,
    ) -> RunResult {
        let config = ExecutorConfig {
            run_id: RunId::new(RUN_ID),
            plan_name: PLAN_NAME.to_string(),
            log_root: self.log_root.path().to_path_buf(),
            dry_run,
        };
        let deps = ExecutorDeps {
            ssh: Arc::new(LocalClient::new()),
            local: Arc::new(LocalClient::new()),
            registries: Arc::clone(&self.registries),
            artifacts: Arc::clone(&self.artifacts),
            events: EventSink::disabled(),
        };
        let executor = Executor::new(config, plan, jobs, inventory, HashMap::new(), deps);
        executor.run(&CancellationToken::new()).await
    }

    pub fn stdout_log(&self, host: &str) -> String {
        read_log(self.log_root.path(), host, "out")
    }

    pub fn stderr_log(&self, host: &str) -> String {
        read_log(self.log_root.path(), host, "err")
    }
}

fn read_log(log_root: &Path, host: &str, stream: &str) -> String {
    std::fs::read_to_string(
        log_root
            .join(RUN_ID)
            .join(format!("{PLAN_NAME}.{host}.{stream}.log")),
    )
    .unwrap()
}

pub fn host(name: &str) -> Host {
    Host {
        name: name.to_string(),
        address: String::new(),
        user: String::new(),
        key_path: Default::default(),
        port: 0,
        tags: Default::default(),
    }
}

pub fn inventory(target: &str, names: &[&str]) -> Inventory {
    let mut inv = Inventory::default();
    for name in names {
        inv.add_host(host(name));
        inv.add_to_target(target, name);
    }
    inv
}

pub fn jobs(entries: Vec<(&str, Job)>) -> IndexMap<String, Job> {
    entries
        .into_iter()
        .map(|(name, job)| (name.to_string(), job))
        .collect()
}
