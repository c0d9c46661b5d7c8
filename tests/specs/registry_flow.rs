//! Artifact push/pull flows through the registry.

use crate::prelude::*;
use hades_core::{Action, ActionKind, ErrorKind, Plan, Step};
use hades_store::{RegistryConfig, RegistryManager};
use std::collections::HashMap;

fn push_action(artifact: &str, name: &str, tag: &str) -> Action {
    Action::new(ActionKind::Push {
        registry: "local".to_string(),
        artifact: artifact.to_string(),
        name: name.to_string(),
        tag: tag.to_string(),
    })
}

fn pull_action(name: &str, tag: &str, to: &str) -> Action {
    Action::new(ActionKind::Pull {
        registry: "local".to_string(),
        name: name.to_string(),
        tag: tag.to_string(),
        to: to.to_string(),
    })
}

fn single_action_plan(step_name: &str, job_name: &str) -> Plan {
    Plan {
        env: HashMap::new(),
        steps: vec![Step::new(step_name, job_name, vec!["ops".to_string()])],
    }
}

fn world_with_local_registry() -> (World, tempfile::TempDir) {
    let registry_dir = tempfile::TempDir::new().unwrap();
    let configs = [(
        "local".to_string(),
        RegistryConfig::Filesystem {
            path: registry_dir.path().to_path_buf(),
        },
    )]
    .into_iter()
    .collect();
    let world = World::with_registries(RegistryManager::new(&configs).unwrap());
    (world, registry_dir)
}

#[tokio::test]
async fn push_then_pull_round_trips_bytes() {
    let (world, registry_dir) = world_with_local_registry();
    world
        .artifacts
        .store("build", &mut &b"release payload"[..])
        .unwrap();

    let push_job = hades_core::Job {
        local: true,
        env: Default::default(),
        actions: vec![push_action("build", "myapp", "v1")],
    };
    let result = world
        .run(
            single_action_plan("publish", "push"),
            jobs(vec![("push", push_job)]),
            inventory("ops", &["orchestrator"]),
        )
        .await;
    assert!(result.success(), "{result:?}");
    assert!(registry_dir.path().join("myapp").join("v1").is_file());

    let dest = world.scratch_path("fetched/myapp.bin");
    let pull_job = hades_core::Job {
        local: true,
        env: Default::default(),
        actions: vec![pull_action("myapp", "v1", &dest)],
    };
    let result = world
        .run(
            single_action_plan("fetch", "pull"),
            jobs(vec![("pull", pull_job)]),
            inventory("ops", &["orchestrator"]),
        )
        .await;
    assert!(result.success(), "{result:?}");
    assert_eq!(std::fs::read(&dest).unwrap(), b"release payload");
}

#[tokio::test]
async fn second_push_fails_with_registry_conflict() {
    let (world, _registry_dir) = world_with_local_registry();
    world.artifacts.store("build", &mut &b"a"[..]).unwrap();

    let push_job = hades_core::Job {
        local: true,
        env: Default::default(),
        actions: vec![push_action("build", "myapp", "v1")],
    };
    let result = world
        .run(
            single_action_plan("publish", "push"),
            jobs(vec![("push", push_job.clone())]),
            inventory("ops", &["orchestrator"]),
        )
        .await;
    assert!(result.success());

    // same (name, tag) with different bytes must be rejected
    world.artifacts.store("build", &mut &b"b"[..]).unwrap();
    let result = world
        .run(
            single_action_plan("publish", "push"),
            jobs(vec![("push", push_job)]),
            inventory("ops", &["orchestrator"]),
        )
        .await;
    assert!(result.aborted);
    assert_eq!(result.error, Some(ErrorKind::RegistryConflict));
}

#[tokio::test]
async fn pulling_a_missing_entry_is_registry_missing() {
    let (world, _registry_dir) = world_with_local_registry();
    let dest = world.scratch_path("missing.bin");

    let pull_job = hades_core::Job {
        local: true,
        env: Default::default(),
        actions: vec![pull_action("ghost", "v0", &dest)],
    };
    let result = world
        .run(
            single_action_plan("fetch", "pull"),
            jobs(vec![("pull", pull_job)]),
            inventory("ops", &["orchestrator"]),
        )
        .await;
    assert!(result.aborted);
    assert_eq!(result.error, Some(ErrorKind::RegistryMissing));
}

#[tokio::test]
async fn missing_artifact_is_artifact_missing() {
    let (world, _registry_dir) = world_with_local_registry();
    let push_job = hades_core::Job {
        local: true,
        env: Default::default(),
        actions: vec![push_action("unregistered", "myapp", "v1")],
    };
    let result = world
        .run(
            single_action_plan("publish", "push"),
            jobs(vec![("push", push_job)]),
            inventory("ops", &["orchestrator"]),
        )
        .await;
    assert!(result.aborted);
    assert_eq!(result.error, Some(ErrorKind::ArtifactMissing));
}
