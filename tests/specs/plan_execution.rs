//! End-to-end plan execution against the local backend.

use crate::prelude::*;
use hades_core::{Action, ActionKind, EnvDecl, ErrorKind, Parallelism, Plan, Step};
use std::collections::HashMap;

fn run_action(command: &str) -> Action {
    Action::new(ActionKind::Run {
        command: command.to_string(),
    })
}

fn step(name: &str, job: &str, target: &str) -> Step {
    Step::new(name, job, vec![target.to_string()])
}

#[tokio::test]
async fn plan_runs_actions_on_every_host_with_runtime_env() {
    let world = World::new();
    let out_dir = world.scratch_path("out");

    let mut job = hades_core::Job {
        local: false,
        env: Default::default(),
        actions: vec![
            Action::new(ActionKind::Mkdir {
                path: "${OUT_DIR}".to_string(),
                mode: 0o755,
            }),
            run_action("echo deployed by ${HADES_RUN_ID} > ${OUT_DIR}/${HADES_HOST}.txt"),
        ],
    };
    job.env.insert("OUT_DIR".to_string(), EnvDecl::required());

    let plan = Plan {
        env: [("OUT_DIR".to_string(), out_dir.clone())].into_iter().collect(),
        steps: vec![step("deploy", "release", "web")],
    };

    let result = world
        .run(plan, jobs(vec![("release", job)]), inventory("web", &["web-1", "web-2"]))
        .await;
    assert!(result.success(), "{result:?}");

    for host in ["web-1", "web-2"] {
        let marker = std::path::Path::new(&out_dir).join(format!("{host}.txt"));
        let content = std::fs::read_to_string(marker).unwrap();
        assert_eq!(content, "deployed by spec-run\n");

        // per-host logs carry the delimiter and the command's output went
        // to the files, not the console
        let log = world.stdout_log(host);
        assert!(log.contains("JOB: release, ACTION: [0] mkdir"));
        assert!(log.contains("JOB: release, ACTION: [1] run"));
    }
}

#[tokio::test]
async fn failing_step_aborts_following_steps() {
    let world = World::new();
    let marker = world.scratch_path("never.txt");

    let breaks = hades_core::Job {
        local: false,
        env: Default::default(),
        actions: vec![run_action("exit 7")],
    };
    let never = hades_core::Job {
        local: false,
        env: Default::default(),
        actions: vec![run_action(&format!("touch {marker}"))],
    };

    let plan = Plan {
        env: HashMap::new(),
        steps: vec![step("first", "breaks", "web"), step("second", "never", "web")],
    };

    let result = world
        .run(
            plan,
            jobs(vec![("breaks", breaks), ("never", never)]),
            inventory("web", &["web-1"]),
        )
        .await;

    assert!(result.aborted);
    assert_eq!(result.error, Some(ErrorKind::ActionFailed));
    assert_eq!(result.step_results.len(), 1);
    assert!(!std::path::Path::new(&marker).exists());
}

#[tokio::test]
async fn stderr_is_captured_separately() {
    let world = World::new();
    let job = hades_core::Job {
        local: false,
        env: Default::default(),
        actions: vec![run_action("echo to-out; echo to-err 1>&2")],
    };
    let plan = Plan {
        env: HashMap::new(),
        steps: vec![step("noisy", "talk", "web")],
    };

    let result = world
        .run(plan, jobs(vec![("talk", job)]), inventory("web", &["web-1"]))
        .await;
    assert!(result.success());
    assert!(world.stdout_log("web-1").contains("to-out\n"));
    assert_eq!(world.stderr_log("web-1"), "to-err\n");
}

#[tokio::test]
async fn bounded_step_fans_out_over_all_hosts() {
    let world = World::new();
    let out_dir = world.scratch_path("fanout");
    std::fs::create_dir_all(&out_dir).unwrap();

    let job = hades_core::Job {
        local: false,
        env: Default::default(),
        actions: vec![run_action(&format!("touch {out_dir}/${{HADES_HOST}}"))],
    };
    let mut s = step("deploy", "release", "web");
    s.parallelism = Parallelism::Bounded;
    s.limit = 2;
    let plan = Plan {
        env: HashMap::new(),
        steps: vec![s],
    };

    let hosts = ["a", "b", "c", "d", "e"];
    let result = world
        .run(plan, jobs(vec![("release", job)]), inventory("web", &hosts))
        .await;
    assert!(result.success(), "{result:?}");
    for host in hosts {
        assert!(std::path::Path::new(&out_dir).join(host).exists());
    }
    assert_eq!(result.step_results[0].host_results.len(), hosts.len());
}

#[tokio::test]
async fn dry_run_touches_nothing() {
    let world = World::new();
    let marker = world.scratch_path("marker.txt");

    let job = hades_core::Job {
        local: false,
        env: Default::default(),
        actions: vec![run_action(&format!("touch {marker}"))],
    };
    let plan = Plan {
        env: HashMap::new(),
        steps: vec![step("deploy", "release", "web")],
    };

    let result = world
        .run_with(
            plan,
            jobs(vec![("release", job)]),
            inventory("web", &["web-1"]),
            true,
        )
        .await;

    assert!(result.success(), "{result:?}");
    assert!(!std::path::Path::new(&marker).exists());
    assert!(world
        .stdout_log("web-1")
        .contains(&format!("run: touch {marker}")));
}

#[tokio::test]
async fn template_renders_to_destination_and_snapshot() {
    let world = World::new();
    let src = world.scratch_path("app.conf.tmpl");
    std::fs::write(&src, "host={{ Host }} target={{ Target }} v={{ Env.VERSION }}\n").unwrap();
    let dst = world.scratch_path("rendered/app.conf");

    let mut job = hades_core::Job {
        local: false,
        env: Default::default(),
        actions: vec![Action::new(ActionKind::Template {
            src: src.clone(),
            dst: dst.clone(),
        })],
    };
    job.env
        .insert("VERSION".to_string(), EnvDecl::with_default("v9"));

    let plan = Plan {
        env: HashMap::new(),
        steps: vec![step("configure", "render", "web")],
    };
    let result = world
        .run(plan, jobs(vec![("render", job)]), inventory("web", &["web-1"]))
        .await;
    assert!(result.success(), "{result:?}");

    let rendered = std::fs::read_to_string(&dst).unwrap();
    assert_eq!(rendered, "host=web-1 target=web v=v9\n");

    // post-mortem snapshot under logs/<run>/rendered/<host>/
    let snapshot_root = world
        .log_root
        .path()
        .join(RUN_ID)
        .join("rendered")
        .join("web-1");
    assert!(snapshot_root.exists());
}
