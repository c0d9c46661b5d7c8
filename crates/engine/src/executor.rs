// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The plan scheduler: steps in order, hosts fanned out under a permit
//! budget, actions serial per host.

use crate::actions;
use crate::error::ExecError;
use crate::events::EventSink;
use crate::log_paths;
use crate::logger::HostLogger;
use crate::runtime::Runtime;
use hades_core::{
    layer_env, merge_env, validate_contract, ErrorKind, ExecEvent, Host, HostOutcome, HostResult,
    HostState, Inventory, Job, Plan, RunId, RunResult, Step, StepResult,
};
use hades_session::SessionClient;
use hades_store::{ArtifactManager, RegistryManager};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Per-run settings.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub run_id: RunId,
    pub plan_name: String,
    pub log_root: PathBuf,
    /// Emit dry-run projections instead of executing; no sessions are
    /// opened and no registry or artifact effects happen.
    pub dry_run: bool,
}

impl ExecutorConfig {
    pub fn new(plan_name: impl Into<String>) -> Self {
        Self {
            run_id: RunId::generate(),
            plan_name: plan_name.into(),
            log_root: PathBuf::from("logs"),
            dry_run: false,
        }
    }
}

/// Injected collaborators.
pub struct ExecutorDeps {
    pub ssh: Arc<dyn SessionClient>,
    pub local: Arc<dyn SessionClient>,
    pub registries: Arc<RegistryManager>,
    pub artifacts: Arc<ArtifactManager>,
    pub events: EventSink,
}

/// Runs one plan to completion (or abort).
pub struct Executor {
    config: ExecutorConfig,
    plan: Plan,
    jobs: IndexMap<String, Job>,
    inventory: Inventory,
    cli_env: HashMap<String, String>,
    deps: ExecutorDeps,
}

impl Executor {
    pub fn new(
        config: ExecutorConfig,
        plan: Plan,
        jobs: IndexMap<String, Job>,
        inventory: Inventory,
        cli_env: HashMap<String, String>,
        deps: ExecutorDeps,
    ) -> Self {
        Self {
            config,
            plan,
            jobs,
            inventory,
            cli_env,
            deps,
        }
    }

    /// Execute every step in order. A step failure aborts the plan:
    /// in-flight workers of the failing step finish their current action
    /// and stop; later steps never start. Completed steps are not rolled
    /// back.
    pub async fn run(&self, cancel: &CancellationToken) -> RunResult {
        // Child token so a step failure stops this run without cancelling
        // the caller's token.
        let cancel = cancel.child_token();

        self.deps.events.emit(ExecEvent::RunStarted {
            run_id: self.config.run_id.clone(),
            plan: self.config.plan_name.clone(),
        });
        tracing::info!(
            run_id = %self.config.run_id,
            plan = %self.config.plan_name,
            steps = self.plan.steps.len(),
            dry_run = self.config.dry_run,
            "starting plan"
        );

        let mut step_results = Vec::new();
        let mut aborted = false;
        let mut error = None;

        for (index, step) in self.plan.steps.iter().enumerate() {
            if cancel.is_cancelled() {
                aborted = true;
                error = error.or(Some(ErrorKind::Aborted));
                break;
            }

            tracing::info!(step = %step.name, job = %step.job, "starting step");
            let (result, step_error) = match self.run_step(index, step, &cancel).await {
                Ok(result) => {
                    let failure = first_failure(&result);
                    (result, failure)
                }
                Err(e) => {
                    tracing::error!(step = %step.name, error = %e, "step rejected");
                    (
                        StepResult {
                            name: step.name.clone(),
                            host_results: Vec::new(),
                        },
                        Some(e.kind()),
                    )
                }
            };

            let ok = step_error.is_none();
            self.deps.events.emit(ExecEvent::StepFinished {
                index,
                name: step.name.clone(),
                ok,
            });
            step_results.push(result);

            if let Some(kind) = step_error {
                tracing::error!(step = %step.name, kind = %kind, "step failed, aborting plan");
                cancel.cancel();
                aborted = true;
                error = Some(kind);
                break;
            }
            tracing::info!(step = %step.name, "step ok");
        }

        RunResult {
            step_results,
            aborted,
            error,
        }
    }

    /// Validate and fan out one step. `Err` means the step was rejected
    /// before any worker started.
    async fn run_step(
        &self,
        index: usize,
        step: &Step,
        cancel: &CancellationToken,
    ) -> Result<StepResult, ExecError> {
        let job = self.jobs.get(&step.job).ok_or_else(|| {
            ExecError::ConfigInvalid(format!(
                "step {:?}: job {:?} not found",
                step.name, step.job
            ))
        })?;

        let resolved = self.inventory.hosts_for_targets(&step.targets)?;
        let permits = step.permits(resolved.len())?;

        let provided = layer_env(&[&self.plan.env, &step.env, &self.cli_env]);
        validate_contract(&job.env, &provided)
            .map_err(|e| ExecError::ConfigInvalid(format!("step {:?}: {e}", step.name)))?;
        let env = merge_env(&job.env, &provided);

        self.deps.events.emit(ExecEvent::StepStarted {
            index,
            name: step.name.clone(),
            job: step.job.clone(),
            hosts: resolved.iter().map(|(_, h)| h.name.clone()).collect(),
        });
        for (_, host) in &resolved {
            self.deps.events.emit(ExecEvent::HostTransition {
                step: step.name.clone(),
                host: host.name.clone(),
                state: HostState::Waiting,
                error: None,
            });
        }

        let semaphore = Arc::new(Semaphore::new(permits));
        let mut handles = Vec::with_capacity(resolved.len());
        for (target, host) in resolved {
            let spec = WorkerSpec {
                run_id: self.config.run_id.clone(),
                plan_name: self.config.plan_name.clone(),
                step_name: step.name.clone(),
                job_name: step.job.clone(),
                job: job.clone(),
                target,
                host,
                env: env.clone(),
                client: if job.local {
                    Arc::clone(&self.deps.local)
                } else {
                    Arc::clone(&self.deps.ssh)
                },
                registries: Arc::clone(&self.deps.registries),
                artifacts: Arc::clone(&self.deps.artifacts),
                events: self.deps.events.clone(),
                log_root: self.config.log_root.clone(),
                dry_run: self.config.dry_run,
                cancel: cancel.clone(),
            };
            let semaphore = Arc::clone(&semaphore);
            let host_name = spec.host.name.clone();
            handles.push((host_name, tokio::spawn(run_worker(spec, semaphore))));
        }

        let mut host_results = Vec::with_capacity(handles.len());
        for (host_name, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => HostResult {
                    host: host_name,
                    outcome: HostOutcome::Failed {
                        kind: ErrorKind::ActionFailed,
                        message: format!("worker terminated unexpectedly: {e}"),
                    },
                },
            };
            host_results.push(result);
        }

        Ok(StepResult {
            name: step.name.clone(),
            host_results,
        })
    }
}

/// First non-ok outcome of a step, preferring a concrete failure kind over
/// plain cancellation.
fn first_failure(result: &StepResult) -> Option<ErrorKind> {
    let mut saw_aborted = false;
    for host in &result.host_results {
        match &host.outcome {
            HostOutcome::Ok => {}
            HostOutcome::Aborted => saw_aborted = true,
            HostOutcome::Failed { kind, .. } => return Some(*kind),
        }
    }
    saw_aborted.then_some(ErrorKind::Aborted)
}

/// Everything one worker owns. Built per (step, host); dropped when the
/// worker finishes.
struct WorkerSpec {
    run_id: RunId,
    plan_name: String,
    step_name: String,
    job_name: String,
    job: Job,
    target: String,
    host: Host,
    env: HashMap<String, String>,
    client: Arc<dyn SessionClient>,
    registries: Arc<RegistryManager>,
    artifacts: Arc<ArtifactManager>,
    events: EventSink,
    log_root: PathBuf,
    dry_run: bool,
    cancel: CancellationToken,
}

async fn run_worker(spec: WorkerSpec, semaphore: Arc<Semaphore>) -> HostResult {
    let host_name = spec.host.name.clone();

    let permit = tokio::select! {
        _ = spec.cancel.cancelled() => None,
        permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
    };
    let Some(_permit) = permit else {
        spec.transition(HostState::Aborted, None);
        return HostResult {
            host: host_name,
            outcome: HostOutcome::Aborted,
        };
    };

    spec.transition(HostState::Running, None);
    let outcome = match spec.execute().await {
        Ok(()) => HostOutcome::Ok,
        Err(ExecError::Aborted) => HostOutcome::Aborted,
        Err(e) => HostOutcome::Failed {
            kind: e.kind(),
            message: e.to_string(),
        },
    };

    let (state, kind) = match &outcome {
        HostOutcome::Ok => (HostState::Ok, None),
        HostOutcome::Aborted => (HostState::Aborted, None),
        HostOutcome::Failed { kind, .. } => (HostState::Failed, Some(*kind)),
    };
    spec.transition(state, kind);

    HostResult {
        host: host_name,
        outcome,
    }
}

impl WorkerSpec {
    fn transition(&self, state: HostState, error: Option<ErrorKind>) {
        self.events.emit(ExecEvent::HostTransition {
            step: self.step_name.clone(),
            host: self.host.name.clone(),
            state,
            error,
        });
    }

    async fn execute(&self) -> Result<(), ExecError> {
        let logger = HostLogger::open(
            &self.log_root,
            &self.run_id,
            &self.plan_name,
            &self.host.name,
        )
        .map_err(|e| ExecError::ActionFailed(format!("failed to open log files: {e}")))?;

        // The env a worker sees is frozen here, runtime overlay included.
        let mut env = self.env.clone();
        env.insert("HADES_RUN_ID".to_string(), self.run_id.to_string());
        env.insert("HADES_HOST".to_string(), self.host.name.clone());
        env.insert("HADES_TARGET".to_string(), self.target.clone());

        let result = if self.dry_run {
            self.dry_run_actions(&logger, &env)
        } else {
            self.run_actions(&logger, &env).await
        };

        if let Err(e) = logger.close() {
            tracing::warn!(host = %self.host.name, error = %e, "failed to close log files");
        }
        result
    }

    async fn run_actions(
        &self,
        logger: &HostLogger,
        env: &HashMap<String, String>,
    ) -> Result<(), ExecError> {
        let mut session = self
            .client
            .connect(&self.cancel, &self.host)
            .await
            .map_err(|e| {
                if e.is_cancelled() {
                    ExecError::Aborted
                } else {
                    ExecError::ConnectFailed {
                        host: self.host.name.clone(),
                        source: e,
                    }
                }
            })?;

        let rendered_dir = log_paths::rendered_dir(&self.log_root, &self.run_id, &self.host.name);
        for (index, action) in self.job.actions.iter().enumerate() {
            // A cancelled run finishes its current action but starts no
            // more.
            if self.cancel.is_cancelled() {
                return Err(ExecError::Aborted);
            }
            self.write_delimiter(logger, index, action)?;
            self.events.emit(ExecEvent::LogLine {
                host: self.host.name.clone(),
                line: format!("{}: [{index}] {}", self.job_name, action.kind.label()),
            });

            let mut rt = Runtime {
                run_id: &self.run_id,
                host: &self.host,
                target: &self.target,
                env,
                stdout: logger.stdout(),
                stderr: logger.stderr(),
                session: session.as_mut(),
                registries: &self.registries,
                artifacts: &self.artifacts,
                cancel: &self.cancel,
                rendered_dir: rendered_dir.clone(),
            };
            actions::execute(&action.kind, &mut rt).await.map_err(|e| {
                tracing::error!(
                    host = %self.host.name,
                    action = %action.kind,
                    error = %e,
                    "action failed"
                );
                e
            })?;
        }
        Ok(())
    }

    fn dry_run_actions(
        &self,
        logger: &HostLogger,
        env: &HashMap<String, String>,
    ) -> Result<(), ExecError> {
        for (index, action) in self.job.actions.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(ExecError::Aborted);
            }
            self.write_delimiter(logger, index, action)?;

            let line = actions::dry_run(&action.kind, env);
            writeln!(logger.stdout(), "{line}")
                .map_err(|e| ExecError::ActionFailed(format!("failed to write log: {e}")))?;
            self.events.emit(ExecEvent::LogLine {
                host: self.host.name.clone(),
                line,
            });
        }
        Ok(())
    }

    fn write_delimiter(
        &self,
        logger: &HostLogger,
        index: usize,
        action: &hades_core::Action,
    ) -> Result<(), ExecError> {
        logger
            .write_action_delimiter(
                &self.job_name,
                index,
                action.kind.label(),
                action.name.as_deref(),
            )
            .map_err(|e| ExecError::ActionFailed(format!("failed to write log: {e}")))
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
