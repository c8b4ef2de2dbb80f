// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent named child processes with restart-on-exit and per-call
//! timeouts.
//!
//! A worker is a named `std::process::Command` template, a restart
//! policy, and a call timeout. The manager's job is uniqueness of `name`,
//! call routing, and participating in the same non-blocking reap as the
//! Fork Primitive.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("a worker named '{0}' is already registered")]
    DuplicateName(String),
    #[error("no worker named '{0}'")]
    NotFound(String),
    #[error("failed to spawn worker '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// What happens to a worker's process when its call exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    Never,
    OnFailure,
    Always,
}

/// Static configuration for one named worker.
#[derive(Debug, Clone)]
pub struct WorkerSpec {
    pub name: String,
    pub command: PathBuf,
    pub args: Vec<String>,
    pub restart_policy: RestartPolicy,
    pub timeout: Duration,
}

/// Outcome of one `invoke()` call.
#[derive(Debug)]
pub enum WorkerCallOutcome {
    Exited(std::process::ExitStatus),
    Timeout,
}

struct WorkerState {
    spec: WorkerSpec,
    child: Option<Child>,
}

/// Holds the mapping name→worker and routes calls to them. Workers process
/// one call at a time; in-memory queuing is explicitly out of scope.
#[derive(Default)]
pub struct WorkerManager {
    workers: HashMap<String, WorkerState>,
}

impl WorkerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `spec` under its own name. Rejects a duplicate name.
    pub fn register(&mut self, spec: WorkerSpec) -> Result<(), WorkerError> {
        if self.workers.contains_key(&spec.name) {
            return Err(WorkerError::DuplicateName(spec.name));
        }
        self.workers
            .insert(spec.name.clone(), WorkerState { spec, child: None });
        Ok(())
    }

    /// Invokes the named worker with `args`, spawning it if it is not
    /// already running, and blocks (up to the worker's configured timeout)
    /// for it to exit.
    pub fn invoke(
        &mut self,
        name: &str,
        args: &[String],
    ) -> Result<WorkerCallOutcome, WorkerError> {
        let state = self
            .workers
            .get_mut(name)
            .ok_or_else(|| WorkerError::NotFound(name.to_string()))?;

        if state.child.is_none() {
            let child = Command::new(&state.spec.command)
                .args(state.spec.args.iter().chain(args.iter()))
                .stdin(Stdio::null())
                .spawn()
                .map_err(|source| WorkerError::Spawn {
                    name: name.to_string(),
                    source,
                })?;
            state.child = Some(child);
        }

        let deadline = Instant::now() + state.spec.timeout;
        loop {
            let Some(child) = state.child.as_mut() else {
                unreachable!("just assigned above");
            };
            match child.try_wait() {
                Ok(Some(status)) => {
                    state.child = None;
                    return Ok(WorkerCallOutcome::Exited(status));
                }
                Ok(None) if Instant::now() >= deadline => {
                    return Ok(WorkerCallOutcome::Timeout);
                }
                Ok(None) => std::thread::sleep(Duration::from_millis(10)),
                Err(_) => {
                    state.child = None;
                    return Err(WorkerError::Spawn {
                        name: name.to_string(),
                        source: std::io::Error::other("failed to poll worker status"),
                    });
                }
            }
        }
    }

    /// Non-blocking reap of finished workers; restarts those whose policy
    /// calls for it. Shares the same run-loop edge as the Fork Primitive's
    /// reap.
    pub fn reap(&mut self) {
        for state in self.workers.values_mut() {
            let Some(child) = state.child.as_mut() else {
                continue;
            };
            let Ok(Some(status)) = child.try_wait() else {
                continue;
            };
            state.child = None;
            let should_restart = match state.spec.restart_policy {
                RestartPolicy::Always => true,
                RestartPolicy::OnFailure => !status.success(),
                RestartPolicy::Never => false,
            };
            if should_restart {
                info!(worker = %state.spec.name, "restarting worker after exit");
                match Command::new(&state.spec.command)
                    .args(&state.spec.args)
                    .stdin(Stdio::null())
                    .spawn()
                {
                    Ok(child) => state.child = Some(child),
                    Err(e) => warn!(worker = %state.spec.name, "failed to restart worker: {e}"),
                }
            }
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.workers.keys().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
