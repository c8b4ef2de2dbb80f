// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The top-level state machine: drives init, signal handling, periodic
//! execute, auto-restart, shutdown.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use sv_core::{
    Clock, ClockReport, EventBus, EventKind, EventPayload, PluginHost, SelfIdentity,
    MIN_RESTART_SECONDS,
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::SupervisorConfig;
use crate::restart::{self, RestartOptions};
use crate::worker::WorkerManager;
use crate::SignalRouter;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("a supervisor is already constructed in this process")]
    AlreadyConstructed,
    #[error("failed to install signal handlers: {0}")]
    Signal(#[from] crate::SignalError),
    #[error("environment check failed: {0:?}")]
    EnvironmentCheck(Vec<String>),
    #[error("plugin error: {0}")]
    Plugin(#[from] sv_core::PluginError),
    #[error("application setup failed: {0}")]
    Setup(String),
}

static CONSTRUCTED: AtomicBool = AtomicBool::new(false);

/// The singleton runtime instance built from a [`SupervisorConfig`].
pub struct Supervisor {
    pub identity: SelfIdentity,
    pub events: EventBus,
    pub plugins: PluginHost,
    pub workers: WorkerManager,
    clock: Clock,
    signals: SignalRouter,
    config: SupervisorConfig,
    shutdown: bool,
    pid_file_owned: bool,
}

impl Supervisor {
    /// Constructs the one live supervisor for this process. Fails if a
    /// supervisor is already constructed and not yet dropped.
    pub fn new(config: SupervisorConfig) -> Result<Self, SupervisorError> {
        if CONSTRUCTED
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SupervisorError::AlreadyConstructed);
        }

        let identity = SelfIdentity::new(config.filename.clone());
        let signals = match SignalRouter::install() {
            Ok(s) => s,
            Err(e) => {
                CONSTRUCTED.store(false, Ordering::SeqCst);
                return Err(SupervisorError::Signal(e));
            }
        };

        if let Some(pid_file) = &config.pid_file {
            if let Err(e) = std::fs::write(pid_file, identity.pid.to_string()) {
                warn!("failed to write pid file {}: {e}", pid_file.display());
            }
        }

        let clock = Clock::new(config.loop_interval);

        Ok(Self {
            identity,
            events: EventBus::new(),
            plugins: PluginHost::new(),
            workers: WorkerManager::new(),
            clock,
            signals,
            config,
            shutdown: false,
            pid_file_owned: true,
        })
    }

    pub fn filename(&self) -> &PathBuf {
        &self.config.filename
    }

    pub fn class_name(&self) -> &str {
        &self.config.class_name
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown
    }

    /// Composite environment-check report: non-empty iff unfit to run.
    pub fn environment_check(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.config.filename.as_os_str().is_empty() {
            problems.push("filename must be set".to_string());
        }
        if self.config.auto_restart_interval.as_secs() < MIN_RESTART_SECONDS {
            problems.push(format!(
                "auto_restart_interval must be >= {MIN_RESTART_SECONDS}s"
            ));
        }
        problems.extend(self.plugins.check_environment());
        problems
    }

    /// Runs `setup()` on every loaded plugin, dispatches INIT, then runs
    /// the application's own `setup()`.
    pub fn init<S>(&mut self, app_setup: S) -> Result<(), SupervisorError>
    where
        S: FnOnce() -> Result<(), String>,
    {
        let problems = self.environment_check();
        if !problems.is_empty() {
            return Err(SupervisorError::EnvironmentCheck(problems));
        }

        if let Some(lock) = self.plugins.lock_plugin_mut() {
            if lock.is_held_by_other() {
                return Err(SupervisorError::EnvironmentCheck(vec![
                    "lock plugin is held by another instance".to_string(),
                ]));
            }
        }

        self.plugins.setup_all()?;
        self.events.dispatch(EventKind::Init, &EventPayload::None);
        app_setup().map_err(SupervisorError::Setup)?;
        Ok(())
    }

    /// Runs the fixed-order run loop until `shutdown` latches, then tears
    /// down normally. `execute` is the application's periodic work.
    pub fn run<E>(&mut self, mut execute: E) -> Result<(), SupervisorError>
    where
        E: FnMut(&mut Supervisor) -> Result<(), String>,
    {
        while !self.shutdown {
            self.clock.start();

            self.maybe_auto_restart();
            if self.shutdown {
                break;
            }

            self.events.dispatch(EventKind::Run, &EventPayload::None);

            if let Err(message) = execute(self) {
                error!("execute() failed: {message}");
                self.events
                    .dispatch(EventKind::Error, &EventPayload::Message(message));
                self.fatal_and_exit();
            }

            match self.clock.stop_and_sleep() {
                Ok(ClockReport::OnTime { .. }) => {}
                Ok(ClockReport::Warning { elapsed }) => {
                    warn!(
                        elapsed_ms = elapsed.as_millis() as u64,
                        "loop iteration approaching interval"
                    );
                }
                Ok(ClockReport::Overrun { elapsed }) => {
                    if self.config.loop_interval > Duration::ZERO {
                        error!(
                            elapsed_ms = elapsed.as_millis() as u64,
                            "loop iteration overran its interval"
                        );
                    }
                }
                Err(e) => {
                    error!("clock error: {e}");
                    self.fatal_and_exit();
                }
            }

            crate::fork::reap_children();
            self.workers.reap();
            self.service_signals();
        }

        self.shutdown_sequence();
        Ok(())
    }

    /// Drains pending signals and translates them into supervisor state.
    fn service_signals(&mut self) {
        for raw in self.signals.drain_pending() {
            self.events
                .dispatch(EventKind::Signal, &EventPayload::Signal(raw));
        }
        if self.signals.take_shutdown_requested() {
            info!("shutdown requested");
            self.shutdown = true;
        }
        if self.signals.take_restart_requested() {
            info!("restart requested via SIGHUP");
            self.restart_now();
        }
        if self.signals.take_dump_requested() {
            info!("{}", self.runtime_dump());
        }
    }

    fn maybe_auto_restart(&mut self) {
        if !self.config.daemon_mode {
            return;
        }
        if self.config.auto_restart_interval.as_secs() < MIN_RESTART_SECONDS {
            return;
        }
        if self.identity.runtime() >= self.config.auto_restart_interval {
            info!("auto-restart interval elapsed");
            self.restart_now();
        }
    }

    fn restart_options(&self) -> RestartOptions {
        RestartOptions {
            daemon_mode: self.config.daemon_mode,
            pid_file: self.config.pid_file.clone(),
            override_args: None,
        }
    }

    fn restart_now(&mut self) {
        let options = self.restart_options();
        let filename = self.config.filename.clone();
        if let Err(e) = restart::restart(&self.events, &mut self.plugins, &filename, true, &options)
        {
            error!("restart failed: {e}");
        }
    }

    /// Logs the fatal error and shutdown notice, then either attempts a
    /// restart (if uptime allows) or exits with status 1. Never returns.
    fn fatal_and_exit(&mut self) -> ! {
        error!("fatal error in run loop, shutting down");
        if self.identity.runtime() >= Duration::from_secs(MIN_RESTART_SECONDS) {
            std::thread::sleep(Duration::from_secs(2));
            let options = self.restart_options();
            let filename = self.config.filename.clone();
            if let Err(e) =
                restart::restart(&self.events, &mut self.plugins, &filename, true, &options)
            {
                error!("fatal: restart attempt failed: {e}");
            }
        }
        std::process::exit(1);
    }

    fn shutdown_sequence(&mut self) {
        self.events
            .dispatch(EventKind::Shutdown, &EventPayload::None);
        for error in self.plugins.teardown_all() {
            warn!("plugin teardown error: {error}");
        }
        self.remove_pid_file_if_owned();
    }

    fn remove_pid_file_if_owned(&mut self) {
        if !self.pid_file_owned {
            return;
        }
        let Some(pid_file) = &self.config.pid_file else {
            return;
        };
        let Ok(contents) = std::fs::read_to_string(pid_file) else {
            return;
        };
        if contents.trim() == self.identity.pid.to_string() {
            if let Err(e) = std::fs::remove_file(pid_file) {
                warn!("failed to remove pid file {}: {e}", pid_file.display());
            }
        }
    }

    pub fn runtime_dump(&self) -> sv_core::RuntimeDump {
        sv_core::RuntimeDump {
            loop_interval: self.config.loop_interval,
            auto_restart_interval: self.config.auto_restart_interval,
            pid: self.identity.pid,
            uptime: self.identity.runtime(),
            resident_memory_kb: sv_core::identity::resident_memory_kb(),
            plugins: self.plugins.names().into_iter().map(String::from).collect(),
            workers: self.workers.names().into_iter().map(String::from).collect(),
            user: whoami::username(),
        }
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        CONSTRUCTED.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
