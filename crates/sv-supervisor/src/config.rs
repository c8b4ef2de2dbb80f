// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! What the caller wants, as opposed to `Supervisor` itself (the one live
//! instance built from a valid config).

use std::path::PathBuf;
use std::time::Duration;

/// Builder for the values a [`crate::Supervisor`] is constructed from.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub filename: PathBuf,
    pub class_name: String,
    pub loop_interval: Duration,
    pub auto_restart_interval: Duration,
    pub daemon_mode: bool,
    pub verbose: bool,
    pub pid_file: Option<PathBuf>,
}

impl SupervisorConfig {
    /// `filename` is the absolute path of the executable image used for
    /// self-restart; `class_name` names the generated init script and pid
    /// file defaults.
    pub fn new(filename: impl Into<PathBuf>, class_name: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            class_name: class_name.into(),
            loop_interval: Duration::ZERO,
            auto_restart_interval: Duration::from_secs(sv_core::MIN_RESTART_SECONDS),
            daemon_mode: false,
            verbose: false,
            pid_file: None,
        }
    }

    pub fn loop_interval(mut self, interval: Duration) -> Self {
        self.loop_interval = interval;
        self
    }

    pub fn auto_restart_interval(mut self, interval: Duration) -> Self {
        self.auto_restart_interval = interval;
        self
    }

    pub fn daemon_mode(mut self, enabled: bool) -> Self {
        self.daemon_mode = enabled;
        self
    }

    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    pub fn pid_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.pid_file = Some(path.into());
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
