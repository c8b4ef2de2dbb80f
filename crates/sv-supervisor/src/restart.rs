// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orderly hand-off from the current process image to a freshly spawned
//! one, including lock release ordering.
//!
//! Needs `unsafe` for `nix::unistd::execv`, replacing the process image in
//! place rather than spawning and exiting; narrowly allowed here, denied
//! everywhere else in the workspace by default.
#![allow(unsafe_code)]

use std::ffi::CString;
use std::path::{Path, PathBuf};

use sv_core::{EventBus, EventKind, EventPayload, PluginHost};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum RestartError {
    #[error("filename '{0}' is not valid for exec (contains a NUL byte)")]
    InvalidFilename(PathBuf),
    #[error("failed to spawn replacement process: {0}")]
    Spawn(#[source] std::io::Error),
}

/// The flags a restarted instance should be launched with.
#[derive(Debug, Clone, Default)]
pub struct RestartOptions {
    pub daemon_mode: bool,
    pub pid_file: Option<PathBuf>,
    /// Overrides the whole argument list when set, bypassing `daemon_mode`
    /// and `pid_file` entirely.
    pub override_args: Option<Vec<String>>,
}

impl RestartOptions {
    fn argv(&self) -> Vec<String> {
        if let Some(args) = &self.override_args {
            return args.clone();
        }
        let mut args = Vec::new();
        if self.daemon_mode {
            args.push("-d".to_string());
            if let Some(pid_file) = &self.pid_file {
                args.push("-p".to_string());
                args.push(pid_file.to_string_lossy().into_owned());
            }
        }
        args
    }
}

/// Runs the restart protocol: dispatches RESTART, tears down the lock
/// plugin, closes stdout/stderr, and replaces the process image with a
/// fresh copy of `filename`. Never returns on success — the process image
/// is gone. Returns only on failure, or immediately (a no-op) when
/// `is_parent` is false.
pub fn restart(
    events: &EventBus,
    plugins: &mut PluginHost,
    filename: &Path,
    is_parent: bool,
    options: &RestartOptions,
) -> Result<(), RestartError> {
    if !is_parent {
        return Ok(());
    }

    events.dispatch(EventKind::Restart, &EventPayload::None);

    if let Some(lock) = plugins.lock_plugin_mut() {
        if let Err(e) = lock.teardown() {
            error!("restart: lock plugin teardown failed: {e}");
        }
    }

    close_standard_streams();

    let argv = options.argv();
    exec_or_spawn(filename, &argv)
}

#[cfg(unix)]
fn close_standard_streams() {
    use std::os::fd::AsRawFd;
    let dev_null = match std::fs::OpenOptions::new().write(true).open("/dev/null") {
        Ok(f) => f,
        Err(e) => {
            error!("restart: failed to open /dev/null: {e}");
            return;
        }
    };
    let fd = dev_null.as_raw_fd();
    unsafe {
        libc::dup2(fd, libc::STDOUT_FILENO);
        libc::dup2(fd, libc::STDERR_FILENO);
    }
}

/// Replaces the current process image via `execv`. Falls back to spawning
/// a detached child and exiting if `execv` fails (e.g. a non-absolute or
/// otherwise unusable filename) or if the path contains an interior NUL.
fn exec_or_spawn(filename: &Path, argv: &[String]) -> Result<(), RestartError> {
    let path_cstr = path_to_cstring(filename)?;
    let mut exec_argv = vec![path_cstr.clone()];
    for arg in argv {
        exec_argv.push(
            CString::new(arg.as_str())
                .map_err(|_| RestartError::InvalidFilename(filename.to_path_buf()))?,
        );
    }

    let Err(e) = nix::unistd::execv(&path_cstr, &exec_argv);
    error!("restart: execv failed, falling back to spawn: {e}");
    std::process::Command::new(filename)
        .args(argv)
        .spawn()
        .map_err(RestartError::Spawn)?;
    std::process::exit(0);
}

fn path_to_cstring(path: &Path) -> Result<CString, RestartError> {
    use std::os::unix::ffi::OsStrExt;
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| RestartError::InvalidFilename(path.to_path_buf()))
}

#[cfg(test)]
#[path = "restart_tests.rs"]
mod tests;
