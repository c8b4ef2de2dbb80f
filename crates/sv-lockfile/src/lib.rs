// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sv-lockfile: a concrete [`LockPlugin`](sv_core::LockPlugin) backed by an
//! exclusively-locked pid file.
//!
//! Sequence: open the file without truncating, take an exclusive advisory
//! lock, and only once the lock is held, truncate and write the pid. Doing
//! the open/lock/truncate in that order means a second process that can't
//! get the lock never sees the first process's pid file go blank.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;
use tracing::info;

use sv_core::{LockPlugin, Plugin, PluginError};

#[derive(Debug, Error)]
pub enum FileLockError {
    #[error("failed to open lock file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("lock file {path} is held by another process")]
    Held { path: PathBuf },
    #[error("failed to write pid to lock file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A `LockPlugin` that claims the singleton token by taking an exclusive
/// advisory lock (`flock`) on a pid file and writing its own pid into it.
pub struct FileLockPlugin {
    path: PathBuf,
    file: Option<File>,
}

impl FileLockPlugin {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    fn open_for_locking(&self) -> Result<File, FileLockError> {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|source| FileLockError::Open {
                path: self.path.clone(),
                source,
            })
    }
}

impl Plugin for FileLockPlugin {
    fn name(&self) -> &str {
        "lockfile"
    }

    fn check_environment(&self) -> Vec<String> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
                vec![format!(
                    "lock file directory does not exist: {}",
                    parent.display()
                )]
            }
            _ => Vec::new(),
        }
    }

    fn setup(&mut self) -> Result<(), PluginError> {
        self.acquire()
    }

    fn teardown(&mut self) -> Result<(), PluginError> {
        if let Some(file) = self.file.take() {
            let _ = fs2::FileExt::unlock(&file);
            info!(path = %self.path.display(), "lock released");
        }
        Ok(())
    }

    fn as_lock_plugin(&mut self) -> Option<&mut dyn LockPlugin> {
        Some(self)
    }
}

impl LockPlugin for FileLockPlugin {
    fn acquire(&mut self) -> Result<(), PluginError> {
        let file = self.open_for_locking().map_err(|e| PluginError::Failed {
            plugin: "lockfile".into(),
            phase: "setup",
            message: e.to_string(),
        })?;
        file.try_lock_exclusive()
            .map_err(|_| PluginError::LockHeld)?;

        let mut file = file;
        file.set_len(0).map_err(|source| PluginError::Failed {
            plugin: "lockfile".into(),
            phase: "setup",
            message: FileLockError::Write {
                path: self.path.clone(),
                source,
            }
            .to_string(),
        })?;
        writeln!(file, "{}", std::process::id()).map_err(|source| PluginError::Failed {
            plugin: "lockfile".into(),
            phase: "setup",
            message: FileLockError::Write {
                path: self.path.clone(),
                source,
            }
            .to_string(),
        })?;

        self.file = Some(file);
        info!(path = %self.path.display(), pid = std::process::id(), "lock acquired");
        Ok(())
    }

    fn is_held_by_other(&self) -> bool {
        if self.file.is_some() {
            return false;
        }
        match self.open_for_locking() {
            Ok(probe) => match probe.try_lock_exclusive() {
                Ok(()) => {
                    let _ = fs2::FileExt::unlock(&probe);
                    false
                }
                Err(_) => true,
            },
            Err(_) => false,
        }
    }
}

/// Reads the pid recorded in `path`, if any and parseable.
pub fn read_recorded_pid(path: &Path) -> Option<u32> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
