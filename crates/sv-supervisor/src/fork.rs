// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forks a child to run a one-shot callable, isolating the parent's
//! plugins, file handles, and pid record from the child's teardown.
//!
//! Needs `unsafe` for `nix::unistd::fork`; narrowly allowed here, denied
//! everywhere else in the workspace by default.
#![allow(unsafe_code)]

use std::panic::{self, AssertUnwindSafe};

use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::ForkResult;
use sv_core::{EventBus, EventKind, EventPayload, PluginHost, SelfIdentity};
use tracing::error;

/// Forks a child process to run `callable`, returning `true` if the fork
/// succeeded (regardless of what the child eventually does — the parent
/// does not wait for it).
///
/// In the child branch: the plugin registry is cleared without teardown,
/// `identity` is refreshed (new pid, new start time), `app_setup` re-runs
/// when `run_setup` is set (reconnecting resources invalidated across the
/// fork, e.g. database handles), then `callable` runs and the process
/// exits — it never returns to the caller's stack.
pub fn fork_task<F>(
    events: &EventBus,
    plugins: &mut PluginHost,
    identity: &mut SelfIdentity,
    run_setup: bool,
    app_setup: &dyn Fn() -> Result<(), String>,
    callable: F,
) -> bool
where
    F: FnOnce() + 'static,
{
    events.dispatch(EventKind::Fork, &EventPayload::None);

    match unsafe { nix::unistd::fork() } {
        Ok(ForkResult::Parent { .. }) => true,
        Ok(ForkResult::Child) => {
            plugins.clear_without_teardown();
            identity.refresh();

            if run_setup {
                if let Err(message) = app_setup() {
                    error!("fork child: app setup failed: {message}");
                }
            }

            if panic::catch_unwind(AssertUnwindSafe(callable)).is_err() {
                error!("fork child: callable panicked");
            }

            std::process::exit(0);
        }
        Err(e) => {
            error!("fork failed: {e}");
            false
        }
    }
}

/// Forks once and exits the parent, so the caller's continuation runs only
/// in the detached child. Used for `-d` at startup, before a [`crate::Supervisor`]
/// exists, so it has no `EventBus`/`PluginHost` to dispatch against.
pub fn daemonize() -> Result<(), nix::errno::Errno> {
    match unsafe { nix::unistd::fork() }? {
        ForkResult::Parent { .. } => std::process::exit(0),
        ForkResult::Child => Ok(()),
    }
}

/// Non-blocking reap of any exited children, so zombies never accumulate.
/// Called once per run-loop iteration by both the Fork Primitive and the
/// Worker Manager.
pub fn reap_children() {
    loop {
        match waitpid(None, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => break,
            Ok(WaitStatus::Exited(..)) | Ok(WaitStatus::Signaled(..)) => continue,
            Ok(_) => continue,
            Err(nix::errno::Errno::ECHILD) => break,
            Err(_) => break,
        }
    }
}

#[cfg(test)]
#[path = "fork_tests.rs"]
mod tests;
