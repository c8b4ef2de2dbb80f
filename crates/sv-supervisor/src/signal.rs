// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Translates asynchronous OS signals into supervisor state changes and
//! `SIGNAL` events.
//!
//! The process model here is synchronous fork-based, not async — `fork()`
//! and async executors don't mix safely, so signal delivery is handled
//! with `nix::sys::signal` directly rather than an async signal stream: a
//! raw handler that only touches lock-free atomics, drained at the next
//! loop edge.
//!
//! This is the one place in the crate that needs `unsafe` (registering a
//! raw signal handler, and the handler body itself, must be
//! async-signal-safe); the workspace denies `unsafe_code` by default and
//! this module carries a narrow, documented override.
#![allow(unsafe_code)]

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use nix::sys::signal::{self, SigHandler, Signal};
use thiserror::Error;

/// Fixed-size, lock-free ring of pending signal numbers. Async-signal-safe:
/// the handler only does atomic stores, never allocates or locks.
const QUEUE_LEN: usize = 16;

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);
static RESTART_REQUESTED: AtomicBool = AtomicBool::new(false);
static DUMP_REQUESTED: AtomicBool = AtomicBool::new(false);
static QUEUE: [AtomicI32; QUEUE_LEN] = [const { AtomicI32::new(0) }; QUEUE_LEN];
static QUEUE_CURSOR: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("failed to register handler for {signal:?}: {source}")]
    Register {
        signal: Signal,
        #[source]
        source: nix::Error,
    },
}

extern "C" fn handle_signal(raw: libc::c_int) {
    let slot = QUEUE_CURSOR.fetch_add(1, Ordering::Relaxed) % QUEUE_LEN;
    QUEUE[slot].store(raw, Ordering::Relaxed);

    if raw == Signal::SIGTERM as i32 || raw == Signal::SIGINT as i32 {
        SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
    } else if raw == Signal::SIGHUP as i32 {
        RESTART_REQUESTED.store(true, Ordering::SeqCst);
    } else if raw == Signal::SIGUSR1 as i32 {
        DUMP_REQUESTED.store(true, Ordering::SeqCst);
    }
}

/// The fixed set of signals this router captures. Built through a
/// `HashSet` rather than a literal array, so the list can never grow a
/// silent duplicate entry as signals are added.
fn captured_signals() -> Vec<Signal> {
    use std::collections::HashSet;
    let set: HashSet<Signal> = [
        Signal::SIGTERM,
        Signal::SIGINT,
        Signal::SIGHUP,
        Signal::SIGUSR1,
        Signal::SIGUSR2,
        Signal::SIGCONT,
        Signal::SIGWINCH,
    ]
    .into_iter()
    .collect();
    let mut signals: Vec<Signal> = set.into_iter().collect();
    signals.sort_by_key(|s| *s as i32);
    signals
}

/// Installs handlers for every captured signal. SIGKILL/SIGSTOP are
/// intentionally never registered — the OS forbids it anyway.
pub struct SignalRouter {
    _private: (),
}

impl SignalRouter {
    /// # Safety-relevant
    /// Registers a raw `extern "C"` handler via `nix::sys::signal::signal`.
    /// The handler (`handle_signal`) only performs atomic stores, so it is
    /// safe to run at any point, including while the main thread holds
    /// locks elsewhere.
    pub fn install() -> Result<Self, SignalError> {
        for signal in captured_signals() {
            unsafe { signal::signal(signal, SigHandler::Handler(handle_signal)) }
                .map_err(|source| SignalError::Register { signal, source })?;
        }
        Ok(Self { _private: () })
    }

    /// Drains and returns every signal number queued since the last call,
    /// in arrival order. Each one corresponds to one `SIGNAL` dispatch.
    pub fn drain_pending(&self) -> Vec<i32> {
        let mut pending = Vec::new();
        for slot in &QUEUE {
            let raw = slot.swap(0, Ordering::Relaxed);
            if raw != 0 {
                pending.push(raw);
            }
        }
        pending
    }

    /// Returns and clears the shutdown latch set by SIGTERM/SIGINT.
    pub fn take_shutdown_requested(&self) -> bool {
        SHUTDOWN_REQUESTED.swap(false, Ordering::SeqCst)
    }

    /// Returns and clears the restart latch set by SIGHUP.
    pub fn take_restart_requested(&self) -> bool {
        RESTART_REQUESTED.swap(false, Ordering::SeqCst)
    }

    /// Returns and clears the runtime-dump latch set by SIGUSR1.
    pub fn take_dump_requested(&self) -> bool {
        DUMP_REQUESTED.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
