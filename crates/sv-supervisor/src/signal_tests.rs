// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
fn captured_signals_contains_no_duplicates() {
    let signals = captured_signals();
    let mut sorted = signals.clone();
    sorted.sort_by_key(|s| *s as i32);
    sorted.dedup();
    assert_eq!(signals.len(), sorted.len());
}

#[test]
fn captured_signals_never_includes_sigkill_or_sigstop() {
    let signals = captured_signals();
    assert!(!signals.contains(&Signal::SIGKILL));
    assert!(!signals.contains(&Signal::SIGSTOP));
}

#[test]
#[serial]
fn sigterm_sets_shutdown_latch() {
    let router = SignalRouter::install().unwrap();
    router.take_shutdown_requested(); // clear any leftover state
    router.drain_pending();

    nix::sys::signal::raise(Signal::SIGTERM).unwrap();

    assert!(router.take_shutdown_requested());
    assert!(router.drain_pending().contains(&(Signal::SIGTERM as i32)));
}

#[test]
#[serial]
fn sighup_sets_restart_latch_not_shutdown() {
    let router = SignalRouter::install().unwrap();
    router.take_shutdown_requested();
    router.take_restart_requested();
    router.drain_pending();

    nix::sys::signal::raise(Signal::SIGHUP).unwrap();

    assert!(router.take_restart_requested());
    assert!(!router.take_shutdown_requested());
}

#[test]
#[serial]
fn sigusr1_sets_dump_latch_only() {
    let router = SignalRouter::install().unwrap();
    router.take_dump_requested();
    router.take_shutdown_requested();
    router.take_restart_requested();
    router.drain_pending();

    nix::sys::signal::raise(Signal::SIGUSR1).unwrap();

    assert!(router.take_dump_requested());
    assert!(!router.take_shutdown_requested());
    assert!(!router.take_restart_requested());
}

#[test]
#[serial]
fn sigusr2_is_forwarded_without_a_default_action() {
    let router = SignalRouter::install().unwrap();
    router.take_shutdown_requested();
    router.take_restart_requested();
    router.take_dump_requested();
    router.drain_pending();

    nix::sys::signal::raise(Signal::SIGUSR2).unwrap();

    assert!(router.drain_pending().contains(&(Signal::SIGUSR2 as i32)));
    assert!(!router.take_shutdown_requested());
    assert!(!router.take_restart_requested());
    assert!(!router.take_dump_requested());
}

#[test]
#[serial]
fn take_latches_clear_after_reading() {
    let router = SignalRouter::install().unwrap();
    nix::sys::signal::raise(Signal::SIGTERM).unwrap();
    assert!(router.take_shutdown_requested());
    assert!(!router.take_shutdown_requested());
}
