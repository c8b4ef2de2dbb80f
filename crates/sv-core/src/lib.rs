// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sv-core: shared types for the supervised-process framework.
//!
//! This crate has no knowledge of forking, signals, or the run loop — those
//! live in `sv-supervisor`. It provides the data model and traits that both
//! `sv-supervisor` and lock-plugin crates (e.g. `sv-lockfile`) build on: the
//! Clock/Timer, the Event Bus, the Plugin/LockPlugin contract, and process
//! self-identity.

pub mod clock;
pub mod event;
pub mod identity;
pub mod plugin;

pub use clock::{Clock, ClockError, ClockReport};
pub use event::{EventBus, EventKind, EventPayload, ListenerHandle};
pub use identity::{RuntimeDump, SelfIdentity};
pub use plugin::{LockPlugin, Plugin, PluginError, PluginHost};

/// Hard floor, in seconds, below which `auto_restart_interval` is rejected.
pub const MIN_RESTART_SECONDS: u64 = 10;
