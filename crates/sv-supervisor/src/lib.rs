// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! sv-supervisor: the run loop, signal handling, fork/worker primitives,
//! and restart protocol built on top of `sv-core`.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod cli;
pub mod config;
pub mod fork;
pub mod init_script;
pub mod logging;
pub mod restart;
pub mod signal;
pub mod supervisor;
pub mod worker;

pub use cli::{CliAction, CliError, RunFlags};
pub use config::SupervisorConfig;
pub use fork::{daemonize, fork_task, reap_children};
pub use init_script::InitScriptError;
pub use logging::{setup_logging, LoggingError};
pub use restart::{restart, RestartError, RestartOptions};
pub use signal::{SignalError, SignalRouter};
pub use supervisor::{Supervisor, SupervisorError};
pub use worker::{RestartPolicy, WorkerCallOutcome, WorkerError, WorkerManager, WorkerSpec};
