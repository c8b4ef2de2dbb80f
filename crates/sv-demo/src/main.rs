// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! svd: a minimal periodic-heartbeat service exercising the full
//! supervisor stack — one `execute()` body that logs a heartbeat line on
//! every run-loop iteration, backed by a file lock plugin.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::path::PathBuf;
use std::time::Duration;

use sv_core::{EventKind, EventPayload};
use sv_lockfile::FileLockPlugin;
use sv_supervisor::cli::{self, CliAction};
use sv_supervisor::{logging, SupervisorConfig};
use tracing::{error, info};

const CLASS_NAME: &str = "svd";

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let action = match cli::parse(&args) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("{}", cli::help_text(CLASS_NAME));
            std::process::exit(1);
        }
    };

    match action {
        CliAction::PrintHelp => {
            print!("{}", cli::help_text(CLASS_NAME));
        }
        CliAction::PrintInstallInstructions => {
            print!(
                "{}",
                sv_supervisor::init_script::install_instructions(CLASS_NAME)
            );
        }
        CliAction::WriteInitScript => {
            let filename = current_exe_string();
            match sv_supervisor::init_script::write(CLASS_NAME, "/bin/sh", &filename) {
                Ok(path) => println!("wrote {}", path.display()),
                Err(e) => {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                }
            }
        }
        CliAction::Run(flags) => run(flags),
    }
}

fn current_exe_string() -> String {
    std::env::current_exe()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| CLASS_NAME.to_string())
}

fn run(flags: sv_supervisor::RunFlags) -> ! {
    if flags.detach {
        detach();
    }

    let filename = std::env::current_exe().unwrap_or_else(|_| PathBuf::from(CLASS_NAME));
    let log_path = flags
        .pid_file
        .as_ref()
        .and_then(|p| p.parent())
        .map(|dir| dir.join(format!("{CLASS_NAME}.log")))
        .unwrap_or_else(|| PathBuf::from(format!("{CLASS_NAME}.log")));

    let mirror_to_stdout = flags.verbose && !flags.detach;
    let _log_guard = match logging::setup_logging(&log_path, mirror_to_stdout) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: failed to set up logging: {e}");
            None
        }
    };

    let mut config = SupervisorConfig::new(filename, CLASS_NAME)
        .loop_interval(Duration::from_secs(1))
        .auto_restart_interval(Duration::from_secs(sv_core::MIN_RESTART_SECONDS))
        .daemon_mode(flags.detach)
        .verbose(flags.verbose);
    if let Some(pid_file) = &flags.pid_file {
        config = config.pid_file(pid_file.clone());
    }

    let lock_path = flags
        .pid_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("/tmp/{CLASS_NAME}.lock")));

    let mut supervisor = match sv_supervisor::Supervisor::new(config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    if flags.detach {
        info!(pid = supervisor.identity.pid, "detached, new pid assigned");
        supervisor.events.dispatch(
            EventKind::NewPid,
            &EventPayload::Pid(supervisor.identity.pid),
        );
    }

    if let Err(e) = supervisor
        .plugins
        .load_plugin("lockfile", Box::new(FileLockPlugin::new(lock_path)))
    {
        error!("failed to load lock plugin: {e}");
        std::process::exit(1);
    }

    if let Err(e) = supervisor.init(|| Ok(())) {
        error!("initialization failed: {e}");
        std::process::exit(1);
    }

    info!("svd started, pid={}", std::process::id());

    let mut ticks: u64 = 0;
    let result = supervisor.run(|_sv| {
        ticks += 1;
        info!(ticks, "heartbeat");
        Ok(())
    });

    if let Err(e) = result {
        error!("run loop exited with error: {e}");
        std::process::exit(1);
    }

    std::process::exit(0);
}

fn detach() {
    if let Err(e) = sv_supervisor::daemonize() {
        eprintln!("error: failed to detach: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
