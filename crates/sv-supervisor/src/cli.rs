// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hand-rolled flag parsing over `std::env::args()` — a handful of flags
//! don't need a CLI-args crate: `-H`, `-i`, `-I`, `-d`, `-v`, `-p <path>`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("-p requires a path argument")]
    MissingPidPath,
    #[error("unrecognized argument '{0}'")]
    Unrecognized(String),
}

/// What to do with the parsed command line, before the run loop starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// Print help text and exit 0.
    PrintHelp,
    /// Print accumulated install instructions and exit 0.
    PrintInstallInstructions,
    /// Write an init script to `/etc/init.d/<class_name>` and exit.
    WriteInitScript,
    /// Proceed to construct and run the supervisor.
    Run(RunFlags),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunFlags {
    /// `-d`: detach and become a daemon.
    pub detach: bool,
    /// `-v`: mirror logs to stdout (ignored when `detach` is set).
    pub verbose: bool,
    /// `-p <path>`: write current pid to `<path>`.
    pub pid_file: Option<PathBuf>,
}

/// Parses flags in the order given; `-H`, `-i`, and `-I` short-circuit
/// (matching "print help and exit" style one-shot flags taking priority
/// over the run flags that follow them).
pub fn parse(args: &[String]) -> Result<CliAction, CliError> {
    let mut flags = RunFlags::default();
    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-H" => return Ok(CliAction::PrintHelp),
            "-i" => return Ok(CliAction::PrintInstallInstructions),
            "-I" => return Ok(CliAction::WriteInitScript),
            "-d" => flags.detach = true,
            "-v" => flags.verbose = true,
            "-p" => {
                let path = iter.next().ok_or(CliError::MissingPidPath)?;
                flags.pid_file = Some(PathBuf::from(path));
            }
            other => return Err(CliError::Unrecognized(other.to_string())),
        }
    }
    Ok(CliAction::Run(flags))
}

/// Help text for `-H`.
pub fn help_text(class_name: &str) -> String {
    format!(
        "Usage: {class_name} [-H] [-i] [-I] [-d] [-v] [-p <pid_file>]\n\n\
         OPTIONS:\n\
         \x20   -H              Print this help and exit\n\
         \x20   -i              Print install instructions and exit\n\
         \x20   -I              Write an init script to /etc/init.d/{class_name} and exit\n\
         \x20   -d              Detach and run as a daemon\n\
         \x20   -v              Mirror logs to stdout (ignored with -d)\n\
         \x20   -p <pid_file>   Write the current pid to <pid_file>\n"
    )
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
