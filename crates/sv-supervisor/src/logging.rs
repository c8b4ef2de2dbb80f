// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log file setup: a lazily-opened, append-only file with a fixed
//! `Date PID Message` header on first open and a `[YYYY-MM-DD HH:MM:SS]
//! <pid>` prefix on every line.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;
use std::time::SystemTime;

use thiserror::Error;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::FormatFields;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to prepare log directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("log path '{0}' has no file name")]
    NoFileName(std::path::PathBuf),
}

/// Installs the global `tracing` subscriber writing to `log_path`, and
/// returns the guard that must be kept alive for the life of the process
/// (dropping it stops the background flush thread). When `mirror_to_stdout`
/// is set, every line is additionally written to stdout in the same format.
pub fn setup_logging(
    log_path: &Path,
    mirror_to_stdout: bool,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LoggingError> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_header_if_new(log_path)?;

    let dir = log_path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = log_path
        .file_name()
        .ok_or_else(|| LoggingError::NoFileName(log_path.to_path_buf()))?;
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = mirror_to_stdout.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .event_format(SupervisorLineFormat)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .event_format(SupervisorLineFormat),
        )
        .with(stdout_layer)
        .init();

    Ok(guard)
}

fn write_header_if_new(log_path: &Path) -> Result<(), LoggingError> {
    let is_new = std::fs::metadata(log_path)
        .map(|m| m.len() == 0)
        .unwrap_or(true);
    if !is_new {
        return Ok(());
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    writeln!(file, "Date PID Message")?;
    Ok(())
}

/// `[YYYY-MM-DD HH:MM:SS] <pid> message`
struct SupervisorLineFormat;

impl<S, N> FormatEvent<S, N> for SupervisorLineFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        write!(writer, "[{}] {} ", format_local_now(), std::process::id())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn format_local_now() -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = now.as_secs();

    let days = secs / 86400;
    let time_of_day = secs % 86400;
    let hours = time_of_day / 3600;
    let minutes = (time_of_day % 3600) / 60;
    let seconds = time_of_day % 60;

    let (year, month, day) = days_to_civil(days);

    format!("{year:04}-{month:02}-{day:02} {hours:02}:{minutes:02}:{seconds:02}")
}

/// Converts days since the Unix epoch to (year, month, day). Howard
/// Hinnant's `civil_from_days` algorithm.
fn days_to_civil(days: u64) -> (i64, u32, u32) {
    let z = days as i64 + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m as u32, d as u32)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
