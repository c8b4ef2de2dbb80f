// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process self-identity: pid, start time, and the structured runtime dump
//! emitted on SIGUSR1.

use std::path::PathBuf;
use std::time::{Duration, Instant};

/// What a running supervisor knows about itself: the absolute path of the
/// executable image (needed to exec a fresh copy on restart), its current
/// pid, and when the current process image started.
#[derive(Debug, Clone)]
pub struct SelfIdentity {
    pub filename: PathBuf,
    pub pid: u32,
    start_time: Instant,
}

impl SelfIdentity {
    pub fn new(filename: PathBuf) -> Self {
        Self {
            filename,
            pid: std::process::id(),
            start_time: Instant::now(),
        }
    }

    /// How long the current process image has been running.
    pub fn runtime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Refreshes `pid` and resets `start_time`; called after every fork in
    /// the child branch. After `-d` detach the same effect is reached by
    /// constructing a fresh `SelfIdentity` once the detached child continues.
    pub fn refresh(&mut self) {
        self.pid = std::process::id();
        self.start_time = Instant::now();
    }
}

/// Payload of the SIGUSR1 runtime dump.
#[derive(Debug, Clone)]
pub struct RuntimeDump {
    pub loop_interval: Duration,
    pub auto_restart_interval: Duration,
    pub pid: u32,
    pub uptime: Duration,
    pub resident_memory_kb: Option<u64>,
    pub plugins: Vec<String>,
    pub workers: Vec<String>,
    pub user: String,
}

impl std::fmt::Display for RuntimeDump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "pid={} uptime={:.1}s loop_interval={:.3}s auto_restart_interval={:.0}s rss={} user={} plugins=[{}] workers=[{}]",
            self.pid,
            self.uptime.as_secs_f64(),
            self.loop_interval.as_secs_f64(),
            self.auto_restart_interval.as_secs_f64(),
            self.resident_memory_kb.map(|kb| format!("{kb}kB")).unwrap_or_else(|| "unknown".into()),
            self.user,
            self.plugins.join(","),
            self.workers.join(","),
        )
    }
}

/// Best-effort resident set size, in kilobytes, read from `/proc/self/status`.
/// Returns `None` off Linux or if the field cannot be parsed.
pub fn resident_memory_kb() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let status = std::fs::read_to_string("/proc/self/status").ok()?;
        for line in status.lines() {
            if let Some(rest) = line.strip_prefix("VmRSS:") {
                return rest.split_whitespace().next()?.parse().ok();
            }
        }
        None
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
