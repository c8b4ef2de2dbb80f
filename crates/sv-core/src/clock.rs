// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drift-aware run-loop pacing.
//!
//! Paces a caller's iteration to a fixed `loop_interval`: sleeps off the
//! remainder when the iteration finished early, yields briefly and reports
//! an overrun when it finished late, and never sleeps longer than the
//! configured interval.

use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

/// CPU-yield floor used on overrun.
const OVERRUN_YIELD: Duration = Duration::from_millis(2);

/// Fraction of `loop_interval` past which an on-time iteration is warned about.
const WARNING_FRACTION: f64 = 0.9;

#[derive(Debug, Error)]
pub enum ClockError {
    #[error("stop_and_sleep() called without a prior start()")]
    NotStarted,
}

/// Outcome of one `stop_and_sleep` call, for logging and for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockReport {
    /// Elapsed time stayed within the warning band; slept the remainder.
    OnTime { elapsed: Duration, slept: Duration },
    /// Elapsed time crossed the warning band but not the interval itself.
    Warning { elapsed: Duration },
    /// Elapsed time exceeded `loop_interval`; yielded `OVERRUN_YIELD` instead.
    Overrun { elapsed: Duration },
}

impl ClockReport {
    pub fn elapsed(&self) -> Duration {
        match *self {
            ClockReport::OnTime { elapsed, .. } => elapsed,
            ClockReport::Warning { elapsed } => elapsed,
            ClockReport::Overrun { elapsed } => elapsed,
        }
    }

    pub fn is_overrun(&self) -> bool {
        matches!(self, ClockReport::Overrun { .. })
    }
}

/// Paces iterations to `loop_interval`. A `loop_interval` of zero means
/// "no sleep" — every iteration takes the overrun branch and yields briefly.
pub struct Clock {
    loop_interval: Duration,
    reference: Option<Instant>,
}

impl Clock {
    pub fn new(loop_interval: Duration) -> Self {
        Self {
            loop_interval,
            reference: None,
        }
    }

    pub fn loop_interval(&self) -> Duration {
        self.loop_interval
    }

    /// Records the reference instant for this iteration.
    pub fn start(&mut self) {
        self.reference = Some(Instant::now());
    }

    /// Computes elapsed time since `start()` and sleeps off the remainder
    /// (or yields on overrun). Returns a [`ClockReport`] describing which
    /// branch was taken so callers can log accordingly.
    ///
    /// # Errors
    /// Returns [`ClockError::NotStarted`] if called without a prior `start()`.
    pub fn stop_and_sleep(&mut self) -> Result<ClockReport, ClockError> {
        let reference = self.reference.take().ok_or(ClockError::NotStarted)?;
        let elapsed = reference.elapsed();

        if elapsed > self.loop_interval {
            thread::sleep(OVERRUN_YIELD);
            return Ok(ClockReport::Overrun { elapsed });
        }

        let warning_band = self.loop_interval.mul_f64(WARNING_FRACTION);
        if self.loop_interval > Duration::ZERO && elapsed > warning_band {
            return Ok(ClockReport::Warning { elapsed });
        }

        let remainder = self.loop_interval - elapsed;
        thread::sleep(remainder);
        Ok(ClockReport::OnTime {
            elapsed,
            slept: remainder,
        })
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
