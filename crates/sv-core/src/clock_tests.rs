// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn stop_and_sleep_without_start_is_an_error() {
    let mut clock = Clock::new(Duration::from_millis(50));
    assert!(matches!(
        clock.stop_and_sleep(),
        Err(ClockError::NotStarted)
    ));
}

#[test]
fn on_time_iteration_sleeps_the_remainder() {
    let mut clock = Clock::new(Duration::from_millis(50));
    clock.start();
    thread::sleep(Duration::from_millis(5));
    let report = clock.stop_and_sleep().unwrap();
    match report {
        ClockReport::OnTime { elapsed, slept } => {
            assert!(elapsed < Duration::from_millis(50));
            assert!(slept <= Duration::from_millis(50));
        }
        other => panic!("expected OnTime, got {other:?}"),
    }
}

#[test]
fn overrun_is_reported_and_still_yields() {
    let mut clock = Clock::new(Duration::from_millis(10));
    clock.start();
    thread::sleep(Duration::from_millis(20));
    let report = clock.stop_and_sleep().unwrap();
    assert!(report.is_overrun());
    assert!(report.elapsed() >= Duration::from_millis(20));
}

#[test]
fn warning_band_fires_before_overrun() {
    let mut clock = Clock::new(Duration::from_millis(20));
    clock.start();
    thread::sleep(Duration::from_millis(19));
    let report = clock.stop_and_sleep().unwrap();
    assert!(matches!(
        report,
        ClockReport::Warning { .. } | ClockReport::Overrun { .. }
    ));
}

#[yare::parameterized(
    zero_interval_is_always_overrun = { 0, 5 },
    small_interval_overrun = { 10, 50 },
)]
fn interval_ms_elapsed_ms_is_overrun(interval_ms: u64, sleep_ms: u64) {
    let mut clock = Clock::new(Duration::from_millis(interval_ms));
    clock.start();
    thread::sleep(Duration::from_millis(sleep_ms));
    let report = clock.stop_and_sleep().unwrap();
    assert!(
        report.is_overrun(),
        "expected overrun for interval={interval_ms}ms sleep={sleep_ms}ms"
    );
}

#[test]
fn second_start_resets_reference() {
    let mut clock = Clock::new(Duration::from_millis(100));
    clock.start();
    thread::sleep(Duration::from_millis(5));
    clock.start();
    let report = clock.stop_and_sleep().unwrap();
    assert!(report.elapsed() < Duration::from_millis(100));
}
