// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn write_header_if_new_adds_header_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sv.log");

    write_header_if_new(&path).unwrap();
    let first = std::fs::read_to_string(&path).unwrap();
    assert_eq!(first, "Date PID Message\n");

    std::fs::write(&path, "Date PID Message\nsomething else\n").unwrap();
    write_header_if_new(&path).unwrap();
    let second = std::fs::read_to_string(&path).unwrap();
    assert_eq!(second, "Date PID Message\nsomething else\n");
}

#[test]
fn format_local_now_matches_the_fixed_shape() {
    let formatted = format_local_now();
    assert_eq!(formatted.len(), "YYYY-MM-DD HH:MM:SS".len());
    assert_eq!(formatted.as_bytes()[4], b'-');
    assert_eq!(formatted.as_bytes()[7], b'-');
    assert_eq!(formatted.as_bytes()[10], b' ');
    assert_eq!(formatted.as_bytes()[13], b':');
    assert_eq!(formatted.as_bytes()[16], b':');
}

#[test]
fn days_to_civil_matches_a_known_epoch_date() {
    // 2024-01-01 is 19723 days after the Unix epoch.
    assert_eq!(days_to_civil(19723), (2024, 1, 1));
}
