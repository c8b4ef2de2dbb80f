// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn defaults_have_no_auto_restart_below_the_floor() {
    let config = SupervisorConfig::new("/opt/demo/demo", "demo");
    assert_eq!(
        config.auto_restart_interval,
        Duration::from_secs(sv_core::MIN_RESTART_SECONDS)
    );
    assert!(!config.daemon_mode);
    assert!(config.pid_file.is_none());
}

#[test]
fn builder_methods_chain() {
    let config = SupervisorConfig::new("/opt/demo/demo", "demo")
        .loop_interval(Duration::from_millis(500))
        .auto_restart_interval(Duration::from_secs(3600))
        .daemon_mode(true)
        .verbose(true)
        .pid_file("/var/run/demo.pid");

    assert_eq!(config.loop_interval, Duration::from_millis(500));
    assert_eq!(config.auto_restart_interval, Duration::from_secs(3600));
    assert!(config.daemon_mode);
    assert!(config.verbose);
    assert_eq!(config.pid_file, Some(PathBuf::from("/var/run/demo.pid")));
}
