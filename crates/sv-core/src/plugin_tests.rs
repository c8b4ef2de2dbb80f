// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

struct RecordingPlugin {
    name: String,
    env_problems: Vec<String>,
    log: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
    fail_setup: bool,
}

impl Plugin for RecordingPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn check_environment(&self) -> Vec<String> {
        self.env_problems.clone()
    }

    fn setup(&mut self) -> Result<(), PluginError> {
        if self.fail_setup {
            return Err(PluginError::Failed {
                plugin: self.name.clone(),
                phase: "setup",
                message: "boom".into(),
            });
        }
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:setup", self.name));
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), PluginError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:teardown", self.name));
        Ok(())
    }
}

fn plugin(name: &str, log: &std::sync::Arc<std::sync::Mutex<Vec<String>>>) -> Box<dyn Plugin> {
    Box::new(RecordingPlugin {
        name: name.to_string(),
        env_problems: Vec::new(),
        log: std::sync::Arc::clone(log),
        fail_setup: false,
    })
}

#[test]
fn duplicate_alias_is_rejected() {
    let log = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let mut host = PluginHost::new();
    host.load_plugin("a", plugin("a", &log)).unwrap();
    let err = host.load_plugin("a", plugin("a", &log)).unwrap_err();
    assert!(matches!(err, PluginError::DuplicateAlias(ref n) if n == "a"));
}

#[test]
fn setup_runs_in_order_teardown_runs_in_reverse() {
    let log = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let mut host = PluginHost::new();
    host.load_plugin("a", plugin("a", &log)).unwrap();
    host.load_plugin("b", plugin("b", &log)).unwrap();
    host.setup_all().unwrap();
    host.teardown_all();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["a:setup", "b:setup", "b:teardown", "a:teardown"]
    );
}

#[test]
fn setup_failure_is_fatal_and_reported() {
    let log = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let mut host = PluginHost::new();
    host.load_plugin(
        "broken",
        Box::new(RecordingPlugin {
            name: "broken".into(),
            env_problems: Vec::new(),
            log: std::sync::Arc::clone(&log),
            fail_setup: true,
        }),
    )
    .unwrap();
    let err = host.setup_all().unwrap_err();
    assert!(matches!(err, PluginError::Failed { plugin, .. } if plugin == "broken"));
}

#[test]
fn environment_check_aggregates_and_prefixes_by_alias() {
    let log = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let mut host = PluginHost::new();
    host.load_plugin(
        "net",
        Box::new(RecordingPlugin {
            name: "net".into(),
            env_problems: vec!["port in use".into()],
            log: std::sync::Arc::clone(&log),
            fail_setup: false,
        }),
    )
    .unwrap();
    let report = host.check_environment();
    assert_eq!(report, vec!["net: port in use".to_string()]);
}

#[test]
fn clear_without_teardown_drops_plugins_silently() {
    let log = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let mut host = PluginHost::new();
    host.load_plugin("a", plugin("a", &log)).unwrap();
    host.clear_without_teardown();
    assert!(host.is_empty());
    assert!(log.lock().unwrap().is_empty());
}

struct FakeLock {
    held_by_other: bool,
}

impl Plugin for FakeLock {
    fn name(&self) -> &str {
        "lock"
    }
    fn setup(&mut self) -> Result<(), PluginError> {
        self.acquire()
    }
    fn teardown(&mut self) -> Result<(), PluginError> {
        Ok(())
    }
    fn as_lock_plugin(&mut self) -> Option<&mut dyn LockPlugin> {
        Some(self)
    }
}

impl LockPlugin for FakeLock {
    fn acquire(&mut self) -> Result<(), PluginError> {
        if self.held_by_other {
            Err(PluginError::LockHeld)
        } else {
            Ok(())
        }
    }
    fn is_held_by_other(&self) -> bool {
        self.held_by_other
    }
}

#[test]
fn lock_plugin_mut_finds_the_lock_plugin_among_others() {
    let log = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let mut host = PluginHost::new();
    host.load_plugin("a", plugin("a", &log)).unwrap();
    host.load_plugin(
        "lock",
        Box::new(FakeLock {
            held_by_other: true,
        }),
    )
    .unwrap();
    let lock = host.lock_plugin_mut().expect("lock plugin present");
    assert!(lock.is_held_by_other());
}
