// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plugin lifecycle contract and the ordered plugin registry.
//!
//! A plugin is bound to the supervisor under a named alias. Setup runs
//! in registration order; teardown in
//! reverse. A [`LockPlugin`] is an ordinary [`Plugin`] that also promises
//! at-most-one-live-holder semantics; `Plugin::as_lock_plugin` is the seam
//! the supervisor uses to find it without downcasting trait objects.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("a plugin named '{0}' is already registered")]
    DuplicateAlias(String),
    #[error("plugin '{plugin}' failed {phase}: {message}")]
    Failed {
        plugin: String,
        phase: &'static str,
        message: String,
    },
    #[error("lock held by another instance")]
    LockHeld,
}

/// Capability every plugin must implement: environment check, setup, teardown.
pub trait Plugin: Send {
    /// The alias this plugin is bound to the supervisor under.
    fn name(&self) -> &str;

    /// Returns a list of human-readable problems, empty when the environment
    /// is fit for this plugin to run. Aggregated into the composite
    /// environment-check report.
    fn check_environment(&self) -> Vec<String> {
        Vec::new()
    }

    /// Runs once, in registration order, before `INIT` is dispatched.
    fn setup(&mut self) -> Result<(), PluginError>;

    /// Runs once, in reverse registration order, on normal supervisor teardown.
    fn teardown(&mut self) -> Result<(), PluginError>;

    /// Returns `Some(self)` if this plugin also implements [`LockPlugin`].
    /// Default implementation: not a lock plugin.
    fn as_lock_plugin(&mut self) -> Option<&mut dyn LockPlugin> {
        None
    }
}

/// A plugin specialization that enforces at-most-one live instance per
/// identity.
pub trait LockPlugin: Plugin {
    /// Attempts to claim the singleton token. Runs during plugin setup.
    fn acquire(&mut self) -> Result<(), PluginError>;

    /// Cheap, side-effect-free poll of whether another holder is live.
    fn is_held_by_other(&self) -> bool;
}

/// Ordered registry of installed plugins, keyed by alias.
#[derive(Default)]
pub struct PluginHost {
    plugins: Vec<(String, Box<dyn Plugin>)>,
}

impl PluginHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `plugin` to `alias` and appends it to the registry. Rejects a
    /// duplicate alias rather than silently shadowing the earlier plugin.
    pub fn load_plugin(
        &mut self,
        alias: impl Into<String>,
        plugin: Box<dyn Plugin>,
    ) -> Result<(), PluginError> {
        let alias = alias.into();
        if self.plugins.iter().any(|(name, _)| name == &alias) {
            return Err(PluginError::DuplicateAlias(alias));
        }
        self.plugins.push((alias, plugin));
        Ok(())
    }

    /// Aggregates every plugin's `check_environment()` output, prefixed with
    /// the plugin's alias so the composite report is actionable.
    pub fn check_environment(&self) -> Vec<String> {
        self.plugins
            .iter()
            .flat_map(|(alias, plugin)| {
                plugin
                    .check_environment()
                    .into_iter()
                    .map(move |problem| format!("{alias}: {problem}"))
            })
            .collect()
    }

    /// Runs every plugin's `setup()` in registration order. Stops and
    /// returns the first failure (fatal — this runs before `INIT`).
    pub fn setup_all(&mut self) -> Result<(), PluginError> {
        for (alias, plugin) in &mut self.plugins {
            plugin.setup().map_err(|e| PluginError::Failed {
                plugin: alias.clone(),
                phase: "setup",
                message: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Runs every plugin's `teardown()` in reverse registration order.
    /// Failures are logged by the caller and do not stop the remaining
    /// teardowns — a failing teardown is not fatal.
    pub fn teardown_all(&mut self) -> Vec<PluginError> {
        let mut errors = Vec::new();
        for (alias, plugin) in self.plugins.iter_mut().rev() {
            if let Err(e) = plugin.teardown() {
                errors.push(PluginError::Failed {
                    plugin: alias.clone(),
                    phase: "teardown",
                    message: e.to_string(),
                });
            }
        }
        errors
    }

    /// Drops every plugin without running teardown. Used by the Fork
    /// Primitive's child branch: the child never owns the parent's locks
    /// or file handles, so clearing the registry (not tearing it down) is
    /// what keeps the parent's resources intact.
    pub fn clear_without_teardown(&mut self) {
        self.plugins.clear();
    }

    /// The first installed plugin that is also a [`LockPlugin`], if any.
    pub fn lock_plugin_mut(&mut self) -> Option<&mut dyn LockPlugin> {
        self.plugins
            .iter_mut()
            .find_map(|(_, plugin)| plugin.as_lock_plugin())
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins
            .iter()
            .map(|(alias, _)| alias.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
#[path = "plugin_tests.rs"]
mod tests;
