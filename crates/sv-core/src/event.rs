// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed-event registration and dispatch.
//!
//! Built-in events are a closed, tagged enum (`EventKind`); user-defined
//! events live in a distinct string-keyed variant, so there is no reserved
//! numeric range for an application's own event names to collide with.

use std::panic::{self, AssertUnwindSafe, Location};

use tracing::error;

/// Built-in events dispatched by the supervisor, plus an escape hatch for
/// application-defined events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A fatal or recoverable error occurred.
    Error,
    /// A captured OS signal arrived.
    Signal,
    /// The supervisor finished plugin setup and is entering the run loop.
    Init,
    /// Fired once per run-loop iteration, before `execute()`.
    Run,
    /// A child process was forked via the Fork Primitive.
    Fork,
    /// The process acquired a new pid (after `-d` detach or a fork).
    NewPid,
    /// A restart has been triggered and is about to proceed.
    Restart,
    /// The run loop is exiting normally.
    Shutdown,
    /// An application-defined event, keyed by name.
    User(String),
}

/// Argument passed to a listener on dispatch.
#[derive(Debug, Clone)]
pub enum EventPayload {
    None,
    /// Signal number, for `EventKind::Signal`.
    Signal(i32),
    /// Human-readable message, for `EventKind::Error` and similar.
    Message(String),
    /// A process pid, for `EventKind::NewPid`.
    Pid(u32),
}

type Callback = Box<dyn Fn(&EventPayload) + Send + Sync>;

struct ListenerEntry {
    callback: Callback,
    registered_at: &'static Location<'static>,
}

/// Opaque handle returned by [`EventBus::on`]; pass back to [`EventBus::off`]
/// or [`EventBus::dispatch_one`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerHandle {
    pub event: EventKind,
    pub slot: usize,
}

/// Registers listeners per event and dispatches to them in insertion order.
///
/// No listener failure (panic) escapes `dispatch`; it is caught, logged at
/// ERROR with the event, slot id, message, and registration location, and
/// dispatch continues with the remaining listeners.
#[derive(Default)]
pub struct EventBus {
    listeners: std::collections::HashMap<EventKind, Vec<Option<ListenerEntry>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` at the end of `event`'s listener list.
    #[track_caller]
    pub fn on(
        &mut self,
        event: EventKind,
        callback: impl Fn(&EventPayload) + Send + Sync + 'static,
    ) -> ListenerHandle {
        let registered_at = Location::caller();
        let slots = self.listeners.entry(event.clone()).or_default();
        let slot = slots.len();
        slots.push(Some(ListenerEntry {
            callback: Box::new(callback),
            registered_at,
        }));
        ListenerHandle { event, slot }
    }

    /// Removes and returns the listener at `handle`, or `None` if the handle
    /// is stale (already removed, or never registered).
    pub fn off(&mut self, handle: &ListenerHandle) -> bool {
        self.listeners
            .get_mut(&handle.event)
            .and_then(|slots| slots.get_mut(handle.slot))
            .map(|slot| slot.take().is_some())
            .unwrap_or(false)
    }

    /// Invokes every registered listener for `event` in registration order.
    /// Listener panics are caught and logged; dispatch continues regardless.
    pub fn dispatch(&self, event: EventKind, payload: &EventPayload) {
        let Some(slots) = self.listeners.get(&event) else {
            return;
        };
        for (slot, entry) in slots.iter().enumerate() {
            let Some(entry) = entry else { continue };
            invoke_guarded(&event, slot, entry, payload);
        }
    }

    /// Invokes exactly the listener named by `handle`, if it still exists.
    pub fn dispatch_one(&self, handle: &ListenerHandle, payload: &EventPayload) {
        let Some(entry) = self
            .listeners
            .get(&handle.event)
            .and_then(|slots| slots.get(handle.slot))
            .and_then(|slot| slot.as_ref())
        else {
            return;
        };
        invoke_guarded(&handle.event, handle.slot, entry, payload);
    }

    /// Number of live (not-yet-removed) listeners registered for `event`.
    pub fn listener_count(&self, event: &EventKind) -> usize {
        self.listeners
            .get(event)
            .map(|slots| slots.iter().filter(|s| s.is_some()).count())
            .unwrap_or(0)
    }
}

fn invoke_guarded(event: &EventKind, slot: usize, entry: &ListenerEntry, payload: &EventPayload) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| (entry.callback)(payload)));
    if let Err(panic) = result {
        let message = panic_message(&panic);
        error!(
            event = ?event,
            slot,
            registered_at = %entry.registered_at,
            "listener failed: {message}"
        );
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "listener panicked with a non-string payload".to_string()
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
