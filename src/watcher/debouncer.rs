//! Per-resource debouncing of change events.
//!
//! Editors and build tools often write a file several times in a row. Each
//! resource has its own state: an event moves it to `Pending` with a fresh
//! deadline, and once the deadline passes it returns to `Idle` and is handed
//! out exactly once for rebuilding.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Debounce state of one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebounceState {
    #[default]
    Idle,
    Pending { deadline: Instant },
}

/// Debounces change events by resource name.
#[derive(Debug)]
pub struct Debouncer {
    /// Resources with a pending rebuild. Absent means idle.
    pending: HashMap<String, Instant>,
    /// Quiet period required after the last event.
    delay: Duration,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a change at `now`, resetting the resource's deadline.
    pub fn record(&mut self, name: &str, now: Instant) {
        self.pending.insert(name.to_string(), now + self.delay);
    }

    /// Current state of a resource.
    pub fn state(&self, name: &str) -> DebounceState {
        match self.pending.get(name) {
            Some(&deadline) => DebounceState::Pending { deadline },
            None => DebounceState::Idle,
        }
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Take every resource whose deadline has passed, earliest first.
    ///
    /// Returned resources are back to idle.
    pub fn take_ready(&mut self, now: Instant) -> Vec<String> {
        let mut ready: Vec<(Instant, String)> = Vec::new();

        self.pending.retain(|name, deadline| {
            if *deadline <= now {
                ready.push((*deadline, name.clone()));
                false
            } else {
                true
            }
        });

        ready.sort();
        ready.into_iter().map(|(_, name)| name).collect()
    }
}
