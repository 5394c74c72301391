// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};

use super::{EngineEvent, EventKind};
use crate::observability::messages::{lifecycle::ListenerFailed, StructuredLog};

pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;
pub type Listener = Box<dyn Fn(&EngineEvent) -> Result<(), ListenerError> + Send + Sync>;

/// Handle returned by [`EventBus::on`], used to detach the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub struct EventBus {
    listeners: HashMap<EventKind, Vec<(ListenerId, Listener)>>,
    history: VecDeque<EngineEvent>,
    max_history: usize,
    next_listener: u64,
}

impl EventBus {
    pub fn new(max_history: usize) -> Self {
        Self {
            listeners: HashMap::new(),
            history: VecDeque::with_capacity(max_history.min(1024)),
            max_history,
            next_listener: 0,
        }
    }

    pub fn on<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&EngineEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Detach a listener. Returns false if it was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let mut removed = false;
        for listeners in self.listeners.values_mut() {
            let before = listeners.len();
            listeners.retain(|(lid, _)| *lid != id);
            removed |= listeners.len() != before;
        }
        removed
    }

    /// Record the event, then deliver it to every listener for its kind.
    ///
    /// A listener error or panic is logged and does not stop delivery.
    pub fn emit(&mut self, event: EngineEvent) {
        if self.max_history > 0 {
            while self.history.len() >= self.max_history {
                self.history.pop_front();
            }
            self.history.push_back(event.clone());
        }

        let Some(listeners) = self.listeners.get(&event.kind) else {
            return;
        };

        for (ListenerId(id), listener) in listeners {
            let reason = match catch_unwind(AssertUnwindSafe(|| listener(&event))) {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(panic) => panic_message(panic.as_ref()),
            };
            ListenerFailed {
                event: event.kind.as_str(),
                listener_id: *id,
                reason: &reason,
            }
            .log();
        }
    }

    /// The most recent `limit` events (all if `None`), oldest first.
    pub fn history(&self, limit: Option<usize>) -> Vec<EngineEvent> {
        let skip = limit
            .map(|l| self.history.len().saturating_sub(l))
            .unwrap_or(0);
        self.history.iter().skip(skip).cloned().collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    /// Drop history entries older than `cutoff`.
    pub fn prune_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.history.len();
        self.history.retain(|e| e.timestamp >= cutoff);
        before - self.history.len()
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listener_count", &self.listener_count())
            .field("history_len", &self.history.len())
            .field("max_history", &self.max_history)
            .finish()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}
