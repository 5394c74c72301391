// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the event bus, cleanup sweeps and runtime tasks.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// An event listener returned an error or panicked.
///
/// # Log Level
/// `error!` - The emitting operation carries on regardless
///
/// # Example
/// ```
/// use stageflow::observability::messages::lifecycle::ListenerFailed;
///
/// let msg = ListenerFailed {
///     event: "node_updated",
///     listener_id: 3,
///     reason: "renderer unavailable",
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ListenerFailed<'a> {
    pub event: &'a str,
    pub listener_id: u64,
    pub reason: &'a str,
}

impl Display for ListenerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Listener {} for '{}' failed: {}",
            self.listener_id, self.event, self.reason
        )
    }
}

impl StructuredLog for ListenerFailed<'_> {
    fn log(&self) {
        tracing::error!(
            event = self.event,
            listener_id = self.listener_id,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "listener_failed",
            span_name = name,
            event = self.event,
            listener_id = self.listener_id,
        )
    }
}

/// Retention sweep finished.
///
/// # Log Level
/// `info!` - Periodic housekeeping
///
/// # Example
/// ```
/// use stageflow::observability::messages::lifecycle::CleanupCompleted;
/// use std::time::Duration;
///
/// let msg = CleanupCompleted {
///     versions_pruned: 4,
///     events_pruned: 10,
///     retention: Duration::from_secs(3600),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct CleanupCompleted {
    pub versions_pruned: usize,
    pub events_pruned: usize,
    pub retention: Duration,
}

impl Display for CleanupCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cleanup pruned {} versions and {} events older than {:?}",
            self.versions_pruned, self.events_pruned, self.retention
        )
    }
}

impl StructuredLog for CleanupCompleted {
    fn log(&self) {
        tracing::info!(
            versions_pruned = self.versions_pruned,
            events_pruned = self.events_pruned,
            retention_secs = self.retention.as_secs(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "cleanup",
            span_name = name,
            versions_pruned = self.versions_pruned,
            events_pruned = self.events_pruned,
        )
    }
}

/// Engine torn down.
///
/// # Log Level
/// `info!` - Important operational event
pub struct EngineDisposed {
    pub nodes: usize,
    pub connections: usize,
    pub listeners: usize,
}

impl Display for EngineDisposed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Engine disposed: {} nodes, {} connections, {} listeners released",
            self.nodes, self.connections, self.listeners
        )
    }
}

impl StructuredLog for EngineDisposed {
    fn log(&self) {
        tracing::info!(
            nodes = self.nodes,
            connections = self.connections,
            listeners = self.listeners,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("engine_disposed", span_name = name)
    }
}

/// Background runtime task started or stopped.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RuntimeTaskState<'a> {
    pub task: &'a str,
    pub running: bool,
    pub interval: Duration,
}

impl Display for RuntimeTaskState<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let state = if self.running { "started" } else { "stopped" };
        write!(f, "Runtime task '{}' {} (interval {:?})", self.task, state, self.interval)
    }
}

impl StructuredLog for RuntimeTaskState<'_> {
    fn log(&self) {
        tracing::info!(
            task = self.task,
            running = self.running,
            interval = ?self.interval,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "runtime_task",
            span_name = name,
            task = self.task,
        )
    }
}
