// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for transfers and cascade scheduling.
//!
//! This module contains message types for logging:
//! * Transfer lifecycle (start, completion, failure)
//! * Cascade scheduling, retries and skipped tasks
//! * Scheduler tick summaries

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Transfer started on a connection.
///
/// # Log Level
/// `debug!` - Emitted for every transfer
///
/// # Example
/// ```
/// use stageflow::observability::messages::transfer::TransferStarted;
///
/// let msg = TransferStarted {
///     connection_id: "geo_to_mesh",
///     source_id: "geo",
///     target_id: "mesh",
///     cascaded: true,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct TransferStarted<'a> {
    pub connection_id: &'a str,
    pub source_id: &'a str,
    pub target_id: &'a str,
    pub cascaded: bool,
}

impl Display for TransferStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transfer '{}' started: {} -> {} (cascaded={})",
            self.connection_id, self.source_id, self.target_id, self.cascaded
        )
    }
}

impl StructuredLog for TransferStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            connection_id = self.connection_id,
            source_id = self.source_id,
            target_id = self.target_id,
            cascaded = self.cascaded,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "transfer",
            span_name = name,
            connection_id = self.connection_id,
            source_id = self.source_id,
            target_id = self.target_id,
            cascaded = self.cascaded,
        )
    }
}

/// Transfer committed a new version on its target.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use stageflow::observability::messages::transfer::TransferCompleted;
/// use std::time::Duration;
///
/// let msg = TransferCompleted {
///     connection_id: "geo_to_mesh",
///     mapper: "geometry_to_mesh",
///     size: 512,
///     duration: Duration::from_micros(80),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct TransferCompleted<'a> {
    pub connection_id: &'a str,
    pub mapper: &'a str,
    pub size: usize,
    pub duration: Duration,
}

impl Display for TransferCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transfer '{}' completed via {}: {} bytes in {:?}",
            self.connection_id, self.mapper, self.size, self.duration
        )
    }
}

impl StructuredLog for TransferCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            connection_id = self.connection_id,
            mapper = self.mapper,
            size = self.size,
            duration_us = self.duration.as_micros() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "transfer_completed",
            span_name = name,
            connection_id = self.connection_id,
            size = self.size,
            duration = ?self.duration,
        )
    }
}

/// Transfer failed; connection and target are now in `error`.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use stageflow::observability::messages::transfer::TransferFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
/// let msg = TransferFailed {
///     connection_id: "geo_to_mesh",
///     cascaded: false,
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct TransferFailed<'a> {
    pub connection_id: &'a str,
    pub cascaded: bool,
    pub error: &'a dyn std::error::Error,
}

impl Display for TransferFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transfer '{}' failed (cascaded={}): {}",
            self.connection_id, self.cascaded, self.error
        )
    }
}

impl StructuredLog for TransferFailed<'_> {
    fn log(&self) {
        tracing::error!(
            connection_id = self.connection_id,
            cascaded = self.cascaded,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "transfer_failed",
            span_name = name,
            connection_id = self.connection_id,
            error = %self.error,
        )
    }
}

/// Follow-up transfer queued for a later tick.
///
/// # Log Level
/// `debug!` - Scheduling detail
pub struct CascadeScheduled<'a> {
    pub connection_id: &'a str,
    pub origin_node: &'a str,
    pub attempt: u32,
}

impl Display for CascadeScheduled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cascade '{}' scheduled from node '{}' (attempt {})",
            self.connection_id, self.origin_node, self.attempt
        )
    }
}

impl StructuredLog for CascadeScheduled<'_> {
    fn log(&self) {
        tracing::debug!(
            connection_id = self.connection_id,
            origin_node = self.origin_node,
            attempt = self.attempt,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "cascade_scheduled",
            span_name = name,
            connection_id = self.connection_id,
            origin_node = self.origin_node,
        )
    }
}

/// Queued cascade dropped without running.
///
/// # Log Level
/// `debug!` - Expected after removals or status changes
///
/// # Example
/// ```
/// use stageflow::observability::messages::transfer::CascadeSkipped;
///
/// let msg = CascadeSkipped {
///     connection_id: "mesh_to_solver",
///     reason: "connection removed",
/// };
///
/// assert_eq!(msg.to_string(), "Cascade 'mesh_to_solver' skipped: connection removed");
/// ```
pub struct CascadeSkipped<'a> {
    pub connection_id: &'a str,
    pub reason: &'a str,
}

impl Display for CascadeSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cascade '{}' skipped: {}", self.connection_id, self.reason)
    }
}

impl StructuredLog for CascadeSkipped<'_> {
    fn log(&self) {
        tracing::debug!(
            connection_id = self.connection_id,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "cascade_skipped",
            span_name = name,
            connection_id = self.connection_id,
            reason = self.reason,
        )
    }
}

/// A failed cascade will be retried on a later tick.
///
/// # Log Level
/// `warn!` - Degraded but recovering
pub struct CascadeRetryScheduled<'a> {
    pub connection_id: &'a str,
    pub attempt: u32,
    pub max_retries: u32,
}

impl Display for CascadeRetryScheduled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cascade '{}' failed, retry {}/{} scheduled",
            self.connection_id, self.attempt, self.max_retries
        )
    }
}

impl StructuredLog for CascadeRetryScheduled<'_> {
    fn log(&self) {
        tracing::warn!(
            connection_id = self.connection_id,
            attempt = self.attempt,
            max_retries = self.max_retries,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "cascade_retry",
            span_name = name,
            connection_id = self.connection_id,
            attempt = self.attempt,
        )
    }
}

/// One scheduler tick drained.
///
/// # Log Level
/// `trace!` - Very frequent
pub struct TickCompleted {
    pub executed: usize,
    pub failed: usize,
    pub pending: usize,
}

impl Display for TickCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Tick completed: {} executed, {} failed, {} pending",
            self.executed, self.failed, self.pending
        )
    }
}

impl StructuredLog for TickCompleted {
    fn log(&self) {
        tracing::trace!(
            executed = self.executed,
            failed = self.failed,
            pending = self.pending,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "tick",
            span_name = name,
            executed = self.executed,
            pending = self.pending,
        )
    }
}

/// `run_until_idle` hit its tick bound with cascades still queued.
///
/// # Log Level
/// `warn!` - Usually a cyclic connection graph
///
/// # Example
/// ```
/// use stageflow::observability::messages::transfer::DrainIncomplete;
///
/// let msg = DrainIncomplete { ticks: 10_000, pending: 2 };
/// assert_eq!(
///     msg.to_string(),
///     "Drain stopped after 10000 ticks with 2 cascades pending"
/// );
/// ```
pub struct DrainIncomplete {
    pub ticks: usize,
    pub pending: usize,
}

impl Display for DrainIncomplete {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Drain stopped after {} ticks with {} cascades pending",
            self.ticks, self.pending
        )
    }
}

impl StructuredLog for DrainIncomplete {
    fn log(&self) {
        tracing::warn!(ticks = self.ticks, pending = self.pending, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "drain_incomplete",
            span_name = name,
            ticks = self.ticks,
            pending = self.pending,
        )
    }
}
