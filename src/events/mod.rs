// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Event bus and bounded audit history.
//!
//! The engine owns one [`EventBus`]. Every event it emits is appended to the
//! history (oldest evicted past the cap) and then handed synchronously to the
//! listeners registered for that event kind. Listeners only see the event, not
//! the engine, so they cannot re-enter a running operation.

mod bus;

pub use bus::{EventBus, Listener, ListenerError, ListenerId};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NodeCreated,
    NodeUpdated,
    NodeRemoved,
    ConnectionCreated,
    ConnectionRemoved,
    TransferStarted,
    TransferCompleted,
    VersionCreated,
    Error,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::NodeCreated => "node_created",
            EventKind::NodeUpdated => "node_updated",
            EventKind::NodeRemoved => "node_removed",
            EventKind::ConnectionCreated => "connection_created",
            EventKind::ConnectionRemoved => "connection_removed",
            EventKind::TransferStarted => "transfer_started",
            EventKind::TransferCompleted => "transfer_completed",
            EventKind::VersionCreated => "version_created",
            EventKind::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of engine activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineEvent {
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    /// Node or connection id the event is about.
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EngineEvent {
    pub fn new(kind: EventKind, subject: impl Into<String>) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
            subject: subject.into(),
            payload: None,
            error: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}
