// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mapping::MappingRule;

/// Connection state. `Transferring` is only observable from inside a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Active,
    Inactive,
    Transferring,
    Error,
}

/// How transfers over a connection behave.
///
/// `retry_count` applies to cascaded transfers only; a direct call to
/// `transfer_data` reports its failure immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferPolicy {
    pub auto_transfer: bool,
    pub compression: bool,
    pub validation: bool,
    pub retry_count: u32,
}

impl Default for TransferPolicy {
    fn default() -> Self {
        Self {
            auto_transfer: true,
            compression: false,
            validation: true,
            retry_count: 0,
        }
    }
}

impl TransferPolicy {
    pub fn manual() -> Self {
        Self {
            auto_transfer: false,
            ..Self::default()
        }
    }
}

/// Directed edge from one node to another.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub status: ConnectionStatus,
    pub policy: TransferPolicy,
    pub rules: Vec<MappingRule>,
    transfer_count: u64,
    last_transfer_at: Option<DateTime<Utc>>,
    /// Creation order, used to enqueue a node's outgoing transfers deterministically.
    #[serde(skip)]
    pub(crate) sequence: u64,
}

impl Connection {
    pub(crate) fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        policy: TransferPolicy,
        rules: Vec<MappingRule>,
        sequence: u64,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            status: ConnectionStatus::Active,
            policy,
            rules,
            transfer_count: 0,
            last_transfer_at: None,
            sequence,
        }
    }

    pub fn transfer_count(&self) -> u64 {
        self.transfer_count
    }

    pub fn last_transfer_at(&self) -> Option<DateTime<Utc>> {
        self.last_transfer_at
    }

    /// Whether updates of the source node schedule a transfer over this edge.
    ///
    /// Only `Active` auto-transfer connections qualify. A connection left in
    /// `Error` waits for a retry or a direct `transfer_data` call.
    pub fn cascades(&self) -> bool {
        self.status == ConnectionStatus::Active && self.policy.auto_transfer
    }

    /// Whether a retry task may still run over this edge.
    pub(crate) fn retryable(&self) -> bool {
        self.status != ConnectionStatus::Inactive && self.policy.auto_transfer
    }

    /// Count a completed transfer and settle on `status`.
    pub(crate) fn record_transfer(&mut self, at: DateTime<Utc>, status: ConnectionStatus) {
        self.transfer_count += 1;
        self.last_transfer_at = Some(at);
        self.status = status;
    }
}
