// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::version::Version;
use crate::payload::NodeKind;

/// Processing state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Idle,
    Processing,
    Completed,
    Error,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Ids this node declares it depends on. Informational only.
    pub dependencies: Vec<String>,
    /// Targets of connections leaving this node, in creation order.
    pub outputs: Vec<String>,
}

/// One pipeline stage: its current payload and bounded version history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    pub status: NodeStatus,
    pub data: Value,
    versions: Vec<Version>,
    pub metadata: NodeMetadata,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        kind: NodeKind,
        name: impl Into<String>,
        dependencies: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            status: NodeStatus::Idle,
            data: Value::Null,
            versions: Vec::new(),
            metadata: NodeMetadata {
                created_at: now,
                updated_at: now,
                dependencies,
                outputs: Vec::new(),
            },
        }
    }

    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    /// The newest version, always the last one in the history.
    pub fn current_version(&self) -> Option<&Version> {
        self.versions.last()
    }

    pub fn has_data(&self) -> bool {
        !self.data.is_null()
    }

    /// Replace the payload, record a version for it and keep at most `cap` versions.
    pub(crate) fn commit(&mut self, data: Value, version: Version, cap: usize) -> &Version {
        self.data = data;
        self.status = NodeStatus::Completed;
        self.metadata.updated_at = version.timestamp();
        self.versions.push(version);
        if self.versions.len() > cap {
            let excess = self.versions.len() - cap;
            self.versions.drain(..excess);
        }
        // cap is validated > 0, so the vector is non-empty here
        &self.versions[self.versions.len() - 1]
    }

    pub(crate) fn add_output(&mut self, target_id: &str) {
        if !self.metadata.outputs.iter().any(|o| o == target_id) {
            self.metadata.outputs.push(target_id.to_string());
        }
    }

    pub(crate) fn remove_output(&mut self, target_id: &str) {
        self.metadata.outputs.retain(|o| o != target_id);
    }

    /// Drop versions older than `cutoff`, always keeping the newest one.
    pub(crate) fn prune_versions_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        if self.versions.len() <= 1 {
            return 0;
        }
        let newest = self.versions.len() - 1;
        let stale = self.versions[..newest]
            .iter()
            .take_while(|v| v.timestamp() < cutoff)
            .count();
        self.versions.drain(..stale);
        stale
    }
}
