// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for node and connection lifecycle events.
//!
//! This module contains message types for logging:
//! * Node creation and removal
//! * Version commits on a node
//! * Connection creation and removal

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Node registered with the engine.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use stageflow::observability::messages::store::NodeCreated;
///
/// let msg = NodeCreated {
///     node_id: "geo",
///     kind: "geometry",
///     versioned: false,
/// };
///
/// assert_eq!(msg.to_string(), "Node 'geo' created: kind=geometry, initial_version=false");
/// ```
pub struct NodeCreated<'a> {
    pub node_id: &'a str,
    pub kind: &'a str,
    pub versioned: bool,
}

impl Display for NodeCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' created: kind={}, initial_version={}",
            self.node_id, self.kind, self.versioned
        )
    }
}

impl StructuredLog for NodeCreated<'_> {
    fn log(&self) {
        tracing::info!(
            node_id = self.node_id,
            kind = self.kind,
            versioned = self.versioned,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node_created",
            span_name = name,
            node_id = self.node_id,
            kind = self.kind,
        )
    }
}

/// A new version was appended to a node.
///
/// # Log Level
/// `debug!` - Emitted for every update and transfer
///
/// # Example
/// ```
/// use stageflow::observability::messages::store::VersionCommitted;
///
/// let msg = VersionCommitted {
///     node_id: "mesh",
///     version_id: "5f0c",
///     author: "system",
///     size: 120,
///     retained: 3,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct VersionCommitted<'a> {
    pub node_id: &'a str,
    pub version_id: &'a str,
    pub author: &'a str,
    pub size: usize,
    pub retained: usize,
}

impl Display for VersionCommitted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' committed version {} by {} ({} bytes, {} retained)",
            self.node_id, self.version_id, self.author, self.size, self.retained
        )
    }
}

impl StructuredLog for VersionCommitted<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            version_id = self.version_id,
            author = self.author,
            size = self.size,
            retained = self.retained,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "version_committed",
            span_name = name,
            node_id = self.node_id,
            version_id = self.version_id,
        )
    }
}

/// Connection registered between two existing nodes.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ConnectionCreated<'a> {
    pub connection_id: &'a str,
    pub source_id: &'a str,
    pub target_id: &'a str,
    pub rule_count: usize,
    pub auto_transfer: bool,
}

impl Display for ConnectionCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Connection '{}' created: {} -> {} ({} rules, auto_transfer={})",
            self.connection_id, self.source_id, self.target_id, self.rule_count, self.auto_transfer
        )
    }
}

impl StructuredLog for ConnectionCreated<'_> {
    fn log(&self) {
        tracing::info!(
            connection_id = self.connection_id,
            source_id = self.source_id,
            target_id = self.target_id,
            rule_count = self.rule_count,
            auto_transfer = self.auto_transfer,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "connection_created",
            span_name = name,
            connection_id = self.connection_id,
            source_id = self.source_id,
            target_id = self.target_id,
        )
    }
}

/// Node or connection removed from the engine.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use stageflow::observability::messages::store::EntityRemoved;
///
/// let msg = EntityRemoved {
///     entity: "node",
///     id: "mesh",
///     dependent_connections: 2,
/// };
///
/// assert_eq!(msg.to_string(), "Removed node 'mesh' (2 dependent connections)");
/// ```
pub struct EntityRemoved<'a> {
    pub entity: &'a str,
    pub id: &'a str,
    pub dependent_connections: usize,
}

impl Display for EntityRemoved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Removed {} '{}' ({} dependent connections)",
            self.entity, self.id, self.dependent_connections
        )
    }
}

impl StructuredLog for EntityRemoved<'_> {
    fn log(&self) {
        tracing::info!(
            entity = self.entity,
            id = self.id,
            dependent_connections = self.dependent_connections,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "entity_removed",
            span_name = name,
            entity = self.entity,
            id = self.id,
        )
    }
}
