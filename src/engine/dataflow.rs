// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The data-flow engine: node and connection management.
//!
//! [`DataFlowEngine`] is an ordinary value owned by the hosting application.
//! All mutation goes through `&mut self`, which is the single-writer rule of
//! the design expressed in the type system. Transfers live in
//! [`super::transfer`], scheduling in [`super::scheduler`] and teardown in
//! [`super::lifecycle`]; they are all `impl DataFlowEngine` blocks.
//!
//! # Examples
//!
//! ```rust
//! use serde_json::json;
//! use stageflow::engine::DataFlowEngine;
//! use stageflow::payload::NodeKind;
//! use stageflow::store::TransferPolicy;
//!
//! let mut engine = DataFlowEngine::default();
//! engine.create_node("geo", NodeKind::Geometry, "Geometry", None, vec![]).unwrap();
//! engine.create_node("mesh", NodeKind::Mesh, "Mesh", None, vec!["geo".to_string()]).unwrap();
//! engine
//!     .create_connection("c1", "geo", "mesh", TransferPolicy::default(), vec![])
//!     .unwrap();
//!
//! engine
//!     .update_node_data("geo", json!({"nodes": [{"id": 1}], "elements": []}), None)
//!     .unwrap();
//! engine.run_until_idle();
//!
//! assert_eq!(engine.node("mesh").unwrap().data["materials"], json!([]));
//! ```

use serde_json::{json, Value};

use crate::config::EngineConfig;
use crate::engine::cascade_queue::CascadeQueue;
use crate::errors::{ConfigError, EngineError};
use crate::events::{EngineEvent, EventBus, EventKind, ListenerError, ListenerId};
use crate::mapping::{MappingEngine, MappingRule};
use crate::metrics::{PerformanceMetrics, PerformanceTracker};
use crate::observability::messages::store::{ConnectionCreated, NodeCreated, VersionCommitted};
use crate::observability::messages::StructuredLog;
use crate::payload::NodeKind;
use crate::store::{
    Connection, ConnectionRegistry, ConnectionStatus, Node, NodeStatus, NodeStore,
    TransferPolicy, Version, AUTHOR_SYSTEM, AUTHOR_USER,
};

const INITIAL_DESCRIPTION: &str = "Initial data";
const UPDATE_DESCRIPTION: &str = "Data updated";

pub struct DataFlowEngine {
    pub(crate) config: EngineConfig,
    pub(crate) nodes: NodeStore,
    pub(crate) connections: ConnectionRegistry,
    pub(crate) mapping: MappingEngine,
    pub(crate) bus: EventBus,
    pub(crate) metrics: PerformanceTracker,
    pub(crate) queue: CascadeQueue,
}

impl DataFlowEngine {
    /// Build an engine from a validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            nodes: NodeStore::new(),
            connections: ConnectionRegistry::new(),
            mapping: MappingEngine::new(config.mapping_mode),
            bus: EventBus::new(config.max_event_history),
            metrics: PerformanceTracker::new(),
            queue: CascadeQueue::new(),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register custom transforms and validators for mapping rules.
    pub fn mapping_mut(&mut self) -> &mut MappingEngine {
        &mut self.mapping
    }

    /// Register a node. An initial payload is recorded as a `system` version.
    pub fn create_node(
        &mut self,
        id: impl Into<String>,
        kind: NodeKind,
        name: impl Into<String>,
        initial_payload: Option<Value>,
        dependencies: Vec<String>,
    ) -> Result<&Node, EngineError> {
        let id = id.into();
        if self.nodes.contains(&id) {
            return Err(EngineError::DuplicateNode(id));
        }

        let mut node = Node::new(id.clone(), kind, name, dependencies);
        let initial_version = initial_payload.map(|payload| {
            let version = Version::new(&payload, INITIAL_DESCRIPTION, AUTHOR_SYSTEM);
            let committed = node
                .commit(payload, version, self.config.max_versions_per_node)
                .clone();
            node.status = NodeStatus::Idle;
            committed
        });

        NodeCreated {
            node_id: &id,
            kind: kind.as_str(),
            versioned: initial_version.is_some(),
        }
        .log();

        self.nodes.insert(node)?;
        self.bus.emit(
            EngineEvent::new(EventKind::NodeCreated, id.clone())
                .with_payload(json!({ "kind": kind.as_str() })),
        );
        if let Some(version) = &initial_version {
            self.emit_version_created(&id, version);
        }

        self.nodes.require(&id)
    }

    /// Replace a node's payload as the `user` author and schedule its cascades.
    pub fn update_node_data(
        &mut self,
        id: &str,
        payload: Value,
        description: Option<&str>,
    ) -> Result<Version, EngineError> {
        self.update_node_data_as(id, payload, description, AUTHOR_USER)
    }

    /// Replace a node's payload on behalf of `author` and schedule its cascades.
    pub fn update_node_data_as(
        &mut self,
        id: &str,
        payload: Value,
        description: Option<&str>,
        author: &str,
    ) -> Result<Version, EngineError> {
        let cap = self.config.max_versions_per_node;
        let node = self.nodes.require_mut(id)?;

        let version = Version::new(
            &payload,
            description.unwrap_or(UPDATE_DESCRIPTION),
            author,
        );
        let committed = node.commit(payload, version, cap).clone();
        let retained = node.versions().len();

        VersionCommitted {
            node_id: id,
            version_id: committed.id(),
            author,
            size: committed.size(),
            retained,
        }
        .log();

        self.emit_version_created(id, &committed);
        self.bus.emit(
            EngineEvent::new(EventKind::NodeUpdated, id).with_payload(json!({
                "versionId": committed.id(),
                "size": committed.size(),
            })),
        );

        self.schedule_cascades(id, None);
        Ok(committed)
    }

    /// Connect two existing nodes. Registers the target among the source's outputs.
    pub fn create_connection(
        &mut self,
        id: impl Into<String>,
        source_id: &str,
        target_id: &str,
        policy: TransferPolicy,
        rules: Vec<MappingRule>,
    ) -> Result<&Connection, EngineError> {
        let id = id.into();
        self.nodes.require(source_id)?;
        self.nodes.require(target_id)?;
        if self.connections.contains(&id) {
            return Err(EngineError::DuplicateConnection(id));
        }

        ConnectionCreated {
            connection_id: &id,
            source_id,
            target_id,
            rule_count: rules.len(),
            auto_transfer: policy.auto_transfer,
        }
        .log();

        let sequence = self.connections.next_sequence();
        self.connections.insert(Connection::new(
            id.clone(),
            source_id,
            target_id,
            policy,
            rules,
            sequence,
        ))?;
        self.nodes.require_mut(source_id)?.add_output(target_id);

        self.bus.emit(
            EngineEvent::new(EventKind::ConnectionCreated, id.clone()).with_payload(json!({
                "sourceId": source_id,
                "targetId": target_id,
            })),
        );

        self.connections
            .get(&id)
            .ok_or_else(|| EngineError::connection_not_found(&id))
    }

    /// Switch a connection between `Active` and `Inactive`.
    ///
    /// Inactive connections are skipped by cascades but can still be driven
    /// with a direct `transfer_data` call.
    pub fn set_connection_active(&mut self, id: &str, active: bool) -> Result<(), EngineError> {
        let connection = self
            .connections
            .get_mut(id)
            .ok_or_else(|| EngineError::connection_not_found(id))?;
        connection.status = if active {
            ConnectionStatus::Active
        } else {
            ConnectionStatus::Inactive
        };
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.connections.get(id)
    }

    /// All connections in creation order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    pub fn performance_metrics(&self) -> PerformanceMetrics {
        self.metrics.snapshot()
    }

    /// The last `limit` events (all retained events if `None`), oldest first.
    pub fn event_history(&self, limit: Option<usize>) -> Vec<EngineEvent> {
        self.bus.history(limit)
    }

    pub fn on<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&EngineEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.bus.on(kind, listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.bus.off(id)
    }

    /// Publish an event to the history and to its listeners.
    pub fn emit(&mut self, event: EngineEvent) {
        self.bus.emit(event);
    }

    pub(crate) fn emit_version_created(&mut self, node_id: &str, version: &Version) {
        self.bus.emit(
            EngineEvent::new(EventKind::VersionCreated, node_id).with_payload(json!({
                "versionId": version.id(),
                "checksum": version.checksum(),
                "size": version.size(),
                "author": version.author(),
            })),
        );
    }
}

impl Default for DataFlowEngine {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            nodes: NodeStore::new(),
            connections: ConnectionRegistry::new(),
            mapping: MappingEngine::new(config.mapping_mode),
            bus: EventBus::new(config.max_event_history),
            metrics: PerformanceTracker::new(),
            queue: CascadeQueue::new(),
            config,
        }
    }
}

impl std::fmt::Debug for DataFlowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataFlowEngine")
            .field("node_count", &self.nodes.len())
            .field("connection_count", &self.connections.len())
            .field("pending_cascades", &self.queue.len())
            .field("bus", &self.bus)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EntityKind;

    fn engine_with_cap(cap: usize) -> DataFlowEngine {
        DataFlowEngine::new(EngineConfig {
            max_versions_per_node: cap,
            ..EngineConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_create_node_without_payload_has_no_versions() {
        let mut engine = DataFlowEngine::default();
        let node = engine
            .create_node("geo", NodeKind::Geometry, "Geometry", None, vec![])
            .unwrap();
        assert!(node.versions().is_empty());
        assert!(node.current_version().is_none());
        assert_eq!(node.status, NodeStatus::Idle);
    }

    #[test]
    fn test_create_node_with_payload_has_one_system_version() {
        let mut engine = DataFlowEngine::default();
        engine
            .create_node(
                "geo",
                NodeKind::Geometry,
                "Geometry",
                Some(json!({"nodes": [], "elements": []})),
                vec![],
            )
            .unwrap();

        let node = engine.node("geo").unwrap();
        assert_eq!(node.versions().len(), 1);
        assert_eq!(node.versions()[0].author(), "system");
        assert_eq!(
            node.current_version().unwrap().id(),
            node.versions().last().unwrap().id()
        );

        let kinds: Vec<EventKind> = engine.event_history(None).iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::NodeCreated, EventKind::VersionCreated]);
    }

    #[test]
    fn test_duplicate_node_is_rejected() {
        let mut engine = DataFlowEngine::default();
        engine
            .create_node("geo", NodeKind::Geometry, "Geometry", None, vec![])
            .unwrap();
        let err = engine
            .create_node("geo", NodeKind::Mesh, "Other", None, vec![])
            .unwrap_err();
        assert_eq!(err, EngineError::DuplicateNode("geo".to_string()));
        assert_eq!(engine.node("geo").unwrap().kind, NodeKind::Geometry);
    }

    #[test]
    fn test_update_unknown_node_is_not_found() {
        let mut engine = DataFlowEngine::default();
        let err = engine.update_node_data("ghost", json!({}), None).unwrap_err();
        assert_eq!(
            err,
            EngineError::NotFound {
                entity: EntityKind::Node,
                id: "ghost".to_string()
            }
        );
    }

    #[test]
    fn test_update_sets_status_and_appends_user_version() {
        let mut engine = DataFlowEngine::default();
        engine
            .create_node("geo", NodeKind::Geometry, "Geometry", None, vec![])
            .unwrap();
        let version = engine
            .update_node_data("geo", json!({"nodes": []}), Some("first cut"))
            .unwrap();

        let node = engine.node("geo").unwrap();
        assert_eq!(node.status, NodeStatus::Completed);
        assert_eq!(node.data, json!({"nodes": []}));
        assert_eq!(version.author(), "user");
        assert_eq!(version.description(), "first cut");
        assert_eq!(node.current_version().unwrap().id(), version.id());
    }

    #[test]
    fn test_same_payload_twice_creates_two_versions() {
        let mut engine = DataFlowEngine::default();
        engine
            .create_node("geo", NodeKind::Geometry, "Geometry", None, vec![])
            .unwrap();
        let payload = json!({"nodes": [1], "elements": [2]});
        let a = engine.update_node_data("geo", payload.clone(), None).unwrap();
        let b = engine.update_node_data("geo", payload, None).unwrap();

        assert_ne!(a.id(), b.id());
        assert_eq!(a.checksum(), b.checksum());
        assert_eq!(engine.node("geo").unwrap().versions().len(), 2);
    }

    #[test]
    fn test_version_cap_holds_after_many_updates() {
        let mut engine = engine_with_cap(4);
        engine
            .create_node("geo", NodeKind::Geometry, "Geometry", Some(json!({})), vec![])
            .unwrap();
        let mut last = None;
        for i in 0..25 {
            last = Some(engine.update_node_data("geo", json!({ "i": i }), None).unwrap());
        }
        let node = engine.node("geo").unwrap();
        assert_eq!(node.versions().len(), 4);
        assert_eq!(node.current_version().unwrap().id(), last.unwrap().id());
    }

    #[test]
    fn test_create_connection_requires_both_endpoints() {
        let mut engine = DataFlowEngine::default();
        engine
            .create_node("geo", NodeKind::Geometry, "Geometry", None, vec![])
            .unwrap();

        let err = engine
            .create_connection("c1", "geo", "mesh", TransferPolicy::default(), vec![])
            .unwrap_err();
        assert!(err.is_not_found());
        let err = engine
            .create_connection("c2", "nowhere", "geo", TransferPolicy::default(), vec![])
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(engine.connections().count(), 0);
        assert!(engine.node("geo").unwrap().metadata.outputs.is_empty());
    }

    #[test]
    fn test_create_connection_registers_output_and_rejects_duplicates() {
        let mut engine = DataFlowEngine::default();
        engine
            .create_node("geo", NodeKind::Geometry, "Geometry", None, vec![])
            .unwrap();
        engine
            .create_node("mesh", NodeKind::Mesh, "Mesh", None, vec![])
            .unwrap();

        let connection = engine
            .create_connection("c1", "geo", "mesh", TransferPolicy::default(), vec![])
            .unwrap();
        assert_eq!(connection.status, ConnectionStatus::Active);
        assert_eq!(connection.transfer_count(), 0);
        assert_eq!(engine.node("geo").unwrap().metadata.outputs, vec!["mesh"]);

        let err = engine
            .create_connection("c1", "mesh", "geo", TransferPolicy::default(), vec![])
            .unwrap_err();
        assert_eq!(err, EngineError::DuplicateConnection("c1".to_string()));
        assert_eq!(engine.connections().count(), 1);
    }

    #[test]
    fn test_listing_preserves_creation_order() {
        let mut engine = DataFlowEngine::default();
        for (id, kind) in [
            ("results", NodeKind::Results),
            ("geo", NodeKind::Geometry),
            ("mesh", NodeKind::Mesh),
        ] {
            engine.create_node(id, kind, id, None, vec![]).unwrap();
        }
        let ids: Vec<&str> = engine.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["results", "geo", "mesh"]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = DataFlowEngine::new(EngineConfig {
            max_event_history: 0,
            ..EngineConfig::default()
        });
        assert!(result.is_err());
    }
}
