// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Retention sweep, removal and teardown.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::engine::DataFlowEngine;
use crate::errors::EngineError;
use crate::events::{EngineEvent, EventKind};
use crate::observability::messages::lifecycle::{CleanupCompleted, EngineDisposed};
use crate::observability::messages::store::EntityRemoved;
use crate::observability::messages::StructuredLog;
use crate::store::{Connection, Node};

/// What a cleanup sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub versions_pruned: usize,
    pub events_pruned: usize,
}

impl DataFlowEngine {
    /// Prune versions and history events older than the retention window.
    pub fn cleanup(&mut self) -> CleanupReport {
        self.cleanup_at(Utc::now())
    }

    /// [`cleanup`](Self::cleanup) measured from `now`.
    ///
    /// Each node keeps its newest version regardless of age.
    pub fn cleanup_at(&mut self, now: DateTime<Utc>) -> CleanupReport {
        let retention = self.config.version_retention();
        let cutoff = chrono::Duration::from_std(retention)
            .ok()
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let versions_pruned = self
            .nodes
            .iter_mut()
            .map(|node| node.prune_versions_before(cutoff))
            .sum();
        let events_pruned = self.bus.prune_before(cutoff);

        CleanupCompleted {
            versions_pruned,
            events_pruned,
            retention,
        }
        .log();

        CleanupReport {
            versions_pruned,
            events_pruned,
        }
    }

    /// Drop listeners, nodes, connections, history and queued cascades.
    pub fn dispose(&mut self) {
        EngineDisposed {
            nodes: self.nodes.len(),
            connections: self.connections.len(),
            listeners: self.bus.listener_count(),
        }
        .log();

        self.bus.clear_listeners();
        self.bus.clear_history();
        self.queue.clear();
        self.connections.clear();
        self.nodes.clear();
        self.metrics.reset();
    }

    /// Remove a connection. Cascades already queued for it are skipped.
    pub fn remove_connection(&mut self, id: &str) -> Result<Connection, EngineError> {
        let connection = self
            .connections
            .remove(id)
            .ok_or_else(|| EngineError::connection_not_found(id))?;

        let still_linked = self
            .connections
            .iter()
            .any(|c| c.source_id == connection.source_id && c.target_id == connection.target_id);
        if !still_linked {
            if let Some(source) = self.nodes.get_mut(&connection.source_id) {
                source.remove_output(&connection.target_id);
            }
        }

        EntityRemoved {
            entity: "connection",
            id,
            dependent_connections: 0,
        }
        .log();
        self.bus.emit(
            EngineEvent::new(EventKind::ConnectionRemoved, id).with_payload(json!({
                "sourceId": connection.source_id,
                "targetId": connection.target_id,
            })),
        );
        Ok(connection)
    }

    /// Remove a node together with every connection that touches it.
    pub fn remove_node(&mut self, id: &str) -> Result<Node, EngineError> {
        self.nodes.require(id)?;

        let touching = self.connections.touching(id);
        for connection_id in &touching {
            self.remove_connection(connection_id)?;
        }
        let node = self
            .nodes
            .remove(id)
            .ok_or_else(|| EngineError::node_not_found(id))?;

        EntityRemoved {
            entity: "node",
            id,
            dependent_connections: touching.len(),
        }
        .log();
        self.bus.emit(
            EngineEvent::new(EventKind::NodeRemoved, id)
                .with_payload(json!({ "removedConnections": touching })),
        );
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::payload::NodeKind;
    use crate::store::TransferPolicy;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn linked() -> DataFlowEngine {
        let mut engine = DataFlowEngine::default();
        for (id, kind) in [
            ("geo", NodeKind::Geometry),
            ("mesh", NodeKind::Mesh),
            ("solver", NodeKind::Computation),
        ] {
            engine.create_node(id, kind, id, None, vec![]).unwrap();
        }
        engine
            .create_connection("geo_to_mesh", "geo", "mesh", TransferPolicy::default(), vec![])
            .unwrap();
        engine
            .create_connection("mesh_to_solver", "mesh", "solver", TransferPolicy::default(), vec![])
            .unwrap();
        engine
    }

    #[test]
    fn test_cleanup_keeps_newest_version_per_node() {
        let mut engine = DataFlowEngine::new(EngineConfig {
            version_retention_secs: 60,
            ..EngineConfig::default()
        })
        .unwrap();
        engine
            .create_node("geo", NodeKind::Geometry, "Geometry", None, vec![])
            .unwrap();
        for i in 0..3 {
            engine.update_node_data("geo", json!({ "i": i }), None).unwrap();
        }
        let newest = engine.node("geo").unwrap().current_version().unwrap().id().to_string();

        let report = engine.cleanup_at(Utc::now() + chrono::Duration::hours(1));

        assert_eq!(report.versions_pruned, 2);
        assert!(report.events_pruned > 0);
        let node = engine.node("geo").unwrap();
        assert_eq!(node.versions().len(), 1);
        assert_eq!(node.current_version().unwrap().id(), newest);
        assert!(engine.event_history(None).is_empty());
    }

    #[test]
    fn test_cleanup_within_window_prunes_nothing() {
        let mut engine = DataFlowEngine::default();
        engine
            .create_node("geo", NodeKind::Geometry, "Geometry", Some(json!({})), vec![])
            .unwrap();
        engine.update_node_data("geo", json!({"a": 1}), None).unwrap();

        assert_eq!(engine.cleanup(), CleanupReport::default());
        assert_eq!(engine.node("geo").unwrap().versions().len(), 2);
    }

    #[test]
    fn test_remove_connection_drops_queued_cascade() {
        let mut engine = linked();
        engine
            .update_node_data("geo", json!({"nodes": [], "elements": []}), None)
            .unwrap();
        let removed = engine.remove_connection("geo_to_mesh").unwrap();
        assert_eq!(removed.target_id, "mesh");
        assert!(engine.node("geo").unwrap().metadata.outputs.is_empty());

        let summary = engine.tick();
        assert_eq!(summary.skipped, 1);
        assert!(!engine.node("mesh").unwrap().has_data());
        assert!(engine.remove_connection("geo_to_mesh").unwrap_err().is_not_found());
    }

    #[test]
    fn test_remove_node_removes_touching_connections() {
        let mut engine = linked();
        let node = engine.remove_node("mesh").unwrap();
        assert_eq!(node.id, "mesh");

        assert!(engine.node("mesh").is_none());
        assert_eq!(engine.connections().count(), 0);
        assert!(engine.node("geo").unwrap().metadata.outputs.is_empty());

        let last = engine.event_history(Some(1)).pop().unwrap();
        assert_eq!(last.kind, EventKind::NodeRemoved);
        assert_eq!(
            last.payload.unwrap()["removedConnections"],
            json!(["geo_to_mesh", "mesh_to_solver"])
        );
    }

    #[test]
    fn test_dispose_clears_everything() {
        let mut engine = linked();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        engine.on(EventKind::NodeCreated, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        engine
            .update_node_data("geo", json!({"nodes": [], "elements": []}), None)
            .unwrap();
        engine.run_until_idle();

        engine.dispose();

        assert_eq!(engine.nodes().count(), 0);
        assert_eq!(engine.connections().count(), 0);
        assert_eq!(engine.pending_cascades(), 0);
        assert_eq!(engine.performance_metrics().total_transfers, 0);

        engine
            .create_node("again", NodeKind::Geometry, "Again", None, vec![])
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(engine.event_history(None).len(), 1);
    }
}
