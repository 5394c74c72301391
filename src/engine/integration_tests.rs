// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::EngineConfig;
use crate::engine::DataFlowEngine;
use crate::events::EventKind;
use crate::mapping::MappingRule;
use crate::payload::NodeKind;
use crate::store::{ConnectionStatus, NodeStatus, TransferPolicy};

/// End-to-end scenarios over a full geometry -> results pipeline
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn geometry() -> Value {
        json!({
            "nodes": [{"id": 1}],
            "elements": [{"id": 1, "nodes": [1]}]
        })
    }

    fn pipeline(config: EngineConfig) -> DataFlowEngine {
        let mut engine = DataFlowEngine::new(config).unwrap();
        let stages = [
            ("geo", NodeKind::Geometry, "Geometry"),
            ("mesh", NodeKind::Mesh, "Mesh"),
            ("solver", NodeKind::Computation, "Solver"),
            ("results", NodeKind::Results, "Results"),
        ];
        let mut previous: Option<&str> = None;
        for (id, kind, name) in stages {
            let deps = previous.map(|p| vec![p.to_string()]).unwrap_or_default();
            engine.create_node(id, kind, name, None, deps).unwrap();
            if let Some(source) = previous {
                engine
                    .create_connection(
                        format!("{}_to_{}", source, id),
                        source,
                        id,
                        TransferPolicy::default(),
                        vec![],
                    )
                    .unwrap();
            }
            previous = Some(id);
        }
        engine
    }

    #[test]
    fn test_geometry_update_cascades_to_results() {
        let mut engine = pipeline(EngineConfig::default());
        engine.update_node_data("geo", geometry(), None).unwrap();

        assert_eq!(engine.run_until_idle(), 3);

        let mesh = engine.node("mesh").unwrap();
        assert_eq!(
            mesh.data,
            json!({
                "nodes": [{"id": 1}],
                "elements": [{"id": 1, "nodes": [1]}],
                "materials": [],
                "boundaryConditions": []
            })
        );

        let solver = engine.node("solver").unwrap();
        assert_eq!(solver.data["mesh"], mesh.data);
        assert_eq!(solver.data["params"]["solver"], json!("linear_static"));
        assert_eq!(solver.data["params"]["maxIterations"], json!(100));
        assert_eq!(solver.data["params"]["timeSteps"], json!(1));

        let results = engine.node("results").unwrap();
        assert_eq!(results.data["completed"], json!(true));
        assert_eq!(results.data["computation"]["params"], solver.data["params"]);
        assert!(results.data["timestamp"].is_string());
        assert_eq!(results.status, NodeStatus::Completed);
        assert_eq!(
            results.current_version().unwrap().description(),
            "Transferred from Solver"
        );

        for id in ["geo_to_mesh", "mesh_to_solver", "solver_to_results"] {
            assert_eq!(engine.connection(id).unwrap().transfer_count(), 1);
        }

        let metrics = engine.performance_metrics();
        assert_eq!(metrics.total_transfers, 3);
        assert_eq!(metrics.successful_transfers, 3);
        assert_eq!(metrics.failed_transfers, 0);
        let committed: u64 = ["mesh", "solver", "results"]
            .iter()
            .map(|id| engine.node(id).unwrap().current_version().unwrap().size() as u64)
            .sum();
        assert_eq!(metrics.total_bytes_transferred, committed);
    }

    #[test]
    fn test_each_tick_advances_one_stage() {
        let mut engine = pipeline(EngineConfig::default());
        engine.update_node_data("geo", geometry(), None).unwrap();

        assert!(!engine.node("mesh").unwrap().has_data());
        engine.tick();
        assert!(engine.node("mesh").unwrap().has_data());
        assert!(!engine.node("solver").unwrap().has_data());
        engine.tick();
        assert!(engine.node("solver").unwrap().has_data());
        assert!(!engine.node("results").unwrap().has_data());
        engine.tick();
        assert!(engine.node("results").unwrap().has_data());
        assert_eq!(engine.pending_cascades(), 0);
    }

    #[test]
    fn test_transfers_complete_in_pipeline_order() {
        let mut engine = pipeline(EngineConfig::default());
        engine.update_node_data("geo", geometry(), None).unwrap();
        engine.run_until_idle();

        let completed: Vec<String> = engine
            .event_history(None)
            .into_iter()
            .filter(|e| e.kind == EventKind::TransferCompleted)
            .map(|e| e.subject)
            .collect();
        assert_eq!(
            completed,
            vec!["geo_to_mesh", "mesh_to_solver", "solver_to_results"]
        );
    }

    #[test]
    fn test_invalid_geometry_stops_the_chain() {
        let mut engine = pipeline(EngineConfig::default());
        engine
            .update_node_data("geo", json!({"nodes": 3, "elements": []}), None)
            .unwrap();
        engine.run_until_idle();

        assert_eq!(engine.node("mesh").unwrap().status, NodeStatus::Error);
        assert!(engine.node("mesh").unwrap().versions().is_empty());
        assert_eq!(
            engine.connection("geo_to_mesh").unwrap().status,
            ConnectionStatus::Error
        );
        assert!(!engine.node("solver").unwrap().has_data());

        let metrics = engine.performance_metrics();
        assert_eq!(metrics.total_transfers, 0);
        assert_eq!(metrics.failed_transfers, 1);
    }

    #[test]
    fn test_two_writers_to_one_target_last_created_wins() {
        let mut engine = DataFlowEngine::default();
        engine
            .create_node("source", NodeKind::Results, "Source", None, vec![])
            .unwrap();
        engine
            .create_node("view", NodeKind::Visualization, "View", None, vec![])
            .unwrap();
        engine
            .create_connection(
                "first",
                "source",
                "view",
                TransferPolicy::default(),
                vec![MappingRule::new("a", "value")],
            )
            .unwrap();
        engine
            .create_connection(
                "second",
                "source",
                "view",
                TransferPolicy::default(),
                vec![MappingRule::new("b", "value")],
            )
            .unwrap();
        assert_eq!(engine.node("source").unwrap().metadata.outputs, vec!["view"]);

        engine
            .update_node_data("source", json!({"a": 1, "b": 2}), None)
            .unwrap();
        engine.run_until_idle();

        let view = engine.node("view").unwrap();
        assert_eq!(view.data, json!({"value": 2}));
        assert_eq!(view.versions().len(), 2);
    }

    #[test]
    fn test_failing_listeners_do_not_abort_updates() {
        let mut engine = pipeline(EngineConfig::default());
        let delivered = Arc::new(AtomicUsize::new(0));

        engine.on(EventKind::NodeUpdated, |_| panic!("listener exploded"));
        engine.on(EventKind::NodeUpdated, |_| Err("listener refused".into()));
        let counter = Arc::clone(&delivered);
        engine.on(EventKind::NodeUpdated, move |event| {
            assert_eq!(event.subject, "geo");
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let version = engine.update_node_data("geo", geometry(), None).unwrap();
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
        assert_eq!(
            engine.node("geo").unwrap().current_version().unwrap().id(),
            version.id()
        );

        engine.run_until_idle();
        assert!(engine.node("results").unwrap().has_data());
    }

    #[test]
    fn test_detached_listener_is_not_called() {
        let mut engine = pipeline(EngineConfig::default());
        let delivered = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&delivered);
        let id = engine.on(EventKind::TransferCompleted, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        engine.update_node_data("geo", geometry(), None).unwrap();
        engine.tick();
        assert!(engine.off(id));
        engine.run_until_idle();

        assert_eq!(delivered.load(Ordering::SeqCst), 1);
        assert!(!engine.off(id));
    }

    #[test]
    fn test_nodes_serialize_for_snapshots() {
        let mut engine = pipeline(EngineConfig::default());
        engine.update_node_data("geo", geometry(), None).unwrap();
        engine.run_until_idle();

        let snapshot = serde_json::to_value(engine.node("mesh").unwrap()).unwrap();
        assert_eq!(snapshot["kind"], json!("mesh"));
        assert_eq!(snapshot["status"], json!("completed"));
        assert_eq!(snapshot["metadata"]["dependencies"], json!(["geo"]));
        assert_eq!(snapshot["metadata"]["outputs"], json!(["solver"]));

        let connection = serde_json::to_value(engine.connection("geo_to_mesh").unwrap()).unwrap();
        assert_eq!(connection["transferCount"], json!(1));
        assert_eq!(connection["status"], json!("active"));
    }

    proptest! {
        #[test]
        fn test_version_history_never_exceeds_cap(cap in 1usize..8, updates in 1usize..40) {
            let mut engine = DataFlowEngine::new(EngineConfig {
                max_versions_per_node: cap,
                ..EngineConfig::default()
            })
            .unwrap();
            engine
                .create_node("geo", NodeKind::Geometry, "Geometry", None, vec![])
                .unwrap();

            let mut last = None;
            for i in 0..updates {
                last = Some(engine.update_node_data("geo", json!({ "i": i }), None).unwrap());
                prop_assert!(engine.node("geo").unwrap().versions().len() <= cap);
            }

            let last = last.unwrap();
            let node = engine.node("geo").unwrap();
            prop_assert_eq!(node.versions().len(), updates.min(cap));
            prop_assert_eq!(node.current_version().unwrap().id(), last.id());
        }

        #[test]
        fn test_event_history_never_exceeds_cap(cap in 1usize..20, updates in 0usize..60) {
            let mut engine = DataFlowEngine::new(EngineConfig {
                max_event_history: cap,
                ..EngineConfig::default()
            })
            .unwrap();
            engine
                .create_node("geo", NodeKind::Geometry, "Geometry", None, vec![])
                .unwrap();
            for i in 0..updates {
                engine.update_node_data("geo", json!({ "i": i }), None).unwrap();
            }

            let emitted = 1 + 2 * updates;
            let history = engine.event_history(None);
            prop_assert_eq!(history.len(), emitted.min(cap));
            if updates > 0 {
                prop_assert_eq!(history.last().unwrap().kind, EventKind::NodeUpdated);
            }
        }
    }
}
