// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! One handoff of data between two nodes.
//!
//! A transfer resolves its connection, validates the source payload against
//! its stage kind, maps it (explicit rules or the default mapper for the kind
//! pair), optionally strips nulls, and commits the result as a new version of
//! the target. Any failure after resolution leaves the target's payload and
//! versions untouched and puts both the connection and the target in `error`.

use std::time::{Duration, Instant};

use serde_json::{json, Value};

use crate::engine::DataFlowEngine;
use crate::errors::{EngineError, MappingError, TransferError};
use crate::events::{EngineEvent, EventKind};
use crate::mapping::{map_default, DefaultMapper, MappingRule};
use crate::observability::messages::transfer::{
    TransferCompleted, TransferFailed, TransferStarted,
};
use crate::observability::messages::StructuredLog;
use crate::payload::{strip_nulls, NodeKind, StagePayload};
use crate::store::{ConnectionStatus, NodeStatus, TransferPolicy, Version, AUTHOR_SYSTEM};

/// How the target payload was produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferMapper {
    /// Explicit mapping rules; `skipped` lists rules dropped in lenient mode.
    Rules { skipped: Vec<MappingError> },
    Default(DefaultMapper),
}

impl TransferMapper {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferMapper::Rules { .. } => "rules",
            TransferMapper::Default(mapper) => mapper.as_str(),
        }
    }
}

/// Outcome of a successful transfer.
#[derive(Debug, Clone)]
pub struct TransferReport {
    pub connection_id: String,
    pub source_id: String,
    pub target_id: String,
    /// Version committed on the target.
    pub version: Version,
    pub size: usize,
    pub duration: Duration,
    pub mapper: TransferMapper,
}

/// Everything a transfer needs from the store, copied out before mutation.
struct TransferPlan {
    source_id: String,
    target_id: String,
    source_kind: NodeKind,
    source_name: String,
    source_data: Value,
    target_kind: NodeKind,
    policy: TransferPolicy,
    rules: Vec<MappingRule>,
    /// Connection was switched off; it stays `Inactive` whatever the outcome.
    inactive: bool,
}

impl TransferPlan {
    fn settled(&self, status: ConnectionStatus) -> ConnectionStatus {
        if self.inactive {
            ConnectionStatus::Inactive
        } else {
            status
        }
    }
}

impl DataFlowEngine {
    /// Run one transfer over `connection_id` now.
    ///
    /// Direct calls are never retried; the caller gets the error. Cascades
    /// out of the target are queued for the next tick.
    pub fn transfer_data(&mut self, connection_id: &str) -> Result<TransferReport, TransferError> {
        self.run_transfer(connection_id, false)
    }

    pub(crate) fn run_transfer(
        &mut self,
        connection_id: &str,
        cascaded: bool,
    ) -> Result<TransferReport, TransferError> {
        let started = Instant::now();
        let plan = self.plan_transfer(connection_id).map_err(|error| {
            TransferFailed {
                connection_id,
                cascaded,
                error: &error,
            }
            .log();
            error
        })?;

        let message = TransferStarted {
            connection_id,
            source_id: &plan.source_id,
            target_id: &plan.target_id,
            cascaded,
        };
        message.log();
        let span = message.span("transfer_data");
        let _enter = span.enter();

        self.bus.emit(
            EngineEvent::new(EventKind::TransferStarted, connection_id).with_payload(json!({
                "sourceId": plan.source_id,
                "targetId": plan.target_id,
            })),
        );
        if let Some(connection) = self.connections.get_mut(connection_id) {
            connection.status = ConnectionStatus::Transferring;
        }
        if let Some(target) = self.nodes.get_mut(&plan.target_id) {
            target.status = NodeStatus::Processing;
        }

        let (mapped, mapper) = match self.map_payload(connection_id, &plan) {
            Ok(result) => result,
            Err(error) => return Err(self.fail_transfer(connection_id, &plan, cascaded, error)),
        };

        let version = Version::new(
            &mapped,
            format!("Transferred from {}", plan.source_name),
            AUTHOR_SYSTEM,
        );
        let cap = self.config.max_versions_per_node;
        let version = match self.nodes.get_mut(&plan.target_id) {
            Some(target) => target.commit(mapped, version, cap).clone(),
            None => {
                let error = TransferError::NotFound {
                    connection_id: connection_id.to_string(),
                    source: EngineError::node_not_found(&plan.target_id),
                };
                return Err(self.fail_transfer(connection_id, &plan, cascaded, error));
            }
        };

        if let Some(connection) = self.connections.get_mut(connection_id) {
            let status = plan.settled(ConnectionStatus::Active);
            connection.record_transfer(version.timestamp(), status);
        }

        let duration = started.elapsed();
        let size = version.size();
        self.metrics.record_success(duration, size);

        self.emit_version_created(&plan.target_id, &version);
        self.bus.emit(
            EngineEvent::new(EventKind::TransferCompleted, connection_id).with_payload(json!({
                "sourceId": plan.source_id,
                "targetId": plan.target_id,
                "durationMs": duration.as_secs_f64() * 1000.0,
                "size": size,
                "versionId": version.id(),
            })),
        );
        TransferCompleted {
            connection_id,
            mapper: mapper.as_str(),
            size,
            duration,
        }
        .log();

        self.schedule_cascades(&plan.target_id, Some(connection_id));

        Ok(TransferReport {
            connection_id: connection_id.to_string(),
            source_id: plan.source_id,
            target_id: plan.target_id,
            version,
            size,
            duration,
            mapper,
        })
    }

    fn plan_transfer(&self, connection_id: &str) -> Result<TransferPlan, TransferError> {
        let not_found = |source: EngineError| TransferError::NotFound {
            connection_id: connection_id.to_string(),
            source,
        };

        let connection = self
            .connections
            .get(connection_id)
            .ok_or_else(|| not_found(EngineError::connection_not_found(connection_id)))?;
        let source = self.nodes.require(&connection.source_id).map_err(not_found)?;
        let target = self.nodes.require(&connection.target_id).map_err(not_found)?;

        Ok(TransferPlan {
            source_id: source.id.clone(),
            target_id: target.id.clone(),
            source_kind: source.kind,
            source_name: source.name.clone(),
            source_data: source.data.clone(),
            target_kind: target.kind,
            policy: connection.policy.clone(),
            rules: connection.rules.clone(),
            inactive: connection.status == ConnectionStatus::Inactive,
        })
    }

    fn map_payload(
        &self,
        connection_id: &str,
        plan: &TransferPlan,
    ) -> Result<(Value, TransferMapper), TransferError> {
        if plan.policy.validation {
            StagePayload::parse(plan.source_kind, &plan.source_data).map_err(|source| {
                TransferError::Validation {
                    connection_id: connection_id.to_string(),
                    source,
                }
            })?;
        }

        let (mut mapped, mapper) = if plan.rules.is_empty() {
            let (value, mapper) =
                map_default(plan.source_kind, &plan.source_data, plan.target_kind).map_err(
                    |source| TransferError::Serialization {
                        connection_id: connection_id.to_string(),
                        source,
                    },
                )?;
            (value, TransferMapper::Default(mapper))
        } else {
            let output = self
                .mapping
                .apply_rules(connection_id, &plan.source_data, &plan.rules)
                .map_err(|source| TransferError::Mapping {
                    connection_id: connection_id.to_string(),
                    source,
                })?;
            (
                output.value,
                TransferMapper::Rules {
                    skipped: output.skipped,
                },
            )
        };

        if plan.policy.compression {
            mapped = strip_nulls(&mapped);
        }
        Ok((mapped, mapper))
    }

    fn fail_transfer(
        &mut self,
        connection_id: &str,
        plan: &TransferPlan,
        cascaded: bool,
        error: TransferError,
    ) -> TransferError {
        if let Some(connection) = self.connections.get_mut(connection_id) {
            connection.status = plan.settled(ConnectionStatus::Error);
        }
        if let Some(target) = self.nodes.get_mut(&plan.target_id) {
            target.status = NodeStatus::Error;
        }
        self.metrics.record_failure();

        self.bus.emit(
            EngineEvent::new(EventKind::Error, connection_id)
                .with_payload(json!({
                    "sourceId": plan.source_id,
                    "targetId": plan.target_id,
                }))
                .with_error(&error),
        );
        TransferFailed {
            connection_id,
            cascaded,
            error: &error,
        }
        .log();
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::mapping::MappingMode;

    fn two_stage(policy: TransferPolicy, rules: Vec<MappingRule>) -> DataFlowEngine {
        let mut engine = DataFlowEngine::default();
        engine
            .create_node("geo", NodeKind::Geometry, "Geometry", None, vec![])
            .unwrap();
        engine
            .create_node("mesh", NodeKind::Mesh, "Mesh", None, vec!["geo".into()])
            .unwrap();
        engine
            .create_connection("geo_to_mesh", "geo", "mesh", policy, rules)
            .unwrap();
        engine
    }

    #[test]
    fn test_transfer_commits_default_mapping() {
        let mut engine = two_stage(TransferPolicy::manual(), vec![]);
        engine
            .update_node_data(
                "geo",
                json!({"nodes": [{"id": 1}], "elements": [{"id": 1, "nodes": [1]}]}),
                None,
            )
            .unwrap();

        let report = engine.transfer_data("geo_to_mesh").unwrap();
        assert_eq!(report.mapper, TransferMapper::Default(DefaultMapper::GeometryToMesh));
        assert_eq!(report.version.author(), "system");
        assert_eq!(report.version.description(), "Transferred from Geometry");

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
        assert_eq!(mesh.status, NodeStatus::Completed);

        let connection = engine.connection("geo_to_mesh").unwrap();
        assert_eq!(connection.status, ConnectionStatus::Active);
        assert_eq!(connection.transfer_count(), 1);
        assert!(connection.last_transfer_at().is_some());
    }

    #[test]
    fn test_transfer_on_unknown_connection_is_not_found() {
        let mut engine = DataFlowEngine::default();
        let err = engine.transfer_data("missing").unwrap_err();
        assert!(matches!(err, TransferError::NotFound { .. }));
        assert_eq!(err.connection_id(), "missing");
        assert_eq!(engine.performance_metrics().failed_transfers, 0);
    }

    #[test]
    fn test_validation_failure_leaves_target_untouched() {
        let mut engine = two_stage(TransferPolicy::manual(), vec![]);
        engine
            .update_node_data("mesh", json!({"nodes": [], "elements": []}), None)
            .unwrap();
        engine
            .update_node_data("geo", json!({"nodes": "not an array"}), None)
            .unwrap();

        let err = engine.transfer_data("geo_to_mesh").unwrap_err();
        assert!(err.is_validation());

        let mesh = engine.node("mesh").unwrap();
        assert_eq!(mesh.data, json!({"nodes": [], "elements": []}));
        assert_eq!(mesh.versions().len(), 1);
        assert_eq!(mesh.status, NodeStatus::Error);
        assert_eq!(
            engine.connection("geo_to_mesh").unwrap().status,
            ConnectionStatus::Error
        );
        assert_eq!(engine.connection("geo_to_mesh").unwrap().transfer_count(), 0);

        let last = engine.event_history(Some(1)).pop().unwrap();
        assert_eq!(last.kind, EventKind::Error);
        assert!(last.error.unwrap().contains("validation"));
    }

    #[test]
    fn test_disabled_validation_copies_unparseable_payload() {
        let policy = TransferPolicy {
            validation: false,
            ..TransferPolicy::manual()
        };
        let mut engine = two_stage(policy, vec![]);
        engine
            .update_node_data("geo", json!({"points": [1, 2]}), None)
            .unwrap();

        let report = engine.transfer_data("geo_to_mesh").unwrap();
        assert_eq!(report.mapper, TransferMapper::Default(DefaultMapper::StructuralCopy));
        assert_eq!(engine.node("mesh").unwrap().data, json!({"points": [1, 2]}));
    }

    #[test]
    fn test_rules_and_compression_shape_the_target() {
        let policy = TransferPolicy {
            compression: true,
            validation: false,
            ..TransferPolicy::manual()
        };
        let rules = vec![
            MappingRule::new("source.count", "summary.count").with_transform("number"),
            MappingRule::new("source.note", "summary.note"),
        ];
        let mut engine = two_stage(policy, rules);
        engine
            .update_node_data("geo", json!({"source": {"count": "12", "note": null}}), None)
            .unwrap();

        let report = engine.transfer_data("geo_to_mesh").unwrap();
        assert_eq!(report.mapper, TransferMapper::Rules { skipped: vec![] });
        assert_eq!(
            engine.node("mesh").unwrap().data,
            json!({"summary": {"count": 12}})
        );
    }

    #[test]
    fn test_strict_mode_aborts_on_failing_rule() {
        let mut engine = DataFlowEngine::new(EngineConfig {
            mapping_mode: MappingMode::Strict,
            ..EngineConfig::default()
        })
        .unwrap();
        engine
            .create_node("a", NodeKind::Results, "A", None, vec![])
            .unwrap();
        engine
            .create_node("b", NodeKind::Visualization, "B", None, vec![])
            .unwrap();
        engine
            .create_connection(
                "a_to_b",
                "a",
                "b",
                TransferPolicy::manual(),
                vec![MappingRule::new("value", "value").with_validation("required")],
            )
            .unwrap();
        engine.update_node_data("a", json!({"other": 1}), None).unwrap();

        let err = engine.transfer_data("a_to_b").unwrap_err();
        assert!(matches!(err, TransferError::Mapping { .. }));
        assert!(engine.node("b").unwrap().versions().is_empty());
        assert_eq!(engine.performance_metrics().failed_transfers, 1);
        assert_eq!(engine.performance_metrics().total_transfers, 0);
    }

    #[test]
    fn test_direct_transfer_keeps_connection_inactive() {
        let mut engine = two_stage(TransferPolicy::default(), vec![]);
        engine.set_connection_active("geo_to_mesh", false).unwrap();
        engine
            .update_node_data("geo", json!({"nodes": [], "elements": []}), None)
            .unwrap();

        engine.transfer_data("geo_to_mesh").unwrap();
        let connection = engine.connection("geo_to_mesh").unwrap();
        assert_eq!(connection.status, ConnectionStatus::Inactive);
        assert_eq!(connection.transfer_count(), 1);

        engine
            .update_node_data("geo", json!({"nodes": [], "elements": []}), None)
            .unwrap();
        assert_eq!(engine.pending_cascades(), 0);

        engine
            .update_node_data("geo", json!({"nodes": "broken"}), None)
            .unwrap();
        assert!(engine.transfer_data("geo_to_mesh").is_err());
        assert_eq!(
            engine.connection("geo_to_mesh").unwrap().status,
            ConnectionStatus::Inactive
        );
        assert_eq!(engine.node("mesh").unwrap().status, NodeStatus::Error);
    }

    #[test]
    fn test_transfer_emits_started_then_completed() {
        let mut engine = two_stage(TransferPolicy::manual(), vec![]);
        engine
            .update_node_data("geo", json!({"nodes": [], "elements": []}), None)
            .unwrap();
        let before = engine.event_history(None).len();

        let report = engine.transfer_data("geo_to_mesh").unwrap();

        let events = engine.event_history(None);
        let kinds: Vec<EventKind> = events[before..].iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::TransferStarted,
                EventKind::VersionCreated,
                EventKind::TransferCompleted
            ]
        );
        let completed = events.last().unwrap().payload.clone().unwrap();
        assert_eq!(completed["size"], json!(report.size));
        assert_eq!(completed["versionId"], json!(report.version.id()));
    }
}
