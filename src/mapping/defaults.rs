// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in stage-to-stage mappers used when a connection has no rules.
//!
//! The source payload is parsed into its typed form and the pair
//! (source payload, target kind) picks the mapper. Pairs without a dedicated
//! mapper, and payloads that do not parse as their node's kind, fall back to a
//! structural copy of the raw value.

use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::payload::{ComputationParams, MeshData, NodeKind, SolverSettings, StagePayload};

/// Which built-in mapper handled a transfer. Reported in transfer logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultMapper {
    GeometryToMesh,
    MeshToComputation,
    ComputationToResults,
    StructuralCopy,
}

impl DefaultMapper {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefaultMapper::GeometryToMesh => "geometry_to_mesh",
            DefaultMapper::MeshToComputation => "mesh_to_computation",
            DefaultMapper::ComputationToResults => "computation_to_results",
            DefaultMapper::StructuralCopy => "structural_copy",
        }
    }
}

pub fn map_default(
    source_kind: NodeKind,
    data: &Value,
    target_kind: NodeKind,
) -> Result<(Value, DefaultMapper), serde_json::Error> {
    let payload = match StagePayload::parse(source_kind, data) {
        Ok(payload) => payload,
        Err(_) => return Ok((data.clone(), DefaultMapper::StructuralCopy)),
    };

    match (payload, target_kind) {
        (StagePayload::Geometry(geometry), NodeKind::Mesh) => {
            let mesh = MeshData {
                nodes: geometry.nodes,
                elements: geometry.elements,
                materials: geometry.materials,
                boundary_conditions: geometry.boundary_conditions,
                extra: Map::new(),
            };
            Ok((serde_json::to_value(mesh)?, DefaultMapper::GeometryToMesh))
        }
        (StagePayload::Mesh(mesh), NodeKind::Computation) => {
            let params = match serde_json::to_value(SolverSettings::default())? {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            let computation = ComputationParams {
                mesh: Some(serde_json::to_value(mesh)?),
                params,
                extra: Map::new(),
            };
            Ok((serde_json::to_value(computation)?, DefaultMapper::MeshToComputation))
        }
        (StagePayload::Computation(computation), NodeKind::Results) => Ok((
            json!({
                "computation": serde_json::to_value(computation)?,
                "timestamp": Utc::now().to_rfc3339(),
                "completed": true,
            }),
            DefaultMapper::ComputationToResults,
        )),
        (StagePayload::Geometry(_), _)
        | (StagePayload::Mesh(_), _)
        | (StagePayload::Computation(_), _)
        | (StagePayload::Results(_), _)
        | (StagePayload::Visualization(_), _) => {
            Ok((data.clone(), DefaultMapper::StructuralCopy))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_to_mesh_extracts_known_fields() {
        let geometry = json!({
            "nodes": [{"id": 1}],
            "elements": [{"id": 1, "nodes": [1]}],
            "layerName": "clay",
        });
        let (mesh, mapper) = map_default(NodeKind::Geometry, &geometry, NodeKind::Mesh).unwrap();
        assert_eq!(mapper, DefaultMapper::GeometryToMesh);
        assert_eq!(
            mesh,
            json!({
                "nodes": [{"id": 1}],
                "elements": [{"id": 1, "nodes": [1]}],
                "materials": [],
                "boundaryConditions": [],
            })
        );
    }

    #[test]
    fn test_mesh_to_computation_adds_solver_defaults() {
        let mesh = json!({"nodes": [], "elements": [], "materials": [{"name": "sand"}]});
        let (computation, mapper) =
            map_default(NodeKind::Mesh, &mesh, NodeKind::Computation).unwrap();
        assert_eq!(mapper, DefaultMapper::MeshToComputation);
        assert_eq!(computation["mesh"]["materials"][0]["name"], json!("sand"));
        assert_eq!(computation["params"]["solver"], json!("linear_static"));
        assert_eq!(computation["params"]["maxIterations"], json!(100));
    }

    #[test]
    fn test_computation_to_results_wraps_payload() {
        let computation = json!({"params": {"solver": "cg"}});
        let (results, mapper) =
            map_default(NodeKind::Computation, &computation, NodeKind::Results).unwrap();
        assert_eq!(mapper, DefaultMapper::ComputationToResults);
        assert_eq!(results["completed"], json!(true));
        assert_eq!(results["computation"]["params"]["solver"], json!("cg"));
        assert!(results["timestamp"].is_string());
    }

    #[test]
    fn test_unmatched_pairs_and_invalid_sources_copy() {
        let results = json!({"displacement": [0.1, null]});
        let (copy, mapper) =
            map_default(NodeKind::Results, &results, NodeKind::Visualization).unwrap();
        assert_eq!(mapper, DefaultMapper::StructuralCopy);
        assert_eq!(copy, results);

        let broken_geometry = json!({"nodes": "oops"});
        let (copy, mapper) =
            map_default(NodeKind::Geometry, &broken_geometry, NodeKind::Mesh).unwrap();
        assert_eq!(mapper, DefaultMapper::StructuralCopy);
        assert_eq!(copy, broken_geometry);
    }
}
