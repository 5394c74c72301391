// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed view over stage payloads.
//!
//! Nodes store their payload as plain JSON so producers can hand the engine
//! whatever structured data they have. When the engine needs to inspect a
//! payload (validation before a transfer, default mapping between stages) it
//! parses it into [`StagePayload`], a tagged union keyed by [`NodeKind`].
//!
//! Only the fields the engine understands are typed. Everything else rides
//! along in a flattened `extra` map and survives the round trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::errors::ValidationError;

/// Pipeline stage a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Geometry,
    Mesh,
    Computation,
    Results,
    Visualization,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Geometry => "geometry",
            NodeKind::Mesh => "mesh",
            NodeKind::Computation => "computation",
            NodeKind::Results => "results",
            NodeKind::Visualization => "visualization",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geometry produced by a modelling tool: nodes and elements are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryData {
    pub nodes: Vec<Value>,
    pub elements: Vec<Value>,
    #[serde(default)]
    pub materials: Vec<Value>,
    #[serde(default)]
    pub boundary_conditions: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Discretised mesh handed to the solver stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshData {
    pub nodes: Vec<Value>,
    pub elements: Vec<Value>,
    #[serde(default)]
    pub materials: Vec<Value>,
    #[serde(default)]
    pub boundary_conditions: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Solver settings attached to a computation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverSettings {
    pub solver: String,
    pub max_iterations: u32,
    pub tolerance: f64,
    pub time_steps: u32,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            solver: "linear_static".to_string(),
            max_iterations: 100,
            tolerance: 1e-6,
            time_steps: 1,
        }
    }
}

/// Input for a computation: `params` must be an object, `mesh` is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputationParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<Value>,
    pub params: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stage payload, tagged by the kind of node that holds it.
///
/// Results and visualization payloads are not structurally constrained.
#[derive(Debug, Clone, PartialEq)]
pub enum StagePayload {
    Geometry(GeometryData),
    Mesh(MeshData),
    Computation(ComputationParams),
    Results(Value),
    Visualization(Value),
}

impl StagePayload {
    /// Parse a raw payload as the given kind, checking the fields that kind requires.
    pub fn parse(kind: NodeKind, data: &Value) -> Result<Self, ValidationError> {
        let invalid = |reason: String| ValidationError { kind, reason };

        if !data.is_object() {
            return match kind {
                NodeKind::Results => Ok(StagePayload::Results(data.clone())),
                NodeKind::Visualization => Ok(StagePayload::Visualization(data.clone())),
                _ => Err(invalid(format!("expected an object, got {}", json_type(data)))),
            };
        }

        match kind {
            NodeKind::Geometry => {
                require_array(data, "nodes").map_err(invalid)?;
                require_array(data, "elements").map_err(invalid)?;
                serde_json::from_value(data.clone())
                    .map(StagePayload::Geometry)
                    .map_err(|e| invalid(e.to_string()))
            }
            NodeKind::Mesh => {
                require_array(data, "nodes").map_err(invalid)?;
                require_array(data, "elements").map_err(invalid)?;
                serde_json::from_value(data.clone())
                    .map(StagePayload::Mesh)
                    .map_err(|e| invalid(e.to_string()))
            }
            NodeKind::Computation => {
                match data.get("params") {
                    Some(Value::Object(_)) => {}
                    Some(other) => {
                        return Err(invalid(format!(
                            "'params' must be an object, got {}",
                            json_type(other)
                        )))
                    }
                    None => return Err(invalid("missing required field 'params'".to_string())),
                }
                serde_json::from_value(data.clone())
                    .map(StagePayload::Computation)
                    .map_err(|e| invalid(e.to_string()))
            }
            NodeKind::Results => Ok(StagePayload::Results(data.clone())),
            NodeKind::Visualization => Ok(StagePayload::Visualization(data.clone())),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            StagePayload::Geometry(_) => NodeKind::Geometry,
            StagePayload::Mesh(_) => NodeKind::Mesh,
            StagePayload::Computation(_) => NodeKind::Computation,
            StagePayload::Results(_) => NodeKind::Results,
            StagePayload::Visualization(_) => NodeKind::Visualization,
        }
    }

    pub fn into_value(self) -> Result<Value, serde_json::Error> {
        match self {
            StagePayload::Geometry(g) => serde_json::to_value(g),
            StagePayload::Mesh(m) => serde_json::to_value(m),
            StagePayload::Computation(c) => serde_json::to_value(c),
            StagePayload::Results(v) | StagePayload::Visualization(v) => Ok(v),
        }
    }
}

fn require_array(data: &Value, field: &str) -> Result<(), String> {
    match data.get(field) {
        Some(Value::Array(_)) => Ok(()),
        Some(other) => Err(format!(
            "'{}' must be an array, got {}",
            field,
            json_type(other)
        )),
        None => Err(format!("missing required field '{}'", field)),
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Recursively drop `null` values from objects and arrays.
pub fn strip_nulls(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .filter(|v| !v.is_null())
                .map(strip_nulls)
                .collect(),
        ),
        other => other.clone(),
    }
}
