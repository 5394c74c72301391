// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the mapping engine.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A mapping rule failed and its target field was left out.
///
/// # Log Level
/// `warn!` - The transfer continues with a partial payload
///
/// # Example
/// ```
/// use stageflow::errors::MappingError;
/// use stageflow::observability::messages::mapping::MappingRuleFailed;
///
/// let error = MappingError::UnknownTransform("kelvin".to_string());
/// let msg = MappingRuleFailed {
///     connection_id: "mesh_to_solver",
///     source_path: "params.temp",
///     target_path: "solver.temp",
///     error: &error,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct MappingRuleFailed<'a> {
    pub connection_id: &'a str,
    pub source_path: &'a str,
    pub target_path: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for MappingRuleFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Mapping rule {} -> {} on '{}' skipped: {}",
            self.source_path, self.target_path, self.connection_id, self.error
        )
    }
}

impl StructuredLog for MappingRuleFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            connection_id = self.connection_id,
            source_path = self.source_path,
            target_path = self.target_path,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "mapping_rule_failed",
            span_name = name,
            connection_id = self.connection_id,
            source_path = self.source_path,
            target_path = self.target_path,
        )
    }
}
