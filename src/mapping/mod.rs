// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Mapping engine: turns one node's payload into the payload for another.
//!
//! A connection either carries explicit [`MappingRule`]s, evaluated one by one
//! into a fresh object, or none, in which case the built-in mapper for the
//! (source kind, target kind) pair runs (see [`defaults`]).

pub mod defaults;
mod path;
mod transforms;

pub use defaults::{map_default, DefaultMapper};
pub use path::{get_path, set_path};
pub use transforms::{TransformFn, TransformRegistry, ValidatorFn, ValidatorRegistry};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::MappingError;
use crate::observability::messages::{mapping::MappingRuleFailed, StructuredLog};

/// How a failing rule affects the rest of the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingMode {
    /// Log the failure and leave the target field out.
    #[default]
    Lenient,
    /// Abort the whole mapping with the first failure.
    Strict,
}

/// One field of a connection's output, built from one field of its input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRule {
    pub source_path: String,
    pub target_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<String>,
}

impl MappingRule {
    pub fn new(source_path: impl Into<String>, target_path: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            target_path: target_path.into(),
            transform: None,
            validation: None,
        }
    }

    pub fn with_transform(mut self, transform: impl Into<String>) -> Self {
        self.transform = Some(transform.into());
        self
    }

    pub fn with_validation(mut self, validation: impl Into<String>) -> Self {
        self.validation = Some(validation.into());
        self
    }
}

/// Result of evaluating a rule list.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutput {
    pub value: Value,
    /// Rules that failed and were left out (lenient mode only).
    pub skipped: Vec<MappingError>,
}

#[derive(Debug, Clone, Default)]
pub struct MappingEngine {
    pub mode: MappingMode,
    transforms: TransformRegistry,
    validators: ValidatorRegistry,
}

impl MappingEngine {
    pub fn new(mode: MappingMode) -> Self {
        Self {
            mode,
            transforms: TransformRegistry::with_builtins(),
            validators: ValidatorRegistry::with_builtins(),
        }
    }

    pub fn transforms_mut(&mut self) -> &mut TransformRegistry {
        &mut self.transforms
    }

    pub fn validators_mut(&mut self) -> &mut ValidatorRegistry {
        &mut self.validators
    }

    /// Evaluate `rules` against `source`, building a new object.
    pub fn apply_rules(
        &self,
        connection_id: &str,
        source: &Value,
        rules: &[MappingRule],
    ) -> Result<RuleOutput, MappingError> {
        let mut output = Map::new();
        let mut skipped = Vec::new();

        for rule in rules {
            if let Err(error) = self.apply_rule(source, rule, &mut output) {
                if self.mode == MappingMode::Strict {
                    return Err(error);
                }
                MappingRuleFailed {
                    connection_id,
                    source_path: &rule.source_path,
                    target_path: &rule.target_path,
                    error: &error,
                }
                .log();
                skipped.push(error);
            }
        }

        Ok(RuleOutput {
            value: Value::Object(output),
            skipped,
        })
    }

    fn apply_rule(
        &self,
        source: &Value,
        rule: &MappingRule,
        output: &mut Map<String, Value>,
    ) -> Result<(), MappingError> {
        let mut value = get_path(source, &rule.source_path).cloned();

        if let Some(name) = &rule.transform {
            let transform = self
                .transforms
                .get(name)
                .ok_or_else(|| MappingError::UnknownTransform(name.clone()))?;
            if let Some(raw) = value.take() {
                value = Some(transform(&raw).map_err(|reason| MappingError::TransformFailed {
                    transform: name.clone(),
                    path: rule.source_path.clone(),
                    reason,
                })?);
            }
        }

        if let Some(name) = &rule.validation {
            let validator = self
                .validators
                .get(name)
                .ok_or_else(|| MappingError::UnknownValidator(name.clone()))?;
            validator(value.as_ref()).map_err(|reason| MappingError::ValidationFailed {
                validator: name.clone(),
                path: rule.source_path.clone(),
                reason,
            })?;
        }

        match value {
            Some(v) => set_path(output, &rule.target_path, v),
            None => Ok(()),
        }
    }
}
