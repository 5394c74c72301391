// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for single mapping rules.
//!
//! A `MappingError` belongs to one rule. In lenient mode the engine logs it and
//! omits the target field; in strict mode it aborts the transfer.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    /// The rule names a transform that was never registered.
    #[error("Unknown transform '{0}'")]
    UnknownTransform(String),

    /// The rule names a validator that was never registered.
    #[error("Unknown validator '{0}'")]
    UnknownValidator(String),

    /// The transform could not coerce the value.
    #[error("Transform '{transform}' failed on '{path}': {reason}")]
    TransformFailed {
        transform: String,
        path: String,
        reason: String,
    },

    /// The validation predicate rejected the value.
    #[error("Validation '{validator}' failed on '{path}': {reason}")]
    ValidationFailed {
        validator: String,
        path: String,
        reason: String,
    },

    /// The target path cannot be written (empty segment, or crosses a non-object).
    #[error("Invalid field path '{0}'")]
    InvalidPath(String),
}
