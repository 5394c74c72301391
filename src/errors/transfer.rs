// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors surfaced through `transfer_data`.

use crate::errors::{EngineError, MappingError};
use crate::payload::NodeKind;
use thiserror::Error;

/// A structural precondition on a source payload did not hold.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid {kind} payload: {reason}")]
pub struct ValidationError {
    pub kind: NodeKind,
    pub reason: String,
}

/// Any failure of one transfer, tagged with the connection it ran on.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Transfer on '{connection_id}' failed: {source}")]
    NotFound {
        connection_id: String,
        #[source]
        source: EngineError,
    },

    #[error("Transfer on '{connection_id}' failed validation: {source}")]
    Validation {
        connection_id: String,
        #[source]
        source: ValidationError,
    },

    #[error("Transfer on '{connection_id}' failed mapping: {source}")]
    Mapping {
        connection_id: String,
        #[source]
        source: MappingError,
    },

    #[error("Transfer on '{connection_id}' could not serialize payload: {source}")]
    Serialization {
        connection_id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl TransferError {
    pub fn connection_id(&self) -> &str {
        match self {
            TransferError::NotFound { connection_id, .. }
            | TransferError::Validation { connection_id, .. }
            | TransferError::Mapping { connection_id, .. }
            | TransferError::Serialization { connection_id, .. } => connection_id,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TransferError::Validation { .. })
    }
}
