// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised synchronously by node and connection management.

use std::fmt;
use thiserror::Error;

/// The kind of entity an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Node,
    Connection,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Node => write!(f, "node"),
            EntityKind::Connection => write!(f, "connection"),
        }
    }
}

/// Errors returned directly to the caller of a store operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A node with this id already exists.
    #[error("Node '{0}' already exists")]
    DuplicateNode(String),

    /// A connection with this id already exists.
    #[error("Connection '{0}' already exists")]
    DuplicateConnection(String),

    /// The operation referenced an unknown node or connection.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: EntityKind, id: String },
}

impl EngineError {
    pub fn node_not_found(id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity: EntityKind::Node,
            id: id.into(),
        }
    }

    pub fn connection_not_found(id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity: EntityKind::Connection,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::NotFound { .. })
    }
}
