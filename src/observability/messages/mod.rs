// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Messages are organized by subsystem:
//!
//! * `store` - node and connection lifecycle, version commits
//! * `mapping` - per-rule mapping failures
//! * `transfer` - transfers and cascade scheduling
//! * `lifecycle` - event bus, cleanup sweeps, runtime tasks
//!
//! # Usage Pattern
//!
//! ```rust
//! use stageflow::observability::messages::transfer::TransferStarted;
//!
//! let msg = TransferStarted {
//!     connection_id: "geo_to_mesh",
//!     source_id: "geo",
//!     target_id: "mesh",
//!     cascaded: false,
//! };
//!
//! tracing::info!("{}", msg);
//! ```

pub mod lifecycle;
pub mod mapping;
pub mod store;
pub mod transfer;

use tracing::Span;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: std::fmt::Display {
    /// Emit the message at its level with its fields attached.
    fn log(&self);

    /// Build a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
