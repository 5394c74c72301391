// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic output of the engine goes through the message types in
//! [`messages`]. Each message is a small struct with a `Display`
//! implementation and a [`messages::StructuredLog`] implementation that emits
//! it through `tracing` with structured fields at a fixed level.
//!
//! # Usage
//!
//! ```rust
//! use stageflow::observability::messages::{store::NodeCreated, StructuredLog};
//!
//! NodeCreated {
//!     node_id: "geo",
//!     kind: "geometry",
//!     versioned: true,
//! }
//! .log();
//! ```
//!
//! Installing a subscriber is left to the hosting binary; see `src/main.rs`.

pub mod messages;
