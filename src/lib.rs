// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // engine configuration files
pub mod engine;     // data-flow engine, scheduler and tokio host
pub mod errors;     // error handling
pub mod events;     // event bus + bounded history
pub mod mapping;    // mapping rules, transforms, default mappers
pub mod metrics;    // transfer performance aggregates
pub mod observability;
pub mod payload;    // typed stage payloads
pub mod store;      // nodes, versions, connections

pub use engine::{DataFlowEngine, EngineHandle};
