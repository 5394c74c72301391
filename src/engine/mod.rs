// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The data-flow engine and its tokio host.
//!
//! * [`DataFlowEngine`] - nodes, connections, transfers and the cascade scheduler
//! * [`EngineHandle`] - shared handle with background scheduler and cleanup tasks

pub mod cascade_queue;
mod dataflow;
mod lifecycle;
pub mod runtime;
mod scheduler;
mod transfer;
#[cfg(test)]
mod integration_tests;

pub use cascade_queue::{CascadeQueue, CascadeTask};
pub use dataflow::DataFlowEngine;
pub use lifecycle::CleanupReport;
pub use runtime::EngineHandle;
pub use scheduler::TickSummary;
pub use transfer::{TransferMapper, TransferReport};
