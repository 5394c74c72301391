// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod engine;
mod mapping;
mod transfer;

pub use config::ConfigError;
pub use engine::{EngineError, EntityKind};
pub use mapping::MappingError;
pub use transfer::{TransferError, ValidationError};
