// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_CLEANUP_INTERVAL_SECS, DEFAULT_MAX_EVENT_HISTORY, DEFAULT_MAX_TICKS_PER_DRAIN,
    DEFAULT_MAX_VERSIONS_PER_NODE, DEFAULT_TICK_INTERVAL_MS, DEFAULT_VERSION_RETENTION_SECS,
};
use crate::errors::ConfigError;
use crate::mapping::MappingMode;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Engine configuration.
///
/// Every field has a default, so an empty file is a valid configuration.
///
/// # Fields
/// * `max_versions_per_node` - Versions kept per node; oldest evicted first
/// * `max_event_history` - Events kept in the audit history; oldest evicted first
/// * `version_retention_secs` - Age past which the cleanup sweep prunes versions and events
/// * `cleanup_interval_secs` - Period of the background cleanup sweep
/// * `tick_interval_ms` - Period of the background scheduler tick
/// * `mapping_mode` - `lenient` (skip failing rules) or `strict` (abort the transfer)
/// * `max_ticks_per_drain` - Safety bound for `run_until_idle` on cyclic graphs
///
/// # Example
/// ```yaml
/// max_versions_per_node: 20
/// max_event_history: 500
/// version_retention_secs: 7200
/// mapping_mode: strict
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_versions_per_node: usize,
    pub max_event_history: usize,
    pub version_retention_secs: u64,
    pub cleanup_interval_secs: u64,
    pub tick_interval_ms: u64,
    pub mapping_mode: MappingMode,
    pub max_ticks_per_drain: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_versions_per_node: DEFAULT_MAX_VERSIONS_PER_NODE,
            max_event_history: DEFAULT_MAX_EVENT_HISTORY,
            version_retention_secs: DEFAULT_VERSION_RETENTION_SECS,
            cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            mapping_mode: MappingMode::default(),
            max_ticks_per_drain: DEFAULT_MAX_TICKS_PER_DRAIN,
        }
    }
}

impl EngineConfig {
    pub fn version_retention(&self) -> Duration {
        Duration::from_secs(self.version_retention_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        if self.max_versions_per_node == 0 {
            problems.push("max_versions_per_node must be greater than 0");
        }
        if self.max_event_history == 0 {
            problems.push("max_event_history must be greater than 0");
        }
        if self.cleanup_interval_secs == 0 {
            problems.push("cleanup_interval_secs must be greater than 0");
        }
        if self.tick_interval_ms == 0 {
            problems.push("tick_interval_ms must be greater than 0");
        }
        if self.max_ticks_per_drain == 0 {
            problems.push("max_ticks_per_drain must be greater than 0");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems.join("; ")))
        }
    }
}

/// Load a config from a YAML (`.yaml`/`.yml`) or TOML (`.toml`) file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => {
            if content.trim().is_empty() {
                return Ok(EngineConfig::default());
            }
            Ok(serde_yaml::from_str(&content)?)
        }
        Some("toml") => Ok(toml::from_str(&content)?),
        _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Load a config file and check it with [`EngineConfig::validate`]
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let cfg = load_config(path)?;
    cfg.validate()?;
    Ok(cfg)
}
