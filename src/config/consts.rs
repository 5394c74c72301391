// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default number of versions kept per node
pub const DEFAULT_MAX_VERSIONS_PER_NODE: usize = 10;
/// Default number of events kept in the audit history
pub const DEFAULT_MAX_EVENT_HISTORY: usize = 1000;
/// Default age after which versions and events are swept (1 hour)
pub const DEFAULT_VERSION_RETENTION_SECS: u64 = 3600;
/// Default period of the background cleanup sweep (5 minutes)
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;
/// Default period of the background scheduler tick
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 10;
/// Upper bound on ticks for one `run_until_idle` drain
pub const DEFAULT_MAX_TICKS_PER_DRAIN: usize = 10_000;
