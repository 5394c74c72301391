// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Running aggregates over completed transfers.

use serde::Serialize;
use std::time::Duration;

/// Read-only snapshot of transfer performance.
///
/// `total_transfers` and `successful_transfers` both count transfers that
/// reached completion; aborted transfers only show up in `failed_transfers`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub total_transfers: u64,
    pub successful_transfers: u64,
    pub failed_transfers: u64,
    pub total_bytes_transferred: u64,
    pub average_transfer_time_ms: f64,
}

#[derive(Debug, Default)]
pub struct PerformanceTracker {
    metrics: PerformanceMetrics,
}

impl PerformanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, duration: Duration, bytes: usize) {
        let m = &mut self.metrics;
        m.total_transfers += 1;
        m.successful_transfers += 1;
        m.total_bytes_transferred += bytes as u64;

        let n = m.total_transfers as f64;
        let x = duration.as_secs_f64() * 1000.0;
        m.average_transfer_time_ms = (m.average_transfer_time_ms * (n - 1.0) + x) / n;
    }

    pub fn record_failure(&mut self) {
        self.metrics.failed_transfers += 1;
    }

    pub fn snapshot(&self) -> PerformanceMetrics {
        self.metrics
    }

    pub fn reset(&mut self) {
        self.metrics = PerformanceMetrics::default();
    }
}
