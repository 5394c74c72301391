// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Deferred cascade execution.
//!
//! Updates and transfers never run follow-up transfers inline. They push
//! [`CascadeTask`]s onto the engine's queue and [`DataFlowEngine::tick`]
//! drains exactly the batch present when it starts.

use crate::engine::cascade_queue::CascadeTask;
use crate::engine::DataFlowEngine;
use crate::observability::messages::transfer::{
    CascadeRetryScheduled, CascadeScheduled, CascadeSkipped, DrainIncomplete, TickCompleted,
};
use crate::observability::messages::StructuredLog;

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub executed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Tasks waiting for the next tick, including retries queued by this one.
    pub pending: usize,
}

impl DataFlowEngine {
    /// Queue a transfer for every cascading connection out of `node_id`,
    /// in connection creation order.
    pub(crate) fn schedule_cascades(&mut self, node_id: &str, exclude: Option<&str>) {
        let tasks: Vec<CascadeTask> = self
            .connections
            .outgoing(node_id)
            .into_iter()
            .filter(|c| c.cascades() && Some(c.id.as_str()) != exclude)
            .map(|c| CascadeTask::new(c.id.as_str(), node_id))
            .collect();

        for task in &tasks {
            CascadeScheduled {
                connection_id: &task.connection_id,
                origin_node: &task.origin_node,
                attempt: task.attempt,
            }
            .log();
        }
        self.queue.extend(tasks);
    }

    /// Number of cascade tasks waiting for a tick.
    pub fn pending_cascades(&self) -> usize {
        self.queue.len()
    }

    /// Run the cascade tasks queued before this call.
    ///
    /// Tasks queued while the tick runs (follow-up cascades and retries) wait
    /// for the next tick. Tasks whose connection was removed or switched off
    /// are dropped. A retry still runs over a connection left in `Error` by
    /// its previous attempt.
    pub fn tick(&mut self) -> TickSummary {
        let mut summary = TickSummary::default();

        for task in self.queue.take_batch() {
            let retry_count = match self.connections.get(&task.connection_id) {
                None => {
                    self.skip(&task, "connection removed", &mut summary);
                    continue;
                }
                Some(connection) => {
                    let eligible =
                        connection.cascades() || (task.attempt > 0 && connection.retryable());
                    if !eligible {
                        self.skip(&task, "connection inactive", &mut summary);
                        continue;
                    }
                    connection.policy.retry_count
                }
            };

            match self.run_transfer(&task.connection_id, true) {
                Ok(_) => summary.executed += 1,
                Err(_) => {
                    summary.failed += 1;
                    if task.attempt < retry_count {
                        let retry = task.retry();
                        CascadeRetryScheduled {
                            connection_id: &retry.connection_id,
                            attempt: retry.attempt,
                            max_retries: retry_count,
                        }
                        .log();
                        self.queue.push(retry);
                    }
                }
            }
        }

        summary.pending = self.queue.len();
        TickCompleted {
            executed: summary.executed,
            failed: summary.failed,
            pending: summary.pending,
        }
        .log();
        summary
    }

    /// Tick until the queue is empty or `max_ticks_per_drain` is reached.
    ///
    /// Returns the number of ticks run.
    pub fn run_until_idle(&mut self) -> usize {
        let max_ticks = self.config.max_ticks_per_drain;
        let mut ticks = 0;
        while !self.queue.is_empty() && ticks < max_ticks {
            self.tick();
            ticks += 1;
        }
        if !self.queue.is_empty() {
            DrainIncomplete {
                ticks,
                pending: self.queue.len(),
            }
            .log();
        }
        ticks
    }

    fn skip(&self, task: &CascadeTask, reason: &str, summary: &mut TickSummary) {
        CascadeSkipped {
            connection_id: &task.connection_id,
            reason,
        }
        .log();
        summary.skipped += 1;
    }
}
