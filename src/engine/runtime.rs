// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Tokio hosting for a [`DataFlowEngine`].
//!
//! [`EngineHandle`] shares one engine behind an async mutex and can spawn
//! two background tasks: a scheduler that ticks the cascade queue and a
//! periodic retention sweep. Both stop when [`EngineHandle::shutdown`] is
//! called. Every mutation still happens under the one lock, so the engine
//! keeps a single writer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::engine::DataFlowEngine;
use crate::observability::messages::lifecycle::RuntimeTaskState;
use crate::observability::messages::StructuredLog;

const SCHEDULER_TASK: &str = "scheduler";
const CLEANUP_TASK: &str = "cleanup";

#[derive(Clone)]
pub struct EngineHandle {
    inner: Arc<Mutex<DataFlowEngine>>,
    shutdown: CancellationToken,
    tick_interval: Duration,
    cleanup_interval: Duration,
}

impl EngineHandle {
    pub fn new(engine: DataFlowEngine) -> Self {
        let tick_interval = engine.config().tick_interval();
        let cleanup_interval = engine.config().cleanup_interval();
        Self {
            inner: Arc::new(Mutex::new(engine)),
            shutdown: CancellationToken::new(),
            tick_interval,
            cleanup_interval,
        }
    }

    /// Exclusive access to the engine.
    pub async fn lock(&self) -> MutexGuard<'_, DataFlowEngine> {
        self.inner.lock().await
    }

    /// Tick the cascade queue every `tick_interval` until shutdown.
    pub fn spawn_scheduler(&self) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let token = self.shutdown.clone();
        let period = self.tick_interval;

        tokio::spawn(async move {
            RuntimeTaskState {
                task: SCHEDULER_TASK,
                running: true,
                interval: period,
            }
            .log();

            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let mut engine = inner.lock().await;
                        if engine.pending_cascades() > 0 {
                            engine.tick();
                        }
                    }
                }
            }

            RuntimeTaskState {
                task: SCHEDULER_TASK,
                running: false,
                interval: period,
            }
            .log();
        })
    }

    /// Run the retention sweep every `cleanup_interval` until shutdown.
    ///
    /// The first sweep happens one full interval after spawning.
    pub fn spawn_cleanup(&self) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let token = self.shutdown.clone();
        let period = self.cleanup_interval;

        tokio::spawn(async move {
            RuntimeTaskState {
                task: CLEANUP_TASK,
                running: true,
                interval: period,
            }
            .log();

            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        inner.lock().await.cleanup();
                    }
                }
            }

            RuntimeTaskState {
                task: CLEANUP_TASK,
                running: false,
                interval: period,
            }
            .log();
        })
    }

    /// Drain the cascade queue from the calling task, one lock per tick.
    ///
    /// Other tasks can take the lock between ticks. Stops after
    /// `max_ticks_per_drain` ticks like [`DataFlowEngine::run_until_idle`].
    pub async fn run_until_idle(&self) -> usize {
        let max_ticks = self.inner.lock().await.config().max_ticks_per_drain;
        let mut ticks = 0;
        while ticks < max_ticks {
            {
                let mut engine = self.inner.lock().await;
                if engine.pending_cascades() == 0 {
                    break;
                }
                engine.tick();
            }
            ticks += 1;
            tokio::task::yield_now().await;
        }
        ticks
    }

    /// Stop the background tasks spawned from this handle or its clones.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("tick_interval", &self.tick_interval)
            .field("cleanup_interval", &self.cleanup_interval)
            .field("shutdown", &self.shutdown.is_cancelled())
            .finish()
    }
}
