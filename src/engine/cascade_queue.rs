// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! FIFO queue of deferred cascade transfers.
//!
//! A transfer never calls the transfers it triggers. It pushes a
//! [`CascadeTask`] per eligible outgoing connection instead, and the scheduler
//! drains the queue one tick at a time. A tick only takes the tasks that were
//! queued before it began, so anything a task enqueues runs on the next tick.
//!
//! # Ordering
//!
//! Tasks run strictly in push order. Two tasks on the same connection never
//! overlap and keep their invocation order. Tasks on different connections
//! targeting the same node resolve last-writer-wins in push order.
//!
//! # Examples
//!
//! ```rust
//! use stageflow::engine::cascade_queue::{CascadeQueue, CascadeTask};
//!
//! let mut queue = CascadeQueue::new();
//! queue.push(CascadeTask::new("geo_to_mesh", "geo"));
//! queue.push(CascadeTask::new("geo_to_preview", "geo"));
//!
//! let batch = queue.take_batch();
//! assert_eq!(batch.len(), 2);
//! assert_eq!(batch[0].connection_id, "geo_to_mesh");
//! assert!(queue.is_empty());
//! ```

use std::collections::VecDeque;

/// One deferred `transfer_data` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeTask {
    pub connection_id: String,
    /// Node whose update caused this task.
    pub origin_node: String,
    /// 0 for the first run; incremented for each retry.
    pub attempt: u32,
}

impl CascadeTask {
    pub fn new(connection_id: impl Into<String>, origin_node: impl Into<String>) -> Self {
        Self {
            connection_id: connection_id.into(),
            origin_node: origin_node.into(),
            attempt: 0,
        }
    }

    /// The same task, one attempt later.
    pub fn retry(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }
}

#[derive(Debug, Default)]
pub struct CascadeQueue {
    tasks: VecDeque<CascadeTask>,
}

impl CascadeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: CascadeTask) {
        self.tasks.push_back(task);
    }

    pub fn extend<I>(&mut self, tasks: I)
    where
        I: IntoIterator<Item = CascadeTask>,
    {
        self.tasks.extend(tasks);
    }

    /// Remove and return everything queued so far, in order.
    pub fn take_batch(&mut self) -> Vec<CascadeTask> {
        self.tasks.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CascadeTask> {
        self.tasks.iter()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}
