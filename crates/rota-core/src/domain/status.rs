//! Read-only views handed out by the store.
//!
//! These are copies taken under the store lock; nothing here references the
//! live indices.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::ids::{JobId, QueueId, TaskId};

/// Snapshot of index sizes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStatus {
    pub total_jobs: usize,
    pub total_tasks: usize,
    /// Job count per queue, including queues that are currently empty.
    pub queues: BTreeMap<QueueId, usize>,
}

/// A job as seen from outside the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobView {
    pub job_id: JobId,
    pub data: Vec<u8>,
    pub tasks: Vec<TaskId>,
    pub queues: Vec<QueueLease>,
}

/// Lease state of one job inside one queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueLease {
    pub queue_id: QueueId,
    /// Time since the job was last handed out, `None` if it never was.
    pub leased_for_ms: Option<i64>,
}

impl QueueLease {
    pub fn new(queue_id: QueueId, leased_for: Option<Duration>) -> Self {
        Self {
            queue_id,
            leased_for_ms: leased_for.map(|d| d.num_milliseconds()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub count: usize,
}
