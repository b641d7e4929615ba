//! Store state: the job, queue and task indices and every mutation on them.
//!
//! Nothing here locks or reads the clock; `JobStore` does both and hands the
//! current instant in. Each public method either applies its whole update or
//! returns an error before touching any index.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{StoreConfig, lease_from_secs};
use crate::domain::{
    JobId, JobRecord, JobView, QueueId, QueueLease, Result, StoreError, StoreStatus, TaskId,
    TaskStatus,
};
use crate::queue::{Queue, lease_expired};

/// A job handed out by `pull`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeasedJob {
    pub job_id: JobId,
    pub queue_id: QueueId,
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct StoreState {
    config: StoreConfig,

    /// Job records (single source of truth for payload and membership).
    jobs: HashMap<JobId, JobRecord>,

    /// Queues by id, iterated in ascending order.
    queues: BTreeMap<QueueId, Queue>,

    /// Jobs carrying each task. Never holds an empty set.
    tasks: HashMap<TaskId, BTreeSet<JobId>>,
}

impl StoreState {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Payload size is not checked here; `max_payload_bytes` is enforced by
    /// whatever feeds the store.
    pub fn add(&mut self, job_id: JobId, task_id: TaskId, queue_id: QueueId, data: Vec<u8>) -> Result<()> {
        let job = match self.jobs.entry(job_id.clone()) {
            Entry::Occupied(entry) if !entry.get().has_data(&data) => {
                warn!(job_id = %job_id, "rejecting add with different data");
                return Err(StoreError::Conflict { job_id });
            }
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(JobRecord::new(data)),
        };
        job.tasks.insert(task_id.clone());
        job.queues.insert(queue_id);

        self.queues.entry(queue_id).or_default().insert(job_id.clone());
        self.tasks.entry(task_id.clone()).or_default().insert(job_id.clone());

        debug!(job_id = %job_id, task_id = %task_id, queue_id = %queue_id, "job added");
        Ok(())
    }

    pub fn remove(&mut self, job_id: &JobId) -> Result<()> {
        self.detach(job_id)
            .map(|_| debug!(job_id = %job_id, "job removed"))
            .ok_or_else(|| StoreError::NotFound(job_id.clone()))
    }

    /// Lease up to `count` jobs, visiting queues in ascending id order.
    ///
    /// Only each queue's cursor position carries over between calls; every
    /// call starts again from the lowest queue id.
    pub fn pull(&mut self, count: usize, now: DateTime<Utc>) -> Vec<LeasedJob> {
        let default_lease = self.config.default_lease();
        let mut pulled = Vec::new();

        for (&queue_id, queue) in self.queues.iter_mut() {
            if pulled.len() >= count {
                break;
            }
            if queue.is_empty() {
                continue;
            }
            let lease = queue.effective_lease(default_lease);
            for job_id in queue.lease_next(now, lease, count - pulled.len()) {
                let Some(job) = self.jobs.get(&job_id) else {
                    continue;
                };
                pulled.push(LeasedJob {
                    data: job.data().to_vec(),
                    job_id,
                    queue_id,
                });
            }
        }

        debug!(requested = count, leased = pulled.len(), "pull");
        pulled
    }

    pub fn status(&self) -> StoreStatus {
        StoreStatus {
            total_jobs: self.jobs.len(),
            total_tasks: self.tasks.len(),
            queues: self
                .queues
                .iter()
                .map(|(&queue_id, queue)| (queue_id, queue.len()))
                .collect(),
        }
    }

    pub fn get_job(&self, job_id: &JobId, now: DateTime<Utc>) -> Result<JobView> {
        let job = self
            .jobs
            .get(job_id)
            .ok_or_else(|| StoreError::NotFound(job_id.clone()))?;
        Ok(self.view(job_id, job, now))
    }

    pub fn task_jobs(&self, task_id: &TaskId, now: DateTime<Utc>) -> Result<BTreeMap<JobId, JobView>> {
        let members = self
            .tasks
            .get(task_id)
            .ok_or_else(|| StoreError::UnknownTask(task_id.clone()))?;
        Ok(members
            .iter()
            .filter_map(|job_id| {
                let job = self.jobs.get(job_id)?;
                Some((job_id.clone(), self.view(job_id, job, now)))
            })
            .collect())
    }

    pub fn task_status(&self, task_id: &TaskId) -> Result<TaskStatus> {
        self.tasks
            .get(task_id)
            .map(|members| TaskStatus {
                count: members.len(),
            })
            .ok_or_else(|| StoreError::UnknownTask(task_id.clone()))
    }

    /// Remove every job carrying `task_id`. Returns how many were removed.
    pub fn remove_task(&mut self, task_id: &TaskId) -> Result<usize> {
        let members: Vec<JobId> = self
            .tasks
            .get(task_id)
            .ok_or_else(|| StoreError::UnknownTask(task_id.clone()))?
            .iter()
            .cloned()
            .collect();

        let removed = members
            .iter()
            .filter(|job_id| self.detach(job_id).is_some())
            .count();
        debug!(task_id = %task_id, removed, "task removed");
        Ok(removed)
    }

    /// Move a job that is not currently leased from one queue to another.
    pub fn move_job(&mut self, job_id: &JobId, from: QueueId, to: QueueId, now: DateTime<Utc>) -> Result<()> {
        if !self.jobs.contains_key(job_id) {
            return Err(StoreError::NotFound(job_id.clone()));
        }
        let default_lease = self.config.default_lease();
        let source = self.queues.get(&from).ok_or(StoreError::UnknownQueue(from))?;
        let leased_at = source.leased_at(job_id).ok_or_else(|| StoreError::NotInQueue {
            job_id: job_id.clone(),
            queue_id: from,
        })?;
        if !lease_expired(leased_at, now, source.effective_lease(default_lease)) {
            return Err(StoreError::LeaseHeld {
                job_id: job_id.clone(),
                queue_id: from,
            });
        }

        let Some(job) = self.jobs.get_mut(job_id) else {
            return Err(StoreError::NotFound(job_id.clone()));
        };
        if let Some(source) = self.queues.get_mut(&from) {
            source.remove(job_id);
        }
        job.queues.remove(&from);
        if job.queues.insert(to) {
            self.queues.entry(to).or_default().insert(job_id.clone());
        }

        debug!(job_id = %job_id, from = %from, to = %to, "job moved");
        Ok(())
    }

    /// Empty a queue. Jobs left in no queue at all are removed from the store.
    /// Returns how many entries were cleared.
    pub fn clear_queue(&mut self, queue_id: QueueId) -> Result<usize> {
        let cleared = self
            .queues
            .get_mut(&queue_id)
            .ok_or(StoreError::UnknownQueue(queue_id))?
            .clear();

        for job_id in &cleared {
            let orphaned = match self.jobs.get_mut(job_id) {
                Some(job) => {
                    job.queues.remove(&queue_id);
                    job.is_orphaned()
                }
                None => false,
            };
            if orphaned {
                self.detach(job_id);
            }
        }

        debug!(queue_id = %queue_id, cleared = cleared.len(), "queue cleared");
        Ok(cleared.len())
    }

    /// Set a queue's own lease, creating the queue if needed.
    pub fn set_queue_lease(&mut self, queue_id: QueueId, secs: u64) {
        self.queues
            .entry(queue_id)
            .or_default()
            .set_lease(lease_from_secs(secs));
    }

    pub fn set_default_lease(&mut self, secs: u64) {
        self.config.default_lease_secs = secs;
    }

    /// Drop a job from every index. Queues stay, emptied tasks go.
    fn detach(&mut self, job_id: &JobId) -> Option<JobRecord> {
        let job = self.jobs.remove(job_id)?;

        for queue_id in &job.queues {
            if let Some(queue) = self.queues.get_mut(queue_id) {
                queue.remove(job_id);
            }
        }

        for task_id in &job.tasks {
            let emptied = match self.tasks.get_mut(task_id) {
                Some(members) => {
                    members.remove(job_id);
                    members.is_empty()
                }
                None => false,
            };
            if emptied {
                self.tasks.remove(task_id);
            }
        }

        Some(job)
    }

    fn view(&self, job_id: &JobId, job: &JobRecord, now: DateTime<Utc>) -> JobView {
        let queues = job
            .queues
            .iter()
            .map(|&queue_id| {
                let leased_at = self
                    .queues
                    .get(&queue_id)
                    .and_then(|queue| queue.leased_at(job_id))
                    .flatten();
                QueueLease::new(queue_id, leased_at.map(|at| now - at))
            })
            .collect();

        JobView {
            job_id: job_id.clone(),
            data: job.data().to_vec(),
            tasks: job.tasks.iter().cloned().collect(),
            queues,
        }
    }
}
