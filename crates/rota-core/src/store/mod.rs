//! Job store facade.
//!
//! `JobStore` wraps `StoreState` in a single `tokio::sync::Mutex`. Every
//! operation holds that lock for its whole duration, so no caller ever sees
//! the job, queue and task indices partially updated, and no two operations
//! overlap, whichever queues they touch.
//!
//! The work done under the lock is pure in-memory computation with no await
//! points, so an operation always runs to completion once it holds the lock.
//! The lock itself has no timeout: a caller stuck while holding it would stall
//! every other caller. That is a known limit of the single coarse lock.
//!
//! State lives only in memory and is gone when the store is dropped.

mod state;

pub use state::{LeasedJob, StoreState};

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::StoreConfig;
use crate::domain::{JobId, JobView, QueueId, Result, StoreStatus, TaskId, TaskStatus};
use crate::ports::{Clock, SystemClock};

/// Shared handle to one store. Clones refer to the same state.
#[derive(Clone)]
pub struct JobStore {
    state: Arc<Mutex<StoreState>>,
    clock: Arc<dyn Clock>,
}

impl JobStore {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::new(config))),
            clock,
        }
    }

    pub async fn config(&self) -> StoreConfig {
        self.state.lock().await.config().clone()
    }

    /// Store a job in a queue under a task.
    ///
    /// Re-adding an existing job is allowed only with identical data; it then
    /// just adds the task and queue memberships (leases already running are
    /// kept).
    pub async fn add(
        &self,
        job_id: impl Into<JobId>,
        task_id: impl Into<TaskId>,
        queue_id: impl Into<QueueId>,
        data: impl Into<Vec<u8>>,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        state.add(job_id.into(), task_id.into(), queue_id.into(), data.into())
    }

    pub async fn remove(&self, job_id: impl Into<JobId>) -> Result<()> {
        let job_id = job_id.into();
        self.state.lock().await.remove(&job_id)
    }

    /// Lease up to `count` available jobs, round-robin across queues.
    pub async fn pull(&self, count: usize) -> Vec<LeasedJob> {
        let mut state = self.state.lock().await;
        let now = self.clock.now();
        state.pull(count, now)
    }

    pub async fn status(&self) -> StoreStatus {
        self.state.lock().await.status()
    }

    pub async fn get_job(&self, job_id: impl Into<JobId>) -> Result<JobView> {
        let job_id = job_id.into();
        let state = self.state.lock().await;
        state.get_job(&job_id, self.clock.now())
    }

    pub async fn task_jobs(&self, task_id: impl Into<TaskId>) -> Result<BTreeMap<JobId, JobView>> {
        let task_id = task_id.into();
        let state = self.state.lock().await;
        state.task_jobs(&task_id, self.clock.now())
    }

    pub async fn task_status(&self, task_id: impl Into<TaskId>) -> Result<TaskStatus> {
        let task_id = task_id.into();
        self.state.lock().await.task_status(&task_id)
    }

    pub async fn remove_task(&self, task_id: impl Into<TaskId>) -> Result<usize> {
        let task_id = task_id.into();
        self.state.lock().await.remove_task(&task_id)
    }

    pub async fn move_job(
        &self,
        job_id: impl Into<JobId>,
        from: impl Into<QueueId>,
        to: impl Into<QueueId>,
    ) -> Result<()> {
        let job_id = job_id.into();
        let mut state = self.state.lock().await;
        let now = self.clock.now();
        state.move_job(&job_id, from.into(), to.into(), now)
    }

    pub async fn clear_queue(&self, queue_id: impl Into<QueueId>) -> Result<usize> {
        self.state.lock().await.clear_queue(queue_id.into())
    }

    pub async fn set_queue_lease(&self, queue_id: impl Into<QueueId>, secs: u64) {
        self.state.lock().await.set_queue_lease(queue_id.into(), secs);
    }

    pub async fn set_default_lease(&self, secs: u64) {
        self.state.lock().await.set_default_lease(secs);
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StoreError;
    use crate::ports::ManualClock;
    use chrono::Duration;

    fn store_with_clock(lease_secs: u64) -> (JobStore, ManualClock) {
        let clock = ManualClock::default();
        let config = StoreConfig::default().with_default_lease_secs(lease_secs);
        (JobStore::with_clock(config, Arc::new(clock.clone())), clock)
    }

    #[tokio::test]
    async fn add_pull_remove() {
        let (store, _clock) = store_with_clock(60);
        store.add("j1", "t1", 1u64, b"x".to_vec()).await.unwrap();

        let got = store.pull(1).await;
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].job_id.as_str(), "j1");
        assert_eq!(got[0].data, b"x");

        store.remove("j1").await.unwrap();
        assert_eq!(store.status().await.total_jobs, 0);
        assert_eq!(
            store.remove("j1").await,
            Err(StoreError::NotFound(JobId::from("j1")))
        );
    }

    #[tokio::test]
    async fn lease_uses_injected_clock() {
        let (store, clock) = store_with_clock(30);
        store.add("j1", "t1", 1u64, b"x".to_vec()).await.unwrap();

        assert_eq!(store.pull(1).await.len(), 1);
        clock.advance(Duration::seconds(30));
        assert!(store.pull(1).await.is_empty());
        clock.advance(Duration::seconds(1));
        assert_eq!(store.pull(1).await.len(), 1);
    }

    #[tokio::test]
    async fn get_job_reports_elapsed_lease() {
        let (store, clock) = store_with_clock(60);
        store.add("j1", "t1", 4u64, b"x".to_vec()).await.unwrap();
        store.pull(1).await;
        clock.advance(Duration::milliseconds(1500));

        let view = store.get_job("j1").await.unwrap();
        assert_eq!(view.queues[0].leased_for_ms, Some(1500));
    }

    #[tokio::test]
    async fn default_lease_can_change_at_runtime() {
        let (store, clock) = store_with_clock(600);
        store.add("j1", "t1", 1u64, b"x".to_vec()).await.unwrap();
        store.pull(1).await;

        store.set_default_lease(1).await;
        assert_eq!(store.config().await.default_lease_secs, 1);
        clock.advance(Duration::seconds(2));
        assert_eq!(store.pull(1).await.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_never_share_a_lease() {
        let (store, _clock) = store_with_clock(600);
        for i in 0..50 {
            store
                .add(format!("j{i}"), "t", (i % 5) as u64, vec![i as u8])
                .await
                .unwrap();
        }

        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.pull(7).await }));
        }

        let mut seen = std::collections::HashSet::new();
        for handle in handles {
            for job in handle.await.unwrap() {
                assert!(seen.insert(job.job_id), "job leased twice");
            }
        }
        assert_eq!(seen.len(), 50);
    }
}
