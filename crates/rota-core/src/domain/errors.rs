//! Errors raised by the job store.
//!
//! Every variant is local and synchronous. The store never retries on its own;
//! the caller decides how to surface a failure. An operation that returns an
//! error has not modified any index.

use thiserror::Error;

use super::ids::{JobId, QueueId, TaskId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A job id was re-submitted with a payload that differs from the stored one.
    #[error("job {job_id} already exists with different data")]
    Conflict { job_id: JobId },

    #[error("{} not found: {}", .0.kind(), .0)]
    NotFound(JobId),

    #[error("{} not found: {}", .0.kind(), .0)]
    UnknownTask(TaskId),

    #[error("queue not found: {0}")]
    UnknownQueue(QueueId),

    #[error("job {job_id} is not in queue {queue_id}")]
    NotInQueue { job_id: JobId, queue_id: QueueId },

    #[error("job {job_id} is leased out of queue {queue_id}")]
    LeaseHeld { job_id: JobId, queue_id: QueueId },

    #[error("realm not found: {0}")]
    UnknownRealm(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_ids() {
        let err = StoreError::Conflict {
            job_id: JobId::from("j1"),
        };
        assert_eq!(err.to_string(), "job j1 already exists with different data");

        let err = StoreError::LeaseHeld {
            job_id: JobId::from("j1"),
            queue_id: QueueId::new(3),
        };
        assert_eq!(err.to_string(), "job j1 is leased out of queue 3");

        assert_eq!(StoreError::NotFound(JobId::from("j1")).to_string(), "job not found: j1");
        assert_eq!(StoreError::UnknownTask(TaskId::from("t1")).to_string(), "task not found: t1");
    }
}
