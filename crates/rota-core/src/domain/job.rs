//! Job record: payload + membership.

use std::collections::BTreeSet;

use super::ids::{QueueId, TaskId};

/// A job held by the store.
///
/// The payload is fixed at first insert. Queue and task membership are sets,
/// so repeated `add` calls with the same triple change nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    data: Vec<u8>,
    pub tasks: BTreeSet<TaskId>,
    pub queues: BTreeSet<QueueId>,
}

impl JobRecord {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            tasks: BTreeSet::new(),
            queues: BTreeSet::new(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Byte-for-byte payload comparison.
    pub fn has_data(&self, data: &[u8]) -> bool {
        self.data == data
    }

    pub fn is_orphaned(&self) -> bool {
        self.queues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_is_a_set() {
        let mut job = JobRecord::new(b"x".to_vec());
        job.tasks.insert(TaskId::from("t1"));
        job.tasks.insert(TaskId::from("t1"));
        job.queues.insert(QueueId::new(1));
        job.queues.insert(QueueId::new(1));

        assert_eq!(job.tasks.len(), 1);
        assert_eq!(job.queues.len(), 1);
        assert!(!job.is_orphaned());
    }

    #[test]
    fn payload_comparison_is_exact() {
        let job = JobRecord::new(b"abc".to_vec());
        assert!(job.has_data(b"abc"));
        assert!(!job.has_data(b"abc "));
        assert!(!job.has_data(b""));
    }
}
