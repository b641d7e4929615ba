//! Domain identifiers (strongly-typed IDs).
//!
//! ## Phantom type keys
//! Job and task ids are caller-supplied strings. They share one generic
//! implementation, `Key<T>`, where `T` is a zero-sized marker type:
//! - `Key<T>` is exactly as large as a `String` (`PhantomData` is free)
//! - a `JobId` cannot be passed where a `TaskId` is expected
//! - the marker's `kind()` names the key in messages ("job not found: j1")
//!
//! Keys serialize as the bare string, so JSON output shows `"j1"` rather than
//! a wrapper object.
//!
//! ## Queue ids
//! Queue ids are integers and are visited in ascending order by `pull`, so
//! `QueueId` is a plain ordered newtype.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Marker trait for each key kind.
pub trait KeyMarker: Send + Sync + 'static {
    /// Human readable kind ("job", "task"), used in not-found messages.
    fn kind() -> &'static str;
}

/// Generic string key.
///
/// ```ignore
/// let job: JobId = "j1".into();
/// let task: TaskId = "t1".into();
/// // let _: JobId = task; // <- does not compile
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key<T: KeyMarker> {
    value: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: KeyMarker> Key<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> &'static str {
        T::kind()
    }
}

impl<T: KeyMarker> From<&str> for Key<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: KeyMarker> From<String> for Key<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T: KeyMarker> fmt::Display for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

// ========================================
// Marker types
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Job {}

impl KeyMarker for Job {
    fn kind() -> &'static str {
        "job"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {}

impl KeyMarker for Task {
    fn kind() -> &'static str {
        "task"
    }
}

/// Identifier of a Job (the unit that is leased out by `pull`).
pub type JobId = Key<Job>;

/// Identifier of a Task (a grouping label used for bulk cleanup).
pub type TaskId = Key<Task>;

/// Identifier of a Queue. Queues are visited in ascending id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueId(u64);

impl QueueId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for QueueId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_keep_their_kind() {
        let job = JobId::from("j1");
        let task = TaskId::from("j1");

        assert_eq!(job.as_str(), task.as_str());
        assert_eq!(job.kind(), "job");
        assert_eq!(task.kind(), "task");
    }

    #[test]
    fn keys_serialize_as_plain_strings() {
        let job = JobId::from("job-42");
        let json = serde_json::to_string(&job).unwrap();
        assert_eq!(json, "\"job-42\"");

        let back: JobId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, job);
    }

    #[test]
    fn queue_ids_sort_numerically() {
        let mut ids = vec![QueueId::new(10), QueueId::new(2), QueueId::new(7)];
        ids.sort();
        assert_eq!(ids, vec![QueueId::new(2), QueueId::new(7), QueueId::new(10)]);
        assert_eq!(QueueId::new(10).to_string(), "10");
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;
        assert_eq!(size_of::<JobId>(), size_of::<String>());
        assert_eq!(size_of::<TaskId>(), size_of::<String>());
    }
}
