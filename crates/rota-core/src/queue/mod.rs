//! Queue module: ordered lease map, round-robin cursor, and the per-queue
//! half of the pull algorithm.
//!
//! # Lease model
//! Each entry remembers when it was last handed out (`None` = never). An entry
//! is available once strictly more than the lease has passed since then. There
//! is no acknowledgement: a consumer that finishes a job removes it, and a job
//! that is not removed comes round again after the lease.
//!
//! # Walk
//! `lease_next` resumes from the cursor, leases available entries in order,
//! and stops at the first entry still under lease. Because entries are leased
//! in walk order, that entry is normally the oldest lease still held.

mod cursor;
mod lease_map;

pub use cursor::QueueCursor;
pub use lease_map::LeaseMap;

use chrono::{DateTime, Duration, Utc};

use crate::domain::JobId;

/// Is a job whose last dispatch was `leased_at` free to hand out at `now`?
pub fn lease_expired(leased_at: Option<DateTime<Utc>>, now: DateTime<Utc>, lease: Duration) -> bool {
    match leased_at {
        None => true,
        Some(at) => now - at > lease,
    }
}

/// One queue: its entries, its cursor, and an optional lease override.
///
/// A queue is never dropped once created, even when empty; its cursor lives
/// as long as the queue does.
#[derive(Debug, Clone, Default)]
pub struct Queue {
    entries: LeaseMap,
    cursor: QueueCursor,
    lease_override: Option<Duration>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn cursor(&self) -> &QueueCursor {
        &self.cursor
    }

    pub fn set_lease(&mut self, lease: Duration) {
        self.lease_override = Some(lease);
    }

    /// The lease this queue applies, given the store-wide default.
    pub fn effective_lease(&self, default: Duration) -> Duration {
        self.lease_override.unwrap_or(default)
    }

    pub fn insert(&mut self, job_id: JobId) -> bool {
        self.entries.insert(job_id)
    }

    pub fn remove(&mut self, job_id: &JobId) -> bool {
        match self.entries.remove(job_id) {
            Some(index) => {
                self.cursor.entry_removed(index);
                true
            }
            None => false,
        }
    }

    /// Empty the queue and rewind its cursor. Returns the removed job ids.
    pub fn clear(&mut self) -> Vec<JobId> {
        self.cursor.reset();
        self.entries.drain()
    }

    pub fn leased_at(&self, job_id: &JobId) -> Option<Option<DateTime<Utc>>> {
        self.entries.leased_at(job_id)
    }

    /// Lease up to `want` jobs from this queue, continuing from where the
    /// previous call stopped.
    ///
    /// Walks the cursor and leases every expired entry it meets. The first
    /// entry still under lease is put back (the cursor reverts onto it) and
    /// ends the walk: entries after it are assumed to be leased too, since
    /// dispatch times follow the walk order. A single call visits each
    /// entry at most once.
    pub fn lease_next(&mut self, now: DateTime<Utc>, lease: Duration, want: usize) -> Vec<JobId> {
        let len = self.entries.len();
        let mut leased = Vec::new();

        for _ in 0..len {
            if leased.len() >= want {
                break;
            }
            let Some(index) = self.cursor.advance(len) else {
                break;
            };
            let Some((job_id, leased_at)) = self.entries.entry_at(index) else {
                break;
            };
            if !lease_expired(leased_at, now, lease) {
                self.cursor.revert(len);
                break;
            }
            let job_id = job_id.clone();
            self.entries.mark_leased(&job_id, now);
            leased.push(job_id);
        }

        leased
    }
}
