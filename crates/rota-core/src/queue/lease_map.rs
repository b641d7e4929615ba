//! Order-preserving map from job id to last-dispatch time.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::JobId;

/// Insertion-ordered `job id -> last dispatch` map.
///
/// `order` is fixed at first insert and only shrinks on removal. Updating a
/// lease goes through `leases` and never moves the key, which the cursor
/// relies on: index `i` keeps naming the same job across lease updates.
#[derive(Debug, Clone, Default)]
pub struct LeaseMap {
    order: Vec<JobId>,
    /// `None` means the job has never been handed out.
    leases: HashMap<JobId, Option<DateTime<Utc>>>,
}

impl LeaseMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, job_id: &JobId) -> bool {
        self.leases.contains_key(job_id)
    }

    /// Append `job_id` as never dispatched. Returns false (and leaves the
    /// existing lease alone) if the job is already present.
    pub fn insert(&mut self, job_id: JobId) -> bool {
        if self.contains(&job_id) {
            return false;
        }
        self.leases.insert(job_id.clone(), None);
        self.order.push(job_id);
        true
    }

    /// Remove `job_id`, returning the slot it occupied.
    pub fn remove(&mut self, job_id: &JobId) -> Option<usize> {
        self.leases.remove(job_id)?;
        let index = self.order.iter().position(|id| id == job_id)?;
        self.order.remove(index);
        Some(index)
    }

    pub fn leased_at(&self, job_id: &JobId) -> Option<Option<DateTime<Utc>>> {
        self.leases.get(job_id).copied()
    }

    pub fn entry_at(&self, index: usize) -> Option<(&JobId, Option<DateTime<Utc>>)> {
        let job_id = self.order.get(index)?;
        let leased_at = self.leases.get(job_id).copied()?;
        Some((job_id, leased_at))
    }

    /// Record a dispatch in place. Returns false if the job is absent.
    pub fn mark_leased(&mut self, job_id: &JobId, at: DateTime<Utc>) -> bool {
        match self.leases.get_mut(job_id) {
            Some(slot) => {
                *slot = Some(at);
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn job_ids(&self) -> impl Iterator<Item = &JobId> {
        self.order.iter()
    }

    /// Drop every entry, returning the removed job ids in order.
    pub fn drain(&mut self) -> Vec<JobId> {
        self.leases.clear();
        std::mem::take(&mut self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ids(map: &LeaseMap) -> Vec<&str> {
        map.job_ids().map(|id| id.as_str()).collect()
    }

    #[test]
    fn insert_keeps_first_slot() {
        let mut map = LeaseMap::new();
        assert!(map.insert(JobId::from("a")));
        assert!(map.insert(JobId::from("b")));
        assert!(!map.insert(JobId::from("a")));

        assert_eq!(ids(&map), vec!["a", "b"]);
    }

    #[test]
    fn lease_update_does_not_reorder() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut map = LeaseMap::new();
        map.insert(JobId::from("a"));
        map.insert(JobId::from("b"));

        assert!(map.mark_leased(&JobId::from("a"), at));
        assert_eq!(ids(&map), vec!["a", "b"]);
        assert_eq!(map.entry_at(0), Some((&JobId::from("a"), Some(at))));
        assert_eq!(map.entry_at(1), Some((&JobId::from("b"), None)));
    }

    #[test]
    fn reinsert_does_not_reset_lease() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut map = LeaseMap::new();
        map.insert(JobId::from("a"));
        map.mark_leased(&JobId::from("a"), at);
        map.insert(JobId::from("a"));

        assert_eq!(map.leased_at(&JobId::from("a")), Some(Some(at)));
    }

    #[test]
    fn remove_reports_slot() {
        let mut map = LeaseMap::new();
        for id in ["a", "b", "c"] {
            map.insert(JobId::from(id));
        }

        assert_eq!(map.remove(&JobId::from("b")), Some(1));
        assert_eq!(map.remove(&JobId::from("b")), None);
        assert_eq!(ids(&map), vec!["a", "c"]);
        assert!(!map.mark_leased(&JobId::from("b"), Utc::now()));
    }

    #[test]
    fn drain_empties_in_order() {
        let mut map = LeaseMap::new();
        map.insert(JobId::from("a"));
        map.insert(JobId::from("b"));

        let drained = map.drain();
        assert_eq!(drained, vec![JobId::from("a"), JobId::from("b")]);
        assert!(map.is_empty());
        assert!(!map.contains(&JobId::from("a")));
    }
}
