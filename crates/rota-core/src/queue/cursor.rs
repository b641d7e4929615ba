//! Persistent, revertible round-robin cursor.
//!
//! ## Why an index and not an iterator
//! A Rust iterator over the queue would borrow it, so it could not be kept in
//! the queue between `pull` calls, and `add`/`remove` could not run while one
//! is alive. The cursor therefore stores a slot number and is told the current
//! length on every call. The `LeaseMap` never reorders keys, so slot `i`
//! names the same job until something before it is removed.
//!
//! ## Revert
//! `pull` stops at the first entry still under lease and puts it back, so the
//! next call starts on that entry again. `revert` steps the position back by
//! one, wrapping to the last slot. It is guarded:
//! - nothing to undo (empty queue, or no advance yet): no-op
//! - single entry: the only slot is always next, position resets to 0
//! - queue shrank since the advance: position is clamped into range
//!
//! ## Removal
//! When slot `i` disappears, every later slot shifts down by one.
//! `entry_removed` moves the position back if `i` was before it, so the entry
//! that was next stays next.

/// Position of a queue's round-robin walk.
///
/// The cursor is a plain index into the queue's `LeaseMap` order, not a live
/// iterator, so it survives across `pull` calls and across mutations of the
/// map. Callers pass the current length on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueCursor {
    /// Slot that the next `advance` yields (wrapped if past the end).
    position: usize,
    /// Advances since creation or the last `reset`, net of reverts.
    steps: usize,
}

impl QueueCursor {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn position(&self) -> usize {
        self.position
    }

    #[cfg(test)]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Yield the next slot, wrapping to the first when past the end.
    pub fn advance(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        if self.position >= len {
            self.position = 0;
        }
        let index = self.position;
        self.position += 1;
        self.steps += 1;
        Some(index)
    }

    /// Undo the most recent `advance` so the same slot is yielded next.
    ///
    /// A no-op on an empty queue or before any advance. On a single-entry
    /// queue the only slot is always next, so the position just resets.
    pub fn revert(&mut self, len: usize) {
        if len == 0 || self.steps == 0 {
            return;
        }
        self.steps -= 1;
        if len == 1 {
            self.position = 0;
            return;
        }
        self.position = match self.position {
            0 => len - 1,
            p => (p - 1).min(len - 1),
        };
    }

    /// Keep pointing at the same upcoming entry after slot `index` is removed.
    pub fn entry_removed(&mut self, index: usize) {
        if index < self.position {
            self.position -= 1;
        }
    }

    pub fn reset(&mut self) {
        self.position = 0;
        self.steps = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn advance_wraps_around() {
        let mut cursor = QueueCursor::new();
        let seen: Vec<_> = (0..5).filter_map(|_| cursor.advance(3)).collect();
        assert_eq!(seen, vec![0, 1, 2, 0, 1]);
        assert_eq!(cursor.steps(), 5);
    }

    #[test]
    fn advance_on_empty_yields_nothing() {
        let mut cursor = QueueCursor::new();
        assert_eq!(cursor.advance(0), None);
        assert_eq!(cursor.steps(), 0);
    }

    #[rstest]
    #[case::first_slot(3, 1)]
    #[case::middle_slot(3, 2)]
    #[case::last_slot(3, 3)]
    #[case::after_wrap(3, 4)]
    #[case::single_entry(1, 3)]
    fn revert_yields_same_slot_again(#[case] len: usize, #[case] advances: usize) {
        let mut cursor = QueueCursor::new();
        let mut last = None;
        for _ in 0..advances {
            last = cursor.advance(len);
        }
        cursor.revert(len);
        assert_eq!(cursor.advance(len), last);
    }

    #[test]
    fn revert_before_advance_is_noop() {
        let mut cursor = QueueCursor::new();
        cursor.revert(4);
        assert_eq!(cursor, QueueCursor::new());
        cursor.revert(0);
        assert_eq!(cursor, QueueCursor::new());
    }

    #[test]
    fn revert_after_shrink_stays_in_bounds() {
        let mut cursor = QueueCursor::new();
        for _ in 0..5 {
            cursor.advance(5);
        }
        // queue shrank from 5 to 2 entries since the last advance
        cursor.revert(2);
        assert!(cursor.position() < 2);
        assert!(cursor.advance(2).is_some());
    }

    #[test]
    fn removal_before_position_keeps_next_entry() {
        let mut cursor = QueueCursor::new();
        cursor.advance(4);
        cursor.advance(4);
        // next would be slot 2; slot 0 goes away so that entry is now slot 1
        cursor.entry_removed(0);
        assert_eq!(cursor.advance(3), Some(1));
    }

    #[test]
    fn removal_after_position_is_ignored() {
        let mut cursor = QueueCursor::new();
        cursor.advance(4);
        cursor.entry_removed(3);
        assert_eq!(cursor.advance(3), Some(1));
    }

    #[test]
    fn reset_starts_over() {
        let mut cursor = QueueCursor::new();
        cursor.advance(3);
        cursor.advance(3);
        cursor.reset();
        assert_eq!(cursor.steps(), 0);
        assert_eq!(cursor.advance(3), Some(0));
    }
}
