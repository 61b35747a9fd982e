//! Per-sink fan-out queue for new-arrival presentation.
//!
//! One queue per display sink: the poll loop appends arrivals and purges
//! expired ids, each consumer loop drains its own head at its own pace.
//! The structure itself is single-threaded; the owner wraps it in
//! `Arc<Mutex<_>>` and never holds the lock across a render call.

use std::collections::{HashSet, VecDeque};

use crate::types::SnapshotRecord;

/// FIFO queue of arrivals awaiting presentation on one sink.
#[derive(Debug, Default)]
pub struct FanoutQueue {
    items: VecDeque<SnapshotRecord>,
}

impl FanoutQueue {
    pub fn new() -> Self {
        FanoutQueue {
            items: VecDeque::new(),
        }
    }

    /// Append an arrival unless its id is already pending.
    ///
    /// The suppression only covers the still-queued window: once an entry
    /// has been drained (or purged), the same id pushes fine again.
    pub fn push(&mut self, record: SnapshotRecord) {
        if record.hex.is_empty() {
            return;
        }
        if self.items.iter().any(|r| r.hex == record.hex) {
            return;
        }
        self.items.push_back(record);
    }

    /// Remove and return the oldest pending arrival.
    pub fn pop_or_none(&mut self) -> Option<SnapshotRecord> {
        self.items.pop_front()
    }

    /// Purge every pending entry whose id is in `ids` (roster expiry).
    pub fn remove_ids(&mut self, ids: &HashSet<String>) {
        if ids.is_empty() {
            return;
        }
        self.items.retain(|r| !ids.contains(&r.hex));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
