//! Bounded scan history, newest first.

use std::collections::VecDeque;

use crate::models::ScanSummary;

/// Default number of scans retained.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Fixed-capacity log of past scans.
///
/// New entries go to the front; once the log is over capacity the oldest
/// entry at the back is evicted. Eviction is the only way entries leave.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: VecDeque<ScanSummary>,
    capacity: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryLog {
    /// A capacity of zero is raised to one so the latest scan is always kept.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn append(&mut self, summary: ScanSummary) {
        self.entries.push_front(summary);
        while self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }

    /// Snapshot of all entries, newest first.
    pub fn entries(&self) -> Vec<ScanSummary> {
        self.entries.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&ScanSummary> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
