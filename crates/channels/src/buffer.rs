//! Ring buffer for channel history
//!
//! The `HistoryRing` keeps the last N records of a channel in a fixed-size
//! ring. Once full, each push overwrites the oldest slot. Snapshots are
//! returned oldest first and are owned copies, so later pushes never affect
//! a snapshot that was already handed out.
//!
//! The ring itself is not synchronized; the owning [`Channel`](crate::Channel)
//! guards it together with the rest of its state.

use crate::line::Line;

/// Default number of records kept per channel
pub const DEFAULT_CAPACITY: usize = 1000;

/// Fixed-capacity history of records
#[derive(Debug)]
pub struct HistoryRing {
    /// The ring slots
    buffer: Vec<Option<Line>>,
    /// Next slot to write
    write_pos: usize,
    /// Total records ever written
    total_written: u64,
    /// Capacity
    capacity: usize,
}

impl HistoryRing {
    /// Create a ring with default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a ring with specified capacity
    ///
    /// A zero capacity is raised to 1. Upper bounds are the caller's
    /// policy (see the `history_capacity` config limit).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: vec![None; capacity],
            write_pos: 0,
            total_written: 0,
            capacity,
        }
    }

    /// Append a record, overwriting the oldest once full
    pub fn push(&mut self, line: Line) {
        let pos = self.write_pos;
        self.buffer[pos] = Some(line);
        self.write_pos = (pos + 1) % self.capacity;
        self.total_written += 1;
    }

    /// Every retained record, oldest first
    pub fn snapshot(&self) -> Vec<Line> {
        self.last_n(self.capacity)
    }

    /// The last N records (oldest first)
    ///
    /// Returns up to `n` records, or fewer if not enough are available.
    pub(crate) fn last_n(&self, n: usize) -> Vec<Line> {
        let n = n.min(self.len());
        if n == 0 {
            return Vec::new();
        }

        // write_pos is the slot after the newest record
        let start = (self.write_pos + self.capacity - n) % self.capacity;

        (0..n)
            .filter_map(|i| self.buffer[(start + i) % self.capacity].clone())
            .collect()
    }

    /// Total records ever written
    #[cfg(test)]
    pub(crate) fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Current fill level
    pub fn len(&self) -> usize {
        self.total_written.min(self.capacity as u64) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.total_written == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryRing {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "buffer_test.rs"]
mod tests;
