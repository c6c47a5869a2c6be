//! Short-term memory: a fixed-capacity buffer of recent turns.

use std::collections::VecDeque;
use std::time::SystemTime;

/// One remembered turn text.
///
/// Records are immutable once created and owned exclusively by the
/// buffer; they are dropped when evicted.
#[derive(Debug, Clone)]
pub struct TurnRecord {
    /// The turn text.
    pub text: String,
    /// When the record was added.
    pub timestamp: SystemTime,
}

/// Retains the most recent turn texts, evicting oldest-first.
#[derive(Debug)]
pub struct ShortTermMemory {
    records: VecDeque<TurnRecord>,
    capacity: usize,
}

impl ShortTermMemory {
    /// Create a buffer that holds at most `capacity` turns.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a turn text, silently dropping the oldest entries while
    /// the buffer is over capacity. Always succeeds.
    pub fn add(&mut self, text: impl Into<String>) {
        self.records.push_back(TurnRecord {
            text: text.into(),
            timestamp: SystemTime::now(),
        });
        while self.records.len() > self.capacity {
            self.records.pop_front();
        }
    }

    /// Get stored records in insertion order; with `k`, only the most
    /// recent `k` (fewer if the buffer holds less).
    pub fn get(&self, k: Option<usize>) -> Vec<&TurnRecord> {
        let skip = match k {
            Some(k) => self.records.len().saturating_sub(k),
            None => 0,
        };
        self.records.iter().skip(skip).collect()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
