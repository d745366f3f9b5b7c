//! Bounded in-memory log of session events for the UI's activity panel.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

/// Maximum number of entries kept before the oldest is evicted.
pub const LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// Fixed-capacity FIFO of the most recent session events.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(LOG_CAPACITY)
    }
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an entry, evicting the oldest when the ring is full.
    pub fn push(&mut self, message: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            timestamp: Utc::now(),
            message: message.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_snapshot_order() {
        let mut log = EventLog::default();
        log.push("first");
        log.push("second");

        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].message, "first");
        assert_eq!(snapshot[1].message, "second");
    }

    #[test]
    fn test_ring_never_exceeds_capacity() {
        let mut log = EventLog::default();
        for i in 0..51 {
            log.push(format!("entry {}", i));
        }

        assert_eq!(log.len(), LOG_CAPACITY);
        let snapshot = log.snapshot();
        // Entry 0 was evicted when entry 50 arrived.
        assert_eq!(snapshot[0].message, "entry 1");
        assert_eq!(snapshot[49].message, "entry 50");
    }

    #[test]
    fn test_small_capacity_evicts_oldest() {
        let mut log = EventLog::new(2);
        log.push("a");
        log.push("b");
        log.push("c");

        let messages: Vec<_> = log.snapshot().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["b", "c"]);
    }
}
