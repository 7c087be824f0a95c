//! Capped, newest-first log of coordinator events shown in the UI.

use std::collections::VecDeque;

use chrono::{DateTime, Local};

pub const DEFAULT_CAPACITY: usize = 10;

#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub event: String,
    pub payload: Option<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl ActivityLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, event: impl Into<String>, payload: Option<serde_json::Value>) {
        self.entries.push_front(LogEntry {
            timestamp: Local::now(),
            event: event.into(),
            payload,
        });
        self.entries.truncate(self.capacity);
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
