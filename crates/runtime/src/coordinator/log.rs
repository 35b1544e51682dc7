//! Player-facing combat log.
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Severity level for combat log entries.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

/// Snapshot of a single log entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub round: u32,
    pub text: String,
    pub level: LogLevel,
}

impl LogEntry {
    pub fn new(round: u32, text: impl Into<String>, level: LogLevel) -> Self {
        Self {
            round,
            text: text.into(),
            level,
        }
    }
}

/// Circular buffer of entries displayed to the player.
#[derive(Clone, Debug)]
pub struct CombatLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl CombatLog {
    pub fn new(capacity: usize) -> Self {
        let bounded_capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(bounded_capacity),
            capacity: bounded_capacity,
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn info(&mut self, round: u32, text: impl Into<String>) {
        self.push(LogEntry::new(round, text, LogLevel::Info));
    }

    pub fn warn(&mut self, round: u32, text: impl Into<String>) {
        self.push(LogEntry::new(round, text, LogLevel::Warning));
    }

    pub fn error(&mut self, round: u32, text: impl Into<String>) {
        self.push(LogEntry::new(round, text, LogLevel::Error));
    }

    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().rev().take(limit)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.entries.iter().filter(|entry| entry.level == level).count()
    }
}
