use crate::domain::model::{Category, LogEntry};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

pub const DEFAULT_CAPACITY: usize = 1000;

/// Append-only record of processed messages, bounded to `capacity` entries.
/// Once full, the oldest entry is dropped for each new one.
pub struct ActivityLog {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogSummary {
    pub total: usize,
    pub positive_feedback: usize,
    pub negative_feedback: usize,
    pub queries: usize,
    pub classified_by_service: usize,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))),
            capacity,
        }
    }

    // Each mutation is a single VecDeque call, so a poisoned guard is still consistent.
    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn append(&self, entry: LogEntry) {
        let mut entries = self.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.lock().clear();
        tracing::info!("🧹 Activity log cleared");
    }

    pub fn summary(&self) -> LogSummary {
        self.lock()
            .iter()
            .fold(LogSummary::default(), |mut summary, entry| {
                summary.total += 1;
                match entry.classification {
                    Category::PositiveFeedback => summary.positive_feedback += 1,
                    Category::NegativeFeedback => summary.negative_feedback += 1,
                    Category::Query => summary.queries += 1,
                }
                if entry.using_service {
                    summary.classified_by_service += 1;
                }
                summary
            })
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
