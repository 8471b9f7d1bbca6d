//! Log domain types

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed transaction, as reported by the component under test
///
/// The destination, request and response attributes are compared exactly by
/// the verifier. `timestamp`, `latency`, `source_address` and `request_id`
/// vary from run to run and are cleared by [`LogEntry::normalize`] before any
/// comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogEntry {
    pub destination_workload: String,
    pub destination_namespace: String,
    pub destination_address: String,
    pub host: String,
    pub path: String,
    pub response_code: i64,
    pub referer: String,
    pub user_agent: String,

    // Volatile fields
    pub timestamp: Option<DateTime<Utc>>,
    pub latency: Option<Duration>,
    pub source_address: String,
    pub request_id: String,
}

impl LogEntry {
    /// Clears every volatile field in place
    pub fn normalize(&mut self) {
        self.timestamp = None;
        self.latency = None;
        self.source_address.clear();
        self.request_id.clear();
    }

    /// Returns a copy with volatile fields cleared
    pub fn normalized(&self) -> Self {
        let mut entry = self.clone();
        entry.normalize();
        entry
    }

    /// Whether all volatile fields already hold their zero value
    pub fn is_normalized(&self) -> bool {
        self.timestamp.is_none()
            && self.latency.is_none()
            && self.source_address.is_empty()
            && self.request_id.is_empty()
    }
}

/// An ordered set of entries delivered in a single write call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogBatch {
    #[serde(default)]
    pub log_entries: Vec<LogEntry>,
}

impl LogBatch {
    pub fn new(log_entries: Vec<LogEntry>) -> Self {
        Self { log_entries }
    }

    pub fn len(&self) -> usize {
        self.log_entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log_entries.is_empty()
    }

    /// Returns a copy of the batch with every entry normalized
    ///
    /// The receiver is left untouched so that a stored batch can be verified
    /// more than once.
    pub fn normalized(&self) -> Self {
        Self {
            log_entries: self.log_entries.iter().map(LogEntry::normalized).collect(),
        }
    }

    /// Structural equality once volatile fields are ignored on both sides
    pub fn matches(&self, other: &LogBatch) -> bool {
        self.log_entries.len() == other.log_entries.len()
            && self
                .log_entries
                .iter()
                .zip(&other.log_entries)
                .all(|(a, b)| a.normalized() == b.normalized())
    }
}

impl From<Vec<LogEntry>> for LogBatch {
    fn from(log_entries: Vec<LogEntry>) -> Self {
        Self::new(log_entries)
    }
}

impl FromIterator<LogEntry> for LogBatch {
    fn from_iter<I: IntoIterator<Item = LogEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
