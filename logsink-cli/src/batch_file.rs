//! Batch files
//!
//! Reads log batches from JSON files. A file holds either a full batch
//! (`{"log_entries": [...]}`) or a bare array of entries.

use std::path::Path;

use anyhow::{Context, Result};
use logsink_core::{LogBatch, LogEntry};
use serde_json::Value as JsonValue;

/// Load a batch from a JSON file
pub fn load(path: &Path) -> Result<LogBatch> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file: {}", path.display()))?;

    parse(&content).with_context(|| format!("Invalid batch file: {}", path.display()))
}

/// Parse a batch from JSON text
pub fn parse(content: &str) -> Result<LogBatch> {
    let value: JsonValue = serde_json::from_str(content).context("Not valid JSON")?;

    let batch = if value.is_array() {
        LogBatch::new(serde_json::from_value::<Vec<LogEntry>>(value)?)
    } else {
        serde_json::from_value(value)?
    };

    Ok(batch)
}

/// Fill empty timestamps and request ids with fresh values
///
/// Makes a hand-written batch look like one reported by a live peer. Latency
/// and source address are left as written.
pub fn stamp(batch: &mut LogBatch) {
    for entry in &mut batch.log_entries {
        entry.timestamp.get_or_insert_with(chrono::Utc::now);
        if entry.request_id.is_empty() {
            entry.request_id = uuid::Uuid::new_v4().to_string();
        }
    }
}
