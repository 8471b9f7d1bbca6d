//! Sink state
//!
//! The single current-batch slot shared between the inbound write handler and
//! whoever verifies the sink. Handles are cheap to clone and all clones observe
//! the same slot.

use std::sync::{Arc, Mutex, MutexGuard};

use logsink_core::LogBatch;

#[derive(Debug, Default)]
struct Slot {
    batch: Option<Arc<LogBatch>>,
    writes: u64,
}

/// Owned handle to the sink's current-batch slot
///
/// Every access goes through [`SinkState::replace`] or [`SinkState::current`],
/// each of which holds the lock only for a pointer swap or clone.
#[derive(Debug, Clone, Default)]
pub struct SinkState {
    slot: Arc<Mutex<Slot>>,
}

impl SinkState {
    /// Creates an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored batch wholesale, discarding any previous one
    ///
    /// Returns the number of writes observed so far, including this one.
    pub fn replace(&self, batch: LogBatch) -> u64 {
        let batch = Arc::new(batch);
        let (discarded, writes) = {
            let mut slot = self.lock();
            slot.writes += 1;
            (slot.batch.replace(batch), slot.writes)
        };
        // Freed outside the critical section
        drop(discarded);
        writes
    }

    /// Returns the most recently written batch, or `None` before the first write
    ///
    /// Never waits for a batch to arrive.
    pub fn current(&self) -> Option<Arc<LogBatch>> {
        self.lock().batch.clone()
    }

    /// Number of batches written since the slot was created
    pub fn write_count(&self) -> u64 {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        // Critical sections never panic midway, so a poisoned slot is still consistent.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logsink_core::LogEntry;
    use std::thread;

    fn batch_of(code: i64, len: usize) -> LogBatch {
        (0..len)
            .map(|_| LogEntry {
                destination_workload: "echo-server".to_string(),
                response_code: code,
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_empty_before_first_write() {
        let state = SinkState::new();
        assert!(state.current().is_none());
        assert_eq!(state.write_count(), 0);
    }

    #[test]
    fn test_replace_overwrites_previous_batch() {
        let state = SinkState::new();
        state.replace(batch_of(200, 1));
        let writes = state.replace(batch_of(404, 2));

        let current = state.current().unwrap();
        assert_eq!(writes, 2);
        assert_eq!(current.len(), 2);
        assert_eq!(current.log_entries[0].response_code, 404);
    }

    #[test]
    fn test_clones_share_the_slot() {
        let state = SinkState::new();
        let writer = state.clone();
        writer.replace(batch_of(200, 1));
        assert_eq!(state.current().unwrap().len(), 1);
    }

    #[test]
    fn test_readers_never_observe_partial_batches() {
        let state = SinkState::new();

        let writers: Vec<_> = (1..=4)
            .map(|w| {
                let state = state.clone();
                thread::spawn(move || {
                    for i in 0..200 {
                        // Each batch is homogeneous: every entry carries the same code
                        // and the length is derived from it.
                        let code = w * 1000 + i;
                        state.replace(batch_of(code, (code % 7 + 1) as usize));
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let state = state.clone();
                thread::spawn(move || {
                    for _ in 0..500 {
                        if let Some(batch) = state.current() {
                            let code = batch.log_entries[0].response_code;
                            assert_eq!(batch.len(), (code % 7 + 1) as usize);
                            assert!(batch.log_entries.iter().all(|e| e.response_code == code));
                        }
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }

        assert_eq!(state.write_count(), 800);
    }
}
