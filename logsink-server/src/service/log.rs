//! Log Service
//!
//! Stores inbound batches in the sink's slot and serves them back.

use std::sync::Arc;

use logsink_core::LogBatch;

use crate::state::SinkState;

/// Store an inbound batch, discarding whatever was there before
pub fn write_batch(state: &SinkState, batch: LogBatch) {
    let entries = batch.len();
    let writes = state.replace(batch);

    if writes > 1 {
        tracing::warn!(
            "Log batch #{} replaced an earlier batch; only the latest is retained",
            writes
        );
    }

    tracing::debug!("Stored log batch with {} entries", entries);
}

/// Get the batch currently held by the sink
pub fn current_batch(state: &SinkState) -> Option<Arc<LogBatch>> {
    state.current()
}
