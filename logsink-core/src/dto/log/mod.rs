//! Log DTOs for the sink wire protocol

use serde::{Deserialize, Serialize};

use crate::domain::log::LogBatch;

/// Acknowledgment returned by `POST /log/write`
///
/// Carries no payload; serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteLogResponse {}

/// Snapshot of the sink's current-batch slot, returned by `GET /log/current`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentBatch {
    pub batch: Option<LogBatch>,
}
