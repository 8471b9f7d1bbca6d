//! Log API Handlers
//!
//! The inbound write path used by remote peers and the read path used by
//! out-of-process verifiers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use logsink_core::LogBatch;
use logsink_core::dto::log::{CurrentBatch, WriteLogResponse};

use crate::api::error::ApiResult;
use crate::service::log_service;
use crate::state::SinkState;

/// POST /log/write
/// Replace the current batch with the one in the request body
///
/// A body that does not decode is rejected before the slot is touched.
pub async fn write_log(
    State(state): State<SinkState>,
    payload: Result<Json<LogBatch>, JsonRejection>,
) -> ApiResult<Json<WriteLogResponse>> {
    let Json(batch) = payload?;

    tracing::info!("Received log batch with {} entries", batch.len());

    log_service::write_batch(&state, batch);

    Ok(Json(WriteLogResponse {}))
}

/// GET /log/current
/// Get the most recently written batch, `null` before the first write
pub async fn current_log(State(state): State<SinkState>) -> Json<CurrentBatch> {
    let batch = log_service::current_batch(&state).map(|batch| batch.as_ref().clone());

    Json(CurrentBatch { batch })
}
