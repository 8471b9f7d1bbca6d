//! Log verifier
//!
//! Polls a sink until it holds a batch, then compares that batch with an
//! expectation after clearing volatile fields on both sides.
//!
//! Absence means delivery is still in flight and is retried up to the
//! policy's attempt budget. A batch that is present but wrong fails at once.

use std::sync::Arc;

use async_trait::async_trait;
use logsink_client::SinkClient;
use logsink_core::LogBatch;
use logsink_server::SinkState;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::VerifyPolicy;

/// Boxed error returned by a [`BatchSource`]
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Anything that can report the sink's current batch without blocking for one
#[async_trait]
pub trait BatchSource: Send + Sync {
    async fn read_current_batch(&self) -> Result<Option<Arc<LogBatch>>, SourceError>;
}

#[async_trait]
impl BatchSource for SinkState {
    async fn read_current_batch(&self) -> Result<Option<Arc<LogBatch>>, SourceError> {
        Ok(self.current())
    }
}

#[async_trait]
impl BatchSource for SinkClient {
    async fn read_current_batch(&self) -> Result<Option<Arc<LogBatch>>, SourceError> {
        Ok(self.current_batch().await?.map(Arc::new))
    }
}

/// Successful verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verified {
    /// Number of reads it took, including the matching one
    pub attempts: u32,
}

/// Why verification failed
#[derive(Debug, Error)]
pub enum VerifyError {
    /// No batch arrived within the attempt budget
    #[error("timed out waiting for log delivery after {attempts} attempt(s)")]
    TimedOut { attempts: u32 },

    /// A batch arrived but differs from the expectation once normalized
    #[error("log batch mismatch\n  want: {expected:?}\n  got:  {actual:?}")]
    Mismatch {
        expected: LogBatch,
        actual: LogBatch,
    },

    /// Verification was cancelled before a batch arrived
    #[error("log verification cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },

    /// The sink could not be read
    #[error("failed to read current log batch: {0}")]
    Source(#[source] SourceError),
}

impl VerifyError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch { .. })
    }
}

/// Verifies that `source` holds a batch matching `expected`
pub async fn verify<S>(
    expected: &LogBatch,
    source: &S,
    policy: &VerifyPolicy,
) -> Result<Verified, VerifyError>
where
    S: BatchSource + ?Sized,
{
    verify_until(expected, source, policy, &CancellationToken::new()).await
}

/// Same as [`verify`], but gives up early once `cancel` fires
///
/// Cancellation is observed while sleeping between attempts, never in the
/// middle of a read.
pub async fn verify_until<S>(
    expected: &LogBatch,
    source: &S,
    policy: &VerifyPolicy,
    cancel: &CancellationToken,
) -> Result<Verified, VerifyError>
where
    S: BatchSource + ?Sized,
{
    let expected = expected.normalized();

    for attempt in 1..=policy.max_attempts {
        let current = source
            .read_current_batch()
            .await
            .map_err(VerifyError::Source)?;

        if let Some(batch) = current {
            let actual = batch.normalized();
            if actual == expected {
                info!(
                    "Log batch with {} entries verified on attempt {}",
                    actual.len(),
                    attempt
                );
                return Ok(Verified { attempts: attempt });
            }

            warn!("Log batch received on attempt {} does not match", attempt);
            return Err(VerifyError::Mismatch { expected, actual });
        }

        debug!(
            "No log batch received yet (attempt {}/{}), retrying in {:?}",
            attempt, policy.max_attempts, policy.poll_interval
        );

        if cancel.is_cancelled() {
            return Err(VerifyError::Cancelled { attempts: attempt });
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(VerifyError::Cancelled { attempts: attempt });
            }
            _ = tokio::time::sleep(policy.poll_interval) => {}
        }
    }

    Err(VerifyError::TimedOut {
        attempts: policy.max_attempts,
    })
}
