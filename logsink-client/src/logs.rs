//! Log endpoints of the sink API

use logsink_core::LogBatch;
use logsink_core::dto::log::{CurrentBatch, WriteLogResponse};

use crate::SinkClient;
use crate::error::Result;

impl SinkClient {
    // =============================================================================
    // Log Delivery
    // =============================================================================

    /// Deliver a batch to the sink, replacing whatever it currently holds
    ///
    /// # Example
    /// ```no_run
    /// # use logsink_client::SinkClient;
    /// # use logsink_core::{LogBatch, LogEntry};
    /// # async fn example() -> logsink_client::Result<()> {
    /// let client = SinkClient::new("http://localhost:20001");
    /// client.write_log(&LogBatch::new(vec![LogEntry::default()])).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn write_log(&self, batch: &LogBatch) -> Result<()> {
        let url = format!("{}/log/write", self.base_url);
        let response = self.client.post(&url).json(batch).send().await?;

        let _ack: WriteLogResponse = self.handle_response(response).await?;
        Ok(())
    }

    /// Get the batch the sink currently holds, `None` before the first write
    pub async fn current_batch(&self) -> Result<Option<LogBatch>> {
        let url = format!("{}/log/current", self.base_url);
        let response = self.client.get(&url).send().await?;

        let current: CurrentBatch = self.handle_response(response).await?;
        Ok(current.batch)
    }

    // =============================================================================
    // Health
    // =============================================================================

    /// Check that the sink is accepting requests
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_empty_response(response).await
    }
}
