//! Logsink HTTP Client
//!
//! A small, type-safe client for the log sink API, plus a batching
//! [`emitter`] that plays the reporting side of the protocol.
//!
//! # Example
//!
//! ```no_run
//! use logsink_client::SinkClient;
//!
//! #[tokio::main]
//! async fn main() -> logsink_client::Result<()> {
//!     let client = SinkClient::new("http://localhost:20001");
//!
//!     if let Some(batch) = client.current_batch().await? {
//!         println!("Sink holds {} entries", batch.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod emitter;
pub mod error;
mod logs;

// Re-export commonly used types
pub use emitter::{EmitterConfig, EmitterHandle, FlushReport, LogEmitter, LogSender};
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the log sink API
#[derive(Debug, Clone)]
pub struct SinkClient {
    /// Base URL of the sink (e.g., "http://localhost:20001")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl SinkClient {
    /// Create a new sink client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the sink (e.g., "http://localhost:20001")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new sink client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the sink
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize the JSON body on success
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Check the status code of a response whose body is not needed
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}
