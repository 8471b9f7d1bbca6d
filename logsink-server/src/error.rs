//! Error types for the sink service

use std::net::SocketAddr;

use thiserror::Error;

/// Result type alias for sink lifecycle operations
pub type Result<T> = std::result::Result<T, SinkError>;

/// Errors raised while starting or stopping the sink
#[derive(Debug, Error)]
pub enum SinkError {
    /// The listening port could not be bound; the scenario cannot proceed
    #[error("failed to bind log sink on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The server loop terminated with an I/O error
    #[error("log sink server failed: {0}")]
    Serve(#[from] std::io::Error),
}

impl SinkError {
    /// Whether the error is fatal for the scenario that owns the sink
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Bind { .. })
    }
}
