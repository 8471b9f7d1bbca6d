//! Configuration module
//!
//! Settings shared by every CLI command.

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the log sink
    pub sink_url: String,
}
