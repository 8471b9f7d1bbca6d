//! Service Module
//!
//! Business logic layer for the sink.

pub mod log;

// Re-export for convenience
pub use log as log_service;
