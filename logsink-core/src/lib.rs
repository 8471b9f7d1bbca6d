//! Logsink Core
//!
//! Core types shared by the log sink, its clients and the verification harness.
//!
//! This crate contains:
//! - Domain types: log entries, batches and their normalization
//! - DTOs: wire payloads exchanged with the sink service

pub mod domain;
pub mod dto;

pub use domain::log::{LogBatch, LogEntry};
