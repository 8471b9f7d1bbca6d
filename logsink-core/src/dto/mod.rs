//! Data Transfer Objects for the sink wire protocol
//!
//! Payloads exchanged between remote peers, the sink service and the
//! verification tooling over HTTP/JSON.

pub mod log;
