//! Core domain types
//!
//! These types describe what a remote peer reports to the sink and what the
//! verifier compares against. They are shared between the server (which stores
//! them) and the harness (which asserts on them).

pub mod log;
