//! Logsink Harness
//!
//! Verification side of the log sink: a bounded-retry verifier that asserts
//! a sink received an expected batch, and a small scenario driver that wires
//! sinks, deliveries and verifications into ordered steps.

pub mod config;
pub mod scenario;
pub mod verifier;

pub use config::VerifyPolicy;
pub use scenario::{Scenario, Step};
pub use verifier::{BatchSource, Verified, VerifyError, verify, verify_until};
