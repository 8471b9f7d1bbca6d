//! Logsink Server
//!
//! A network endpoint that accepts log batches from a remote peer and keeps
//! the most recent one for inspection.
//!
//! - `state`: the shared current-batch slot
//! - `api`: HTTP handlers (`POST /log/write`, `GET /log/current`, `GET /health`)
//! - `server`: start/stop lifecycle around the axum server

pub mod api;
pub mod config;
pub mod error;
pub mod server;
pub mod service;
pub mod state;

pub use config::ServerConfig;
pub use error::{Result, SinkError};
pub use server::{SinkHandle, SinkService};
pub use state::SinkState;
