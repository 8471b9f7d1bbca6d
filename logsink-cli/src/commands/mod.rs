//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod log;
mod serve;

pub use log::LogCommands;
pub use serve::ServeArgs;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a log sink until interrupted
    Serve(ServeArgs),
    /// Deliver, inspect and verify log batches
    Log {
        #[command(subcommand)]
        command: LogCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Serve(args) => serve::handle_serve(args).await,
        Commands::Log { command } => log::handle_log_command(command, config).await,
    }
}
