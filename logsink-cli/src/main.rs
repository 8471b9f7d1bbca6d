//! Logsink CLI
//!
//! Command-line interface for running a log sink, delivering batches to it
//! and verifying what it received.

mod batch_file;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log filter used when `RUST_LOG` is not set
const DEFAULT_LOG_FILTER: &str =
    "logsink=info,logsink_server=info,tower_http=info,logsink_harness=warn";

#[derive(Parser)]
#[command(name = "logsink")]
#[command(about = "Log sink for verifying structured log delivery", long_about = None)]
struct Cli {
    /// Log sink URL
    #[arg(long, env = "LOGSINK_URL", default_value = "http://localhost:20001")]
    sink_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config {
        sink_url: cli.sink_url,
    };

    handle_command(cli.command, &config).await
}
