//! Serve command
//!
//! Runs a log sink in the foreground until Ctrl-C.

use std::net::IpAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use logsink_server::{ServerConfig, SinkService};

/// Arguments for `logsink serve`
#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on (0 picks a free port)
    #[arg(short, long, env = "LOGSINK_PORT", default_value_t = logsink_server::config::DEFAULT_PORT)]
    port: u16,

    /// Address to bind
    #[arg(long, env = "LOGSINK_BIND_ADDR", default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Grace period for in-flight writes on shutdown, in milliseconds
    #[arg(long, env = "LOGSINK_SHUTDOWN_GRACE_MS", default_value_t = 5000)]
    grace_ms: u64,
}

/// Start a sink and block until interrupted
pub async fn handle_serve(args: ServeArgs) -> Result<()> {
    let config = ServerConfig {
        bind_ip: args.bind,
        port: args.port,
        shutdown_grace: Duration::from_millis(args.grace_ms),
    };
    config.validate()?;
    tracing::debug!("Sink configuration: {:?}", config);

    let mut sink = SinkService::new(config)
        .start()
        .await
        .context("Failed to start log sink")?;

    println!(
        "{} Log sink listening on {}",
        "✓".green(),
        sink.local_addr().to_string().bold()
    );
    println!("  Press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    tracing::info!("Shutdown requested");
    sink.stop().await?;

    let writes = sink.state().write_count();
    println!(
        "{} Log sink stopped after {} write(s)",
        "✓".green(),
        writes
    );

    Ok(())
}
