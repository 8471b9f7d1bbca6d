//! Log command handlers
//!
//! Delivers batches to a sink, prints what it holds and verifies it
//! against an expected batch.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use logsink_client::SinkClient;
use logsink_core::LogEntry;
use logsink_harness::{VerifyError, VerifyPolicy, verify};

use crate::batch_file;
use crate::config::Config;

/// Log subcommands
#[derive(Subcommand)]
pub enum LogCommands {
    /// Deliver a batch from a JSON file
    Send {
        /// Path to a JSON batch file
        file: PathBuf,

        /// Fill empty timestamps and request ids with fresh values
        #[arg(long)]
        stamp: bool,
    },
    /// Print the batch the sink currently holds
    Show {
        /// Print raw JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Wait for a batch and compare it with an expected one
    Verify {
        /// Path to a JSON file with the expected batch
        file: PathBuf,

        /// Maximum number of polls while no batch has arrived
        /// [default: LOGSINK_VERIFY_ATTEMPTS or 20]
        #[arg(long)]
        attempts: Option<u32>,

        /// Pause between polls, in milliseconds
        /// [default: LOGSINK_VERIFY_INTERVAL_MS or 1000]
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

/// Handle log commands
pub async fn handle_log_command(command: LogCommands, config: &Config) -> Result<()> {
    let client = SinkClient::new(&config.sink_url);

    match command {
        LogCommands::Send { file, stamp } => send_batch(&client, file, stamp).await,
        LogCommands::Show { json } => show_batch(&client, json).await,
        LogCommands::Verify {
            file,
            attempts,
            interval_ms,
        } => {
            let policy = resolve_policy(VerifyPolicy::from_env()?, attempts, interval_ms);
            verify_batch(&client, file, policy).await
        }
    }
}

/// Apply command-line overrides on top of the environment policy
fn resolve_policy(
    mut policy: VerifyPolicy,
    attempts: Option<u32>,
    interval_ms: Option<u64>,
) -> VerifyPolicy {
    if let Some(attempts) = attempts {
        policy.max_attempts = attempts;
    }
    if let Some(interval_ms) = interval_ms {
        policy.poll_interval = Duration::from_millis(interval_ms);
    }
    policy
}

/// Deliver a batch read from disk
async fn send_batch(client: &SinkClient, file: PathBuf, stamp: bool) -> Result<()> {
    let mut batch = batch_file::load(&file)?;
    if stamp {
        batch_file::stamp(&mut batch);
    }

    client
        .write_log(&batch)
        .await
        .with_context(|| format!("Failed to deliver batch to {}", client.base_url()))?;

    println!(
        "{} Delivered {} log entr{} to {}",
        "✓".green(),
        batch.len(),
        if batch.len() == 1 { "y" } else { "ies" },
        client.base_url().bold()
    );

    Ok(())
}

/// Print the sink's current batch
async fn show_batch(client: &SinkClient, json: bool) -> Result<()> {
    let Some(batch) = client.current_batch().await? else {
        println!("{}", "No log batch received yet.".yellow());
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("Current batch ({} entries):", batch.len()).bold()
    );
    println!();
    for entry in &batch.log_entries {
        print_entry_summary(entry);
    }

    Ok(())
}

/// Verify the sink's batch against an expected one
async fn verify_batch(client: &SinkClient, file: PathBuf, policy: VerifyPolicy) -> Result<()> {
    policy.validate()?;
    let expected = batch_file::load(&file)?;
    tracing::debug!("Verifying {} entries with {:?}", expected.len(), policy);

    println!(
        "Waiting up to {:?} for a log batch at {}",
        policy.budget(),
        client.base_url()
    );

    match verify(&expected, client, &policy).await {
        Ok(verified) => {
            println!(
                "{} Log batch matched after {} attempt(s)",
                "✓".green(),
                verified.attempts
            );
            Ok(())
        }
        Err(VerifyError::Mismatch { expected, actual }) => {
            println!("{} Log batch does not match", "✗".red());
            println!("{}", "  want:".bold());
            println!("{}", serde_json::to_string_pretty(&expected)?);
            println!("{}", "  got:".bold());
            println!("{}", serde_json::to_string_pretty(&actual)?);
            anyhow::bail!("log batch mismatch")
        }
        Err(e) => {
            println!("{} {}", "✗".red(), e);
            Err(e.into())
        }
    }
}

/// Print a one-entry summary
fn print_entry_summary(entry: &LogEntry) {
    println!(
        "  {} {} {} {}",
        "▸".cyan(),
        colorize_code(entry.response_code),
        entry.host,
        entry.path.bold()
    );
    println!(
        "    Destination:  {}.{} ({})",
        entry.destination_workload, entry.destination_namespace, entry.destination_address
    );
    if let Some(timestamp) = entry.timestamp {
        println!("    Timestamp:    {}", timestamp.to_rfc3339());
    }
    if let Some(latency) = entry.latency {
        println!("    Latency:      {:?}", latency);
    }
    if !entry.source_address.is_empty() {
        println!("    Source:       {}", entry.source_address);
    }
    if !entry.request_id.is_empty() {
        println!("    Request ID:   {}", entry.request_id.dimmed());
    }
    println!();
}

/// Colour a response code by class
fn colorize_code(code: i64) -> ColoredString {
    let text = code.to_string();
    match code {
        200..=299 => text.green(),
        300..=399 => text.cyan(),
        400..=499 => text.yellow(),
        _ => text.red(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colorize_code_keeps_text() {
        colored::control::set_override(false);
        assert_eq!(colorize_code(200).to_string(), "200");
        assert_eq!(colorize_code(503).to_string(), "503");
    }

    #[test]
    fn test_flags_override_policy() {
        let base = VerifyPolicy::new(20, Duration::from_secs(1));

        let policy = resolve_policy(base.clone(), Some(3), None);
        assert_eq!(policy, VerifyPolicy::new(3, Duration::from_secs(1)));

        let policy = resolve_policy(base.clone(), None, Some(250));
        assert_eq!(policy.poll_interval, Duration::from_millis(250));

        assert_eq!(resolve_policy(base.clone(), None, None), base);
    }
}
