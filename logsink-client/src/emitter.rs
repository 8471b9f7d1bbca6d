//! Batching log emitter
//!
//! The reporting side of the sink protocol. Entries are appended to an open
//! batch; once the batch reaches `flush_threshold` entries it is sealed and
//! queued. A background ticker sends every queued batch each
//! `flush_interval`, and [`EmitterHandle::shutdown`] sends whatever is left.
//!
//! A batch whose delivery fails is logged and dropped. Delivery is never
//! retried.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use logsink_core::{LogBatch, LogEntry};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::SinkClient;
use crate::error::{ClientError, Result};

/// Delivers a sealed batch somewhere
#[async_trait]
pub trait LogSender: Send + Sync {
    async fn send(&self, batch: &LogBatch) -> Result<()>;
}

#[async_trait]
impl LogSender for SinkClient {
    async fn send(&self, batch: &LogBatch) -> Result<()> {
        self.write_log(batch).await
    }
}

/// Emitter configuration
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// Number of entries after which the open batch is sealed
    pub flush_threshold: usize,

    /// How often queued batches are sent
    pub flush_interval: Duration,
}

impl EmitterConfig {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.flush_threshold == 0 {
            return Err(ClientError::InvalidConfig(
                "flush_threshold must be greater than 0".to_string(),
            ));
        }
        if self.flush_interval.is_zero() {
            return Err(ClientError::InvalidConfig(
                "flush_interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            flush_threshold: 500,
            flush_interval: Duration::from_secs(10),
        }
    }
}

/// Outcome of sending the queued batches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub sent: usize,
    pub failed: usize,
}

impl std::ops::Add for FlushReport {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            sent: self.sent + other.sent,
            failed: self.failed + other.failed,
        }
    }
}

#[derive(Debug, Default)]
struct Buffer {
    open: Vec<LogEntry>,
    queued: Vec<LogBatch>,
}

impl Buffer {
    fn seal(&mut self) {
        if !self.open.is_empty() {
            let entries = std::mem::take(&mut self.open);
            self.queued.push(LogBatch::new(entries));
        }
    }
}

/// Collects entries into batches and delivers them through a [`LogSender`]
pub struct LogEmitter<S> {
    sender: S,
    config: EmitterConfig,
    buffer: Mutex<Buffer>,
}

impl<S: LogSender> LogEmitter<S> {
    /// Creates an emitter that does not send anything until flushed
    pub fn new(sender: S, config: EmitterConfig) -> Self {
        Self {
            sender,
            config,
            buffer: Mutex::new(Buffer::default()),
        }
    }

    /// Appends an entry to the open batch, sealing it at the threshold
    pub fn record(&self, entry: LogEntry) {
        let mut buffer = self.lock();
        buffer.open.push(entry);
        if buffer.open.len() >= self.config.flush_threshold {
            buffer.seal();
        }
    }

    /// Number of sealed batches waiting to be sent
    pub fn queued(&self) -> usize {
        self.lock().queued.len()
    }

    /// Number of entries in the open batch
    pub fn pending_entries(&self) -> usize {
        self.lock().open.len()
    }

    /// Sends every sealed batch, leaving the open batch alone
    pub async fn send_queued(&self) -> FlushReport {
        let batches = std::mem::take(&mut self.lock().queued);
        let mut report = FlushReport::default();

        for batch in batches {
            match self.sender.send(&batch).await {
                Ok(()) => {
                    debug!("Sent log batch with {} entries", batch.len());
                    report.sent += 1;
                }
                Err(e) => {
                    warn!("Failed to send log batch ({} entries): {}", batch.len(), e);
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Seals the open batch and sends everything queued
    pub async fn flush(&self) -> FlushReport {
        self.lock().seal();
        self.send_queued().await
    }

    fn lock(&self) -> MutexGuard<'_, Buffer> {
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S: LogSender + 'static> LogEmitter<S> {
    /// Starts the periodic flush loop
    ///
    /// Fails if the configuration is invalid; nothing is spawned in that case.
    pub fn start(self) -> Result<EmitterHandle<S>> {
        self.config.validate()?;

        let emitter = Arc::new(self);
        let cancel = CancellationToken::new();
        let ticker = Self::spawn_ticker(Arc::clone(&emitter), cancel.clone());
        Ok(EmitterHandle {
            emitter,
            cancel,
            ticker,
        })
    }

    /// Flushes on every tick until cancelled
    ///
    /// Cancellation is only observed between ticks, so a send in progress
    /// always completes. The task returns the report of a flush that was
    /// still running when cancellation was requested.
    fn spawn_ticker(emitter: Arc<Self>, cancel: CancellationToken) -> JoinHandle<FlushReport> {
        let interval = emitter.config.flush_interval;

        tokio::spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return FlushReport::default(),
                    _ = ticker.tick() => {}
                }

                let report = emitter.flush().await;
                if cancel.is_cancelled() {
                    return report;
                }
                if report.sent + report.failed > 0 {
                    debug!(
                        "Periodic flush: {} sent, {} failed",
                        report.sent, report.failed
                    );
                }
            }
        })
    }
}

/// A started emitter
pub struct EmitterHandle<S> {
    emitter: Arc<LogEmitter<S>>,
    cancel: CancellationToken,
    ticker: JoinHandle<FlushReport>,
}

impl<S: LogSender + 'static> EmitterHandle<S> {
    /// Appends an entry to the open batch
    pub fn record(&self, entry: LogEntry) {
        self.emitter.record(entry);
    }

    /// Seals and sends immediately instead of waiting for the next tick
    pub async fn flush(&self) -> FlushReport {
        self.emitter.flush().await
    }

    /// Stops the ticker and sends everything that is left
    ///
    /// A periodic flush that is already sending is allowed to finish, and its
    /// batches are counted in the returned report.
    pub async fn shutdown(self) -> FlushReport {
        self.cancel.cancel();
        let in_flight = self.ticker.await.unwrap_or_else(|e| {
            warn!("Log emitter ticker failed: {}", e);
            FlushReport::default()
        });

        let report = in_flight + self.emitter.flush().await;
        info!(
            "Log emitter stopped: {} batch(es) sent, {} failed",
            report.sent, report.failed
        );
        report
    }
}
