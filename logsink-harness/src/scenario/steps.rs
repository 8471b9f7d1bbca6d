//! Built-in scenario steps

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use logsink_client::SinkClient;
use logsink_core::LogBatch;
use logsink_server::{ServerConfig, SinkHandle, SinkService, SinkState};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::Step;
use crate::config::VerifyPolicy;
use crate::verifier::{self, BatchSource};

/// Where a sink can be reached, known once the sink has started
///
/// Steps that talk to a sink are built before the scenario runs, while the
/// port may only be chosen at bind time. They share this handle instead.
#[derive(Debug, Clone, Default)]
pub struct SinkEndpoint {
    url: Arc<OnceLock<String>>,
}

impl SinkEndpoint {
    /// An endpoint for a sink that is already running elsewhere
    pub fn fixed(url: impl Into<String>) -> Self {
        let endpoint = Self::default();
        endpoint.set(url.into());
        endpoint
    }

    /// Base URL of the sink, if it has started
    pub fn url(&self) -> Option<String> {
        self.url.get().cloned()
    }

    fn set(&self, url: String) {
        if self.url.set(url).is_err() {
            warn!("Sink endpoint already resolved; keeping the first address");
        }
    }
}

/// Starts a sink on `run` and stops it on `cleanup`
pub struct SinkStep {
    config: ServerConfig,
    state: SinkState,
    endpoint: SinkEndpoint,
    handle: Option<SinkHandle>,
}

impl SinkStep {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            state: SinkState::new(),
            endpoint: SinkEndpoint::default(),
            handle: None,
        }
    }

    /// The slot the sink will write into, usable before the sink starts
    pub fn state(&self) -> SinkState {
        self.state.clone()
    }

    /// Address of the sink, resolved when the step runs
    pub fn endpoint(&self) -> SinkEndpoint {
        self.endpoint.clone()
    }
}

#[async_trait]
impl Step for SinkStep {
    fn name(&self) -> &str {
        "log sink"
    }

    async fn run(&mut self) -> Result<()> {
        let handle = SinkService::with_state(self.config.clone(), self.state.clone())
            .start()
            .await?;

        self.endpoint.set(handle.url());
        self.handle = Some(handle);
        Ok(())
    }

    async fn cleanup(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            if let Err(e) = handle.stop().await {
                warn!("Failed to stop log sink: {}", e);
            }
        }
    }
}

/// Delivers a batch to a sink, standing in for the component under test
///
/// With a delay the delivery happens in the background and `run` returns
/// immediately, the way a real peer reports on its own schedule.
pub struct SendBatch {
    endpoint: SinkEndpoint,
    batch: LogBatch,
    delay: Option<Duration>,
    task: Option<JoinHandle<Result<()>>>,
}

impl SendBatch {
    pub fn new(endpoint: SinkEndpoint, batch: LogBatch) -> Self {
        Self {
            endpoint,
            batch,
            delay: None,
            task: None,
        }
    }

    /// Deliver in the background after `delay`
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Step for SendBatch {
    fn name(&self) -> &str {
        "send log batch"
    }

    async fn run(&mut self) -> Result<()> {
        let url = self
            .endpoint
            .url()
            .context("log sink has not been started")?;
        let client = SinkClient::new(url);

        let Some(delay) = self.delay else {
            client.write_log(&self.batch).await?;
            return Ok(());
        };

        let batch = self.batch.clone();
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            client.write_log(&batch).await?;
            info!("Delivered delayed log batch with {} entries", batch.len());
            Ok::<_, anyhow::Error>(())
        }));

        Ok(())
    }

    async fn cleanup(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            if let Ok(Err(e)) = task.await {
                warn!("Delayed log delivery failed: {:#}", e);
            }
        }
    }
}

/// Pauses the scenario
pub struct Sleep(pub Duration);

#[async_trait]
impl Step for Sleep {
    fn name(&self) -> &str {
        "sleep"
    }

    async fn run(&mut self) -> Result<()> {
        tokio::time::sleep(self.0).await;
        Ok(())
    }
}

/// Asserts that a sink received the expected batch
pub struct VerifyLogs<S> {
    expected: LogBatch,
    source: S,
    policy: VerifyPolicy,
    cancel: CancellationToken,
}

impl<S: BatchSource> VerifyLogs<S> {
    pub fn new(expected: LogBatch, source: S) -> Self {
        Self {
            expected,
            source,
            policy: VerifyPolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_policy(mut self, policy: VerifyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Stop polling as soon as `cancel` fires
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

#[async_trait]
impl<S: BatchSource + 'static> Step for VerifyLogs<S> {
    fn name(&self) -> &str {
        "verify logs"
    }

    async fn run(&mut self) -> Result<()> {
        verifier::verify_until(&self.expected, &self.source, &self.policy, &self.cancel).await?;
        Ok(())
    }
}
