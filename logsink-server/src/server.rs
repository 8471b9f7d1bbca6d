//! Sink service lifecycle
//!
//! Binds the listener, serves the API on a background task and tears it down
//! on request.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api;
use crate::config::ServerConfig;
use crate::error::{Result, SinkError};
use crate::state::SinkState;

/// A sink that has not been started yet
#[derive(Debug, Clone)]
pub struct SinkService {
    config: ServerConfig,
    state: SinkState,
}

impl SinkService {
    /// Creates a sink with a fresh, empty slot
    pub fn new(config: ServerConfig) -> Self {
        Self::with_state(config, SinkState::new())
    }

    /// Creates a sink that writes into an existing slot
    ///
    /// Lets a verifier hold the state before the sink is started.
    pub fn with_state(config: ServerConfig, state: SinkState) -> Self {
        Self { config, state }
    }

    /// Handle to the slot this sink writes into
    pub fn state(&self) -> &SinkState {
        &self.state
    }

    /// Binds the listener and starts serving in the background
    ///
    /// Returns as soon as the port is bound. A bind failure is returned as
    /// [`SinkError::Bind`], which callers must treat as fatal.
    pub async fn start(self) -> Result<SinkHandle> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| SinkError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Log sink listening on {}", local_addr);

        let app = api::create_router(self.state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    // A dropped sender also counts as a shutdown request
                    let _ = shutdown_rx.await;
                })
                .await
        });

        Ok(SinkHandle {
            local_addr,
            state: self.state,
            shutdown_grace: self.config.shutdown_grace,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }
}

/// A running sink
///
/// Dropping the handle without calling [`SinkHandle::stop`] still signals
/// shutdown and aborts the serving task.
#[derive(Debug)]
pub struct SinkHandle {
    local_addr: SocketAddr,
    state: SinkState,
    shutdown_grace: Duration,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<std::io::Result<()>>>,
}

impl SinkHandle {
    /// Address the listener is actually bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Base URL for HTTP clients, always pointing at loopback for wildcard binds
    pub fn url(&self) -> String {
        let mut addr = self.local_addr;
        if addr.ip().is_unspecified() {
            addr.set_ip(std::net::Ipv4Addr::LOCALHOST.into());
        }
        format!("http://{}", addr)
    }

    /// Handle to the slot this sink writes into
    pub fn state(&self) -> &SinkState {
        &self.state
    }

    /// Whether the serving task is still running
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops accepting connections and releases the listener
    ///
    /// In-flight writes get `shutdown_grace` to complete; after that the
    /// server task is aborted. Calling `stop` more than once is a no-op.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        let Some(mut task) = self.task.take() else {
            return Ok(());
        };

        match tokio::time::timeout(self.shutdown_grace, &mut task).await {
            Ok(Ok(Ok(()))) => {
                tracing::info!("Log sink on {} stopped", self.local_addr);
                Ok(())
            }
            Ok(Ok(Err(e))) => Err(SinkError::Serve(e)),
            Ok(Err(e)) => {
                tracing::error!("Log sink task failed: {}", e);
                Ok(())
            }
            Err(_) => {
                tracing::warn!(
                    "Log sink on {} did not drain within {:?}, aborting",
                    self.local_addr,
                    self.shutdown_grace
                );
                task.abort();
                // Wait for the cancelled task to drop the listener
                let _ = task.await;
                Ok(())
            }
        }
    }
}

impl Drop for SinkHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
