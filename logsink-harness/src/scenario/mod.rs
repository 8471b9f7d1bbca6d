//! Scenario driver
//!
//! A scenario is an ordered list of steps. Steps run one after another; the
//! first failure stops the run. Every step that ran successfully is then
//! cleaned up in reverse order, whether the scenario passed or not.

mod steps;

pub use steps::{SendBatch, SinkEndpoint, SinkStep, Sleep, VerifyLogs};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{error, info};

/// One setup, action or assertion in a scenario
#[async_trait]
pub trait Step: Send {
    /// Short label used in logs and error messages
    fn name(&self) -> &str;

    /// Performs the step
    async fn run(&mut self) -> Result<()>;

    /// Releases whatever `run` acquired
    async fn cleanup(&mut self) {}
}

/// Ordered list of steps
#[derive(Default)]
pub struct Scenario {
    steps: Vec<Box<dyn Step>>,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step
    pub fn step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step in order and cleans up afterwards
    pub async fn run(mut self) -> Result<()> {
        let total = self.steps.len();
        let mut completed = 0;
        let mut outcome = Ok(());

        for (i, step) in self.steps.iter_mut().enumerate() {
            info!("Running step {}/{}: {}", i + 1, total, step.name());

            if let Err(e) = step
                .run()
                .await
                .with_context(|| format!("step {} ({}) failed", i + 1, step.name()))
            {
                error!("{:#}", e);
                outcome = Err(e);
                break;
            }

            completed += 1;
        }

        for step in self.steps[..completed].iter_mut().rev() {
            info!("Cleaning up step: {}", step.name());
            step.cleanup().await;
        }

        outcome
    }
}
