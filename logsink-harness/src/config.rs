//! Verification policy
//!
//! How long the verifier keeps polling for a batch. Defaults match a test
//! that tolerates up to twenty seconds of delivery delay.

use std::time::Duration;

/// Default number of poll attempts
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Default pause between poll attempts
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Bounded retry policy for [`crate::verifier::verify`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyPolicy {
    /// Maximum number of times the sink is read while no batch is present
    pub max_attempts: u32,

    /// Pause after each read that found no batch
    pub poll_interval: Duration,
}

impl VerifyPolicy {
    pub fn new(max_attempts: u32, poll_interval: Duration) -> Self {
        Self {
            max_attempts,
            poll_interval,
        }
    }

    /// Creates a policy from environment variables
    ///
    /// Expected environment variables:
    /// - LOGSINK_VERIFY_ATTEMPTS (optional, default: 20)
    /// - LOGSINK_VERIFY_INTERVAL_MS (optional, milliseconds, default: 1000)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(
            std::env::var("LOGSINK_VERIFY_ATTEMPTS").ok().as_deref(),
            std::env::var("LOGSINK_VERIFY_INTERVAL_MS").ok().as_deref(),
        )
    }

    fn from_vars(attempts: Option<&str>, interval_ms: Option<&str>) -> anyhow::Result<Self> {
        let mut policy = Self::default();

        if let Some(attempts) = attempts {
            policy.max_attempts = attempts.parse().map_err(|e| {
                anyhow::anyhow!("invalid LOGSINK_VERIFY_ATTEMPTS '{}': {}", attempts, e)
            })?;
        }

        if let Some(interval_ms) = interval_ms {
            let millis: u64 = interval_ms.parse().map_err(|e| {
                anyhow::anyhow!("invalid LOGSINK_VERIFY_INTERVAL_MS '{}': {}", interval_ms, e)
            })?;
            policy.poll_interval = Duration::from_millis(millis);
        }

        Ok(policy)
    }

    /// Upper bound on the time spent waiting for a batch
    pub fn budget(&self) -> Duration {
        self.poll_interval * self.max_attempts
    }

    /// Validates the policy
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_attempts == 0 {
            anyhow::bail!("max_attempts must be greater than 0");
        }

        Ok(())
    }
}

impl Default for VerifyPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = VerifyPolicy::default();
        assert_eq!(policy.max_attempts, 20);
        assert_eq!(policy.poll_interval, Duration::from_secs(1));
        assert_eq!(policy.budget(), Duration::from_secs(20));
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let policy = VerifyPolicy::new(0, Duration::from_millis(10));
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_policy_from_vars() {
        assert_eq!(
            VerifyPolicy::from_vars(None, None).unwrap(),
            VerifyPolicy::default()
        );

        let policy = VerifyPolicy::from_vars(Some("5"), Some("250")).unwrap();
        assert_eq!(policy, VerifyPolicy::new(5, Duration::from_millis(250)));
    }

    #[test]
    fn test_unparseable_vars_rejected() {
        let err = VerifyPolicy::from_vars(Some("many"), None).unwrap_err();
        assert!(err.to_string().contains("LOGSINK_VERIFY_ATTEMPTS"));

        let err = VerifyPolicy::from_vars(None, Some("-1")).unwrap_err();
        assert!(err.to_string().contains("LOGSINK_VERIFY_INTERVAL_MS"));
    }
}
