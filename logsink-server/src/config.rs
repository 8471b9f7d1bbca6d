//! Sink service configuration
//!
//! Listening address and shutdown behaviour, loaded from the environment
//! with defaults suitable for a local test run.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Port used when none is configured
pub const DEFAULT_PORT: u16 = 20001;

/// Sink service configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind_ip: IpAddr,

    /// Port to listen on; 0 picks an ephemeral port
    pub port: u16,

    /// How long `stop` lets in-flight writes finish before aborting the server
    pub shutdown_grace: Duration,
}

impl ServerConfig {
    /// Creates a configuration listening on all interfaces at `port`
    pub fn new(port: u16) -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port,
            shutdown_grace: Duration::from_secs(5),
        }
    }

    /// Loopback-only configuration, used by in-process scenarios and tests
    pub fn localhost(port: u16) -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            ..Self::new(port)
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - LOGSINK_BIND_ADDR (optional, default: 0.0.0.0)
    /// - LOGSINK_PORT (optional, default: 20001)
    /// - LOGSINK_SHUTDOWN_GRACE_MS (optional, milliseconds, default: 5000)
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::new(DEFAULT_PORT);

        if let Ok(addr) = std::env::var("LOGSINK_BIND_ADDR") {
            config.bind_ip = addr
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid LOGSINK_BIND_ADDR '{}': {}", addr, e))?;
        }

        if let Ok(port) = std::env::var("LOGSINK_PORT") {
            config.port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid LOGSINK_PORT '{}': {}", port, e))?;
        }

        if let Ok(grace) = std::env::var("LOGSINK_SHUTDOWN_GRACE_MS") {
            config.shutdown_grace = parse_grace_ms(&grace)?;
        }

        Ok(config)
    }

    /// Overrides the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Socket address the listener binds to
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.shutdown_grace.is_zero() {
            anyhow::bail!("shutdown_grace must be greater than 0");
        }

        Ok(())
    }
}

fn parse_grace_ms(value: &str) -> anyhow::Result<Duration> {
    let millis: u64 = value
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid LOGSINK_SHUTDOWN_GRACE_MS '{}': {}", value, e))?;
    Ok(Duration::from_millis(millis))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.shutdown_grace, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_localhost_config() {
        let config = ServerConfig::localhost(0);
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:0");
    }

    #[test]
    fn test_config_validation() {
        let mut config = ServerConfig::default().with_port(9000);
        assert_eq!(config.port, 9000);

        config.shutdown_grace = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_grace_period_parsing() {
        assert_eq!(parse_grace_ms("250").unwrap(), Duration::from_millis(250));

        let err = parse_grace_ms("5s").unwrap_err();
        assert!(err.to_string().contains("LOGSINK_SHUTDOWN_GRACE_MS"));
    }
}
