//! Server configuration
//!
//! Built-in defaults overlaid with the listen address given on the command
//! line. No file or environment variable is consulted.

use config::{Config, ConfigError};
use serde::Deserialize;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

/// Receive buffer per relay pass, matching the largest read a client makes.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5;
pub const DEFAULT_ACCEPT_BACKOFF_MS: u64 = 100;

/// Server configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_address: Ipv4Addr,
    pub port: u16,

    /// Upper bound on the bytes taken from one connection per pass
    pub buffer_size: usize,

    /// Sleep after a relay pass that received nothing
    pub poll_interval_ms: u64,

    /// Pause after an accept error that is not transient
    pub accept_backoff_ms: u64,
}

impl ServerConfig {
    /// Configuration with built-in defaults for the given listen address.
    pub fn new(listen: SocketAddrV4) -> Self {
        Self {
            bind_address: *listen.ip(),
            port: listen.port(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            accept_backoff_ms: DEFAULT_ACCEPT_BACKOFF_MS,
        }
    }

    /// Layer the listen address over the built-in defaults and validate.
    pub fn load(listen: SocketAddrV4) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("buffer_size", DEFAULT_BUFFER_SIZE as i64)?
            .set_default("poll_interval_ms", DEFAULT_POLL_INTERVAL_MS as i64)?
            .set_default("accept_backoff_ms", DEFAULT_ACCEPT_BACKOFF_MS as i64)?
            .set_override("bind_address", listen.ip().to_string())?
            .set_override("port", i64::from(listen.port()))?
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size == 0 {
            return Err(ConfigError::Message(
                "buffer_size must be greater than 0".into(),
            ));
        }

        if self.poll_interval_ms > 1000 {
            return Err(ConfigError::Message(
                "poll_interval_ms must be at most 1000".into(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.bind_address, self.port))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn accept_backoff(&self) -> Duration {
        Duration::from_millis(self.accept_backoff_ms)
    }
}
