//! Configuration for topic-client
//!
//! Centralized client configuration with sensible defaults.

use std::time::Duration;

/// Time budget for one complete exchange (connect + send + both reads)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client configuration shared by every exchange
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Budget for the whole exchange, measured from the start of connect.
    /// Each blocking step only gets whatever is left of it.
    pub timeout: Duration,

    /// Disable Nagle's algorithm on the socket
    pub nodelay: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            nodelay: true,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the exchange time budget
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the exchange time budget (in milliseconds)
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout = Duration::from_millis(ms);
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.config.nodelay = nodelay;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
