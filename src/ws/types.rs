//! WebSocket transport types and configuration

use std::time::Duration;
use thiserror::Error;

/// Fixed table of reconnect delays indexed by consecutive-failure count.
///
/// Attempt 1 uses the first entry, attempt 2 the second, and so on; once
/// the table is exhausted the last entry is reused for every further
/// attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffTable(Vec<Duration>);

impl BackoffTable {
    /// Build a table from explicit delays. Empty input falls back to the
    /// default table.
    pub fn new(delays: Vec<Duration>) -> Self {
        if delays.is_empty() {
            Self::default()
        } else {
            Self(delays)
        }
    }

    /// Build a table from millisecond values (the config-file form).
    pub fn from_millis(delays_ms: &[u64]) -> Self {
        Self::new(delays_ms.iter().map(|&ms| Duration::from_millis(ms)).collect())
    }

    /// Delay for the given attempt number (1-based). Attempt 0 is treated
    /// as attempt 1.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let idx = (attempt.max(1) as usize - 1).min(self.0.len() - 1);
        self.0[idx]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for BackoffTable {
    fn default() -> Self {
        Self(vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(5),
            Duration::from_secs(10),
            Duration::from_secs(30),
        ])
    }
}

/// WebSocket connector configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// Maximum reconnection attempts before surfacing a terminal error
    pub max_reconnect_attempts: u32,
    /// Reconnect delay table indexed by attempt count
    pub backoff: BackoffTable,
    /// Interval for sending ping frames
    pub ping_interval: Duration,
    /// Timeout for pong response
    pub pong_timeout: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_reconnect_attempts: 10,
            backoff: BackoffTable::default(),
            ping_interval: Duration::from_secs(20),
            pong_timeout: Duration::from_secs(10),
        }
    }
}

impl WsConfig {
    /// Create a new config with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set maximum reconnection attempts
    pub fn max_reconnects(mut self, n: u32) -> Self {
        self.max_reconnect_attempts = n;
        self
    }

    /// Set the reconnect delay table
    pub fn backoff(mut self, table: BackoffTable) -> Self {
        self.backoff = table;
        self
    }

    /// Set ping interval
    pub fn ping_interval(mut self, d: Duration) -> Self {
        self.ping_interval = d;
        self
    }

    /// Set pong timeout
    pub fn pong_timeout(mut self, d: Duration) -> Self {
        self.pong_timeout = d;
        self
    }
}

/// Events emitted by the connector to its consumer
#[derive(Debug, Clone)]
pub enum WsEvent {
    /// Text frame received
    Text(String),
    /// Binary frame received
    Binary(Vec<u8>),
    /// Connection established (also after each successful reconnect)
    Connected,
    /// Connection lost; a reconnect follows unless attempts are exhausted
    Closed,
    /// Reconnect scheduled
    Reconnecting { attempt: u32, delay: Duration },
    /// Reconnection attempts exhausted; the connector has given up
    Exhausted { attempts: u32 },
}

/// Transport-level errors
#[derive(Debug, Clone, Error)]
pub enum WsError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("connection closed by peer")]
    ConnectionClosed,
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("reconnection attempts exhausted after {0} tries")]
    ReconnectsExhausted(u32),
}
