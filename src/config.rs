//! Configuration types for depthsync

use crate::feed::DEFAULT_FEED_WS_URL;
use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Depth feed endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// WebSocket endpoint of the public depth feed
    #[serde(default = "default_ws_url")]
    pub ws_url: String,

    /// Book depth to subscribe at (levels per side)
    #[serde(default = "default_depth")]
    pub depth: u16,
}

fn default_ws_url() -> String {
    DEFAULT_FEED_WS_URL.to_string()
}
fn default_depth() -> u16 {
    50
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            depth: 50,
        }
    }
}

/// Synchronization and reconnection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Reconnect delay table in milliseconds, indexed by attempt count
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: Vec<u64>,

    /// Maximum reconnection attempts before surfacing a terminal error
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Keepalive ping interval (seconds)
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,

    /// Pong response timeout (seconds)
    #[serde(default = "default_pong_timeout_secs")]
    pub pong_timeout_secs: u64,

    /// Observer channel depth for book updates
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Treat a regressed update id as a gap and force a fresh snapshot
    #[serde(default = "default_true")]
    pub detect_gaps: bool,
}

fn default_backoff_ms() -> Vec<u64> {
    vec![1_000, 2_000, 5_000, 10_000, 30_000]
}
fn default_max_reconnect_attempts() -> u32 {
    10
}
fn default_ping_interval_secs() -> u64 {
    20
}
fn default_pong_timeout_secs() -> u64 {
    10
}
fn default_buffer_size() -> usize {
    256
}
fn default_true() -> bool {
    true
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            backoff_ms: default_backoff_ms(),
            max_reconnect_attempts: 10,
            ping_interval_secs: 20,
            pong_timeout_secs: 10,
            buffer_size: 256,
            detect_gaps: true,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Port for the Prometheus exporter; disabled when absent
    #[serde(default)]
    pub metrics_port: Option<u16>,

    /// Log level filter
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_port: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            [feed]
            ws_url = "wss://stream.example.com/v5/public/spot"
            depth = 25

            [sync]
            backoff_ms = [500, 1000, 5000]
            max_reconnect_attempts = 5
            ping_interval_secs = 30
            pong_timeout_secs = 15
            buffer_size = 128
            detect_gaps = false

            [telemetry]
            metrics_port = 9100
            log_level = "debug"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.feed.ws_url, "wss://stream.example.com/v5/public/spot");
        assert_eq!(config.feed.depth, 25);
        assert_eq!(config.sync.backoff_ms, vec![500, 1000, 5000]);
        assert_eq!(config.sync.max_reconnect_attempts, 5);
        assert!(!config.sync.detect_gaps);
        assert_eq!(config.telemetry.metrics_port, Some(9100));
        assert_eq!(config.telemetry.log_level, "debug");
    }

    #[test]
    fn test_config_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.feed.ws_url, DEFAULT_FEED_WS_URL);
        assert_eq!(config.feed.depth, 50);
        assert_eq!(config.sync.backoff_ms, vec![1_000, 2_000, 5_000, 10_000, 30_000]);
        assert_eq!(config.sync.max_reconnect_attempts, 10);
        assert!(config.sync.detect_gaps);
        assert!(config.telemetry.metrics_port.is_none());
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn test_partial_section_uses_field_defaults() {
        let toml = r#"
            [sync]
            max_reconnect_attempts = 3
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.sync.max_reconnect_attempts, 3);
        assert_eq!(config.sync.buffer_size, 256);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_clone() {
        let config = Config::default();
        let cloned = config.clone();
        assert_eq!(config.feed.ws_url, cloned.feed.ws_url);
    }
}
