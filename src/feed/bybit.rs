//! Bybit v5 public depth feed

use super::{book_topic, classify, BookFeed};
use crate::config::{FeedConfig, SyncConfig};
use crate::sync::session::{self, SessionParams};
use crate::sync::{BookSubscription, SessionHandle};
use crate::ws::{BackoffTable, WsClient, WsConfig};
use async_trait::async_trait;
use std::time::Duration;

/// Bybit v5 public book feed: snapshots and deltas arrive in-band on the
/// `orderbook.{depth}.{SYMBOL}` topic, with a fresh snapshot after every
/// subscribe.
pub struct BybitFeed {
    feed: FeedConfig,
    sync: SyncConfig,
}

impl BybitFeed {
    /// Create a feed over the given configuration
    pub fn new(feed: FeedConfig, sync: SyncConfig) -> Self {
        Self { feed, sync }
    }

    fn ws_config(&self) -> WsConfig {
        WsConfig::new(&self.feed.ws_url)
            .max_reconnects(self.sync.max_reconnect_attempts)
            .backoff(BackoffTable::from_millis(&self.sync.backoff_ms))
            .ping_interval(Duration::from_secs(self.sync.ping_interval_secs))
            .pong_timeout(Duration::from_secs(self.sync.pong_timeout_secs))
    }
}

#[async_trait]
impl BookFeed for BybitFeed {
    async fn subscribe(
        &self,
        instrument: &str,
    ) -> anyhow::Result<(SessionHandle, BookSubscription)> {
        let instrument = instrument.to_uppercase();
        let topic = book_topic(&instrument, self.feed.depth);

        tracing::info!(
            instrument = %instrument,
            topic = %topic,
            url = %self.feed.ws_url,
            "Opening depth feed subscription"
        );

        let client = WsClient::new(self.ws_config());
        let (events, ws_tx) = client.connect();

        let params = SessionParams {
            instrument,
            topic,
            classify,
            detect_gaps: self.sync.detect_gaps,
            buffer_size: self.sync.buffer_size,
        };

        Ok(session::spawn(params, events, ws_tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_config_from_settings() {
        let feed = FeedConfig {
            ws_url: "wss://example.com/v5/public/spot".to_string(),
            depth: 50,
        };
        let sync = SyncConfig {
            backoff_ms: vec![100, 200],
            max_reconnect_attempts: 7,
            ping_interval_secs: 15,
            pong_timeout_secs: 5,
            buffer_size: 64,
            detect_gaps: true,
        };

        let config = BybitFeed::new(feed, sync).ws_config();
        assert_eq!(config.url, "wss://example.com/v5/public/spot");
        assert_eq!(config.max_reconnect_attempts, 7);
        assert_eq!(config.backoff.delay_for(2), Duration::from_millis(200));
        assert_eq!(config.ping_interval, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_subscribe_uppercases_instrument() {
        let feed = BybitFeed::new(FeedConfig::default(), SyncConfig::default());
        let (handle, sub) = feed.subscribe("btcusdt").await.unwrap();
        assert_eq!(sub.instrument, "BTCUSDT");
        handle.close().await;
    }
}
