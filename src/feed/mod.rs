//! Depth feed protocol
//!
//! Wire types and message classification for the exchange's public book
//! channel, plus the feed implementations that open synchronization
//! sessions over it.

mod bybit;
mod classifier;
mod types;

pub use bybit::BybitFeed;
pub use classifier::classify;
pub use types::{book_topic, BookEvent, Classified, ControlFrame, DEFAULT_FEED_WS_URL};

use crate::sync::{BookSubscription, SessionHandle};
use async_trait::async_trait;

/// Trait for depth feed implementations
#[async_trait]
pub trait BookFeed: Send + Sync {
    /// Open a brand-new synchronization pipeline for one instrument.
    ///
    /// Returns the owner handle (deterministic teardown) and the consumer
    /// subscription (book updates + connection status).
    async fn subscribe(
        &self,
        instrument: &str,
    ) -> anyhow::Result<(SessionHandle, BookSubscription)>;
}
