//! Watch command implementation

use crate::config::Config;
use crate::feed::BybitFeed;
use crate::sync::{ConnectionStatus, SyncController};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Instrument symbol to watch (e.g. BTCUSDT)
    pub symbol: String,

    /// Override the configured book depth
    #[arg(long)]
    pub depth: Option<u16>,
}

impl WatchArgs {
    pub async fn execute(&self, mut config: Config) -> anyhow::Result<()> {
        if let Some(depth) = self.depth {
            config.feed.depth = depth;
        }

        let feed = Arc::new(BybitFeed::new(config.feed.clone(), config.sync.clone()));
        let mut controller = SyncController::new(feed);
        let mut subscription = controller.attach(&self.symbol).await?;
        let mut status = subscription.status.clone();

        let outcome = loop {
            tokio::select! {
                update = subscription.updates.recv() => {
                    match update {
                        Some(book) => {
                            tracing::info!(
                                instrument = %book.instrument,
                                update_id = book.update_id,
                                best_bid = ?book.best_bid(),
                                best_ask = ?book.best_ask(),
                                mid = ?book.mid_price(),
                                bid_levels = book.bids.len(),
                                ask_levels = book.asks.len(),
                                "Book"
                            );
                        }
                        None => break status.borrow().clone(),
                    }
                }

                changed = status.changed() => {
                    match changed {
                        Ok(()) => {
                            tracing::info!(status = ?*status.borrow(), "Connection status");
                        }
                        Err(_) => break status.borrow().clone(),
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received shutdown signal");
                    break ConnectionStatus::Closed;
                }
            }
        };

        controller.detach().await;

        if let ConnectionStatus::Error(msg) = outcome {
            anyhow::bail!("feed gave up: {msg}");
        }
        Ok(())
    }
}
