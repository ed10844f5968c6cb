//! Order book state
//!
//! Published book snapshots and the per-side/reconciler internals that
//! keep them in sync with the feed.

mod reconciler;
mod side;

pub use reconciler::{ReconcileError, Reconciler};
pub use side::{BookSide, Side};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price level in the order book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Price at this level
    pub price: Decimal,
    /// Size available at this price
    pub size: Decimal,
    /// Running sum of size from the best price out to this level
    pub total: Decimal,
}

/// L2 order book for one instrument, as published to observers.
///
/// Levels are materialized in traversal order: bids best (highest) first,
/// asks best (lowest) first, cumulative totals already computed. Observers
/// receive owned copies and must not assume shared state with the
/// reconciler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBook {
    /// Instrument identifier
    pub instrument: String,
    /// Bid levels, sorted best (highest) to worst
    pub bids: Vec<PriceLevel>,
    /// Ask levels, sorted best (lowest) to worst
    pub asks: Vec<PriceLevel>,
    /// Feed sequence marker of the last applied update
    pub update_id: u64,
    /// Server timestamp of the last applied update
    pub updated_at: DateTime<Utc>,
}

impl OrderBook {
    /// Create a new empty order book
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            bids: vec![],
            asks: vec![],
            update_id: 0,
            updated_at: Utc::now(),
        }
    }

    /// Get best bid price
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|l| l.price)
    }

    /// Get best ask price
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|l| l.price)
    }

    /// Get mid price
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::TWO),
            _ => None,
        }
    }

    /// Get spread
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Get best bid size
    pub fn best_bid_size(&self) -> Option<Decimal> {
        self.bids.first().map(|l| l.size)
    }

    /// Get best ask size
    pub fn best_ask_size(&self) -> Option<Decimal> {
        self.asks.first().map(|l| l.size)
    }
}
