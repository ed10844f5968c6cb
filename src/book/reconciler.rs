//! Snapshot/delta reconciliation
//!
//! Owns the authoritative in-memory book for one instrument. Snapshots
//! replace both sides wholesale; deltas upsert or delete individual
//! levels. Cumulative totals are recomputed on every published state.

use super::side::{BookSide, Side};
use super::OrderBook;
use crate::feed::{BookEvent, Classified};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Reconciliation failures that require recovery rather than a retry
#[derive(Debug, Clone, Error)]
pub enum ReconcileError {
    /// The feed's sequence marker went backwards, violating its
    /// non-decreasing contract. The book may have diverged; the owner
    /// should request a fresh snapshot.
    #[error("sequence gap: update id {received} precedes last applied {last}")]
    SequenceGap { last: u64, received: u64 },
}

/// Reconciles classified feed messages into an order book.
///
/// Deltas arriving before the first snapshot have nothing to reconcile
/// against and are discarded behind the `synced` gate. The gate reopens
/// on every snapshot and closes again on [`Reconciler::invalidate`].
#[derive(Debug)]
pub struct Reconciler {
    instrument: String,
    bids: BookSide,
    asks: BookSide,
    last_update_id: u64,
    updated_at: DateTime<Utc>,
    synced: bool,
    detect_gaps: bool,
}

impl Reconciler {
    /// Create an empty reconciler for one instrument
    pub fn new(instrument: impl Into<String>, detect_gaps: bool) -> Self {
        Self {
            instrument: instrument.into(),
            bids: BookSide::new(Side::Bid),
            asks: BookSide::new(Side::Ask),
            last_update_id: 0,
            updated_at: Utc::now(),
            synced: false,
            detect_gaps,
        }
    }

    /// Whether a snapshot has been applied since creation, reset, or the
    /// last invalidation
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Close the snapshot gate but keep the current levels. Subsequent
    /// deltas are discarded until a fresh snapshot arrives; the stale book
    /// stays available for display in the meantime.
    pub fn invalidate(&mut self) {
        self.synced = false;
    }

    /// Discard all state, as on instrument switch
    pub fn reset(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.last_update_id = 0;
        self.synced = false;
    }

    /// Apply one classified message.
    ///
    /// Returns the freshly reconciled book when the message changed state,
    /// `None` when it was ignored or gated, and an error when the sequence
    /// marker went backwards (with gap detection enabled).
    pub fn apply(&mut self, message: Classified) -> Result<Option<OrderBook>, ReconcileError> {
        match message {
            Classified::Snapshot(event) => {
                self.apply_snapshot(&event);
                Ok(Some(self.book()))
            }
            Classified::Delta(event) => {
                if !self.synced {
                    tracing::debug!(
                        instrument = %self.instrument,
                        update_id = event.update_id,
                        "Discarding delta before first snapshot"
                    );
                    return Ok(None);
                }

                if self.detect_gaps && event.update_id < self.last_update_id {
                    return Err(ReconcileError::SequenceGap {
                        last: self.last_update_id,
                        received: event.update_id,
                    });
                }

                self.apply_delta(&event);
                Ok(Some(self.book()))
            }
            Classified::Ignored => Ok(None),
        }
    }

    /// Snapshot path: full per-side replace, linear in snapshot size
    fn apply_snapshot(&mut self, event: &BookEvent) {
        self.bids.replace(&event.bids);
        self.asks.replace(&event.asks);
        self.last_update_id = event.update_id;
        self.updated_at = event.timestamp;
        self.synced = true;

        tracing::debug!(
            instrument = %self.instrument,
            update_id = event.update_id,
            bid_levels = self.bids.len(),
            ask_levels = self.asks.len(),
            "Applied snapshot"
        );
    }

    /// Delta path: per-level upsert/delete on both sides
    fn apply_delta(&mut self, event: &BookEvent) {
        for &(price, size) in &event.bids {
            self.bids.apply(price, size);
        }
        for &(price, size) in &event.asks {
            self.asks.apply(price, size);
        }
        self.last_update_id = event.update_id;
        self.updated_at = event.timestamp;
    }

    /// Materialize the current book with cumulative totals on both sides
    pub fn book(&self) -> OrderBook {
        OrderBook {
            instrument: self.instrument.clone(),
            bids: self.bids.levels(),
            asks: self.asks.levels(),
            update_id: self.last_update_id,
            updated_at: self.updated_at,
        }
    }
}
