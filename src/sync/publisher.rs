//! Subscriber-facing state holder
//!
//! Fans every reconciled book state out to registered observers,
//! synchronously with reconciliation. There is no batching or coalescing;
//! update frequency is bounded only by the upstream feed.

use crate::book::OrderBook;
use tokio::sync::mpsc;

/// Fan-out of reconciled book states to one or more observers.
///
/// Observers receive owned copies; an observer that drops its receiver is
/// pruned on the next publish.
#[derive(Debug, Default)]
pub struct BookPublisher {
    observers: Vec<mpsc::Sender<OrderBook>>,
}

impl BookPublisher {
    /// Create a publisher with no observers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer and return its receiver
    pub fn subscribe(&mut self, buffer: usize) -> mpsc::Receiver<OrderBook> {
        let (tx, rx) = mpsc::channel(buffer);
        self.observers.push(tx);
        rx
    }

    /// Publish one reconciled book state to every live observer
    pub async fn publish(&mut self, book: &OrderBook) {
        let mut live = Vec::with_capacity(self.observers.len());
        for tx in self.observers.drain(..) {
            if tx.send(book.clone()).await.is_ok() {
                live.push(tx);
            } else {
                tracing::debug!(
                    instrument = %book.instrument,
                    "Observer dropped, pruning"
                );
            }
        }
        self.observers = live;
    }

    /// Number of live observers as of the last publish
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }
}
