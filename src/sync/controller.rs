//! Symbol-switch controller
//!
//! Owns the lifetime of the synchronization pipeline for the currently
//! observed instrument. Switching instruments tears the whole pipeline
//! down and rebuilds it; nothing is retained across a switch, so
//! re-attaching a previously watched instrument is a brand-new
//! subscription.

use super::session::{BookSubscription, SessionHandle};
use crate::feed::BookFeed;
use std::sync::Arc;

/// Controller lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No instrument attached
    Detached,
    /// Opening the pipeline for a new instrument
    Attaching,
    /// Pipeline live
    Attached,
    /// Tearing the pipeline down
    Detaching,
}

/// Owns at most one live instrument session at a time.
pub struct SyncController {
    feed: Arc<dyn BookFeed>,
    state: SessionState,
    active: Option<(String, SessionHandle)>,
}

impl SyncController {
    /// Create a detached controller over the given feed
    pub fn new(feed: Arc<dyn BookFeed>) -> Self {
        Self {
            feed,
            state: SessionState::Detached,
            active: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Instrument of the live session, if any
    pub fn instrument(&self) -> Option<&str> {
        self.active.as_ref().map(|(instrument, _)| instrument.as_str())
    }

    /// Attach to an instrument, detaching any current session first.
    ///
    /// The returned subscription observes a fresh connector and a reset
    /// reconciler regardless of what was attached before.
    pub async fn attach(&mut self, instrument: &str) -> anyhow::Result<BookSubscription> {
        if self.active.is_some() {
            self.detach().await;
        }

        self.state = SessionState::Attaching;
        tracing::info!(instrument, "Attaching");

        match self.feed.subscribe(instrument).await {
            Ok((handle, subscription)) => {
                self.active = Some((instrument.to_string(), handle));
                self.state = SessionState::Attached;
                Ok(subscription)
            }
            Err(e) => {
                self.state = SessionState::Detached;
                Err(e)
            }
        }
    }

    /// Detach the current session, if any: closes the connector, cancels
    /// any pending reconnect, and discards the book.
    pub async fn detach(&mut self) {
        if let Some((instrument, handle)) = self.active.take() {
            self.state = SessionState::Detaching;
            tracing::info!(instrument = %instrument, "Detaching");
            handle.close().await;
        }
        self.state = SessionState::Detached;
    }
}
