//! Per-instrument synchronization session
//!
//! The pipeline task for one attached instrument: transport events in,
//! classified messages through the reconciler, reconciled books out to
//! observers, connection status on a watch channel.

use super::publisher::BookPublisher;
use crate::book::{OrderBook, ReconcileError, Reconciler};
use crate::feed::{Classified, ControlFrame};
use crate::telemetry;
use crate::ws::WsEvent;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Connection state as seen by consumers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Attached, no connection attempt has completed yet
    Idle,
    /// Reconnect in progress
    Connecting { attempt: u32 },
    /// Connected and subscribed
    Open,
    /// Connection lost; reconnection pending
    Closed,
    /// Terminal: reconnection attempts exhausted. Consumers are expected
    /// to offer a manual retry (re-attach).
    Error(String),
}

/// Consumer half of one instrument subscription.
///
/// The book display may keep rendering the last received state while
/// `status` reports anything other than `Open`; published books are owned
/// copies and never change after delivery.
#[derive(Debug)]
pub struct BookSubscription {
    /// Instrument this subscription observes
    pub instrument: String,
    /// One message per successful reconciliation, in reconciliation order
    pub updates: mpsc::Receiver<OrderBook>,
    /// Latest connection status
    pub status: watch::Receiver<ConnectionStatus>,
}

/// Owner half of a session: deterministic teardown
#[derive(Debug)]
pub struct SessionHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Signal the session to stop and wait for it to finish. Cancels any
    /// pending reconnect alongside the connector itself.
    pub async fn close(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }

    /// Whether the session task is still running
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Parameters for one session
pub struct SessionParams {
    /// Instrument to synchronize
    pub instrument: String,
    /// Book-update channel name on the feed
    pub topic: String,
    /// Protocol classifier for inbound frames
    pub classify: fn(&str) -> Classified,
    /// Flag sequence-marker regressions and force a fresh snapshot
    pub detect_gaps: bool,
    /// Observer channel depth
    pub buffer_size: usize,
}

/// Spawn the session task over an already-connected transport pair.
pub fn spawn(
    params: SessionParams,
    events: mpsc::Receiver<WsEvent>,
    ws_tx: mpsc::Sender<String>,
) -> (SessionHandle, BookSubscription) {
    let (status_tx, status_rx) = watch::channel(ConnectionStatus::Idle);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut publisher = BookPublisher::new();
    let updates = publisher.subscribe(params.buffer_size);
    let instrument = params.instrument.clone();

    let session = Session {
        instrument: params.instrument,
        topic: params.topic,
        classify: params.classify,
        reconciler: Reconciler::new(instrument.clone(), params.detect_gaps),
        publisher,
        ws_tx,
        status: status_tx,
    };

    let task = tokio::spawn(session.run(events, shutdown_rx));

    (
        SessionHandle {
            shutdown: shutdown_tx,
            task,
        },
        BookSubscription {
            instrument,
            updates,
            status: status_rx,
        },
    )
}

struct Session {
    instrument: String,
    topic: String,
    classify: fn(&str) -> Classified,
    reconciler: Reconciler,
    publisher: BookPublisher,
    ws_tx: mpsc::Sender<String>,
    status: watch::Sender<ConnectionStatus>,
}

impl Session {
    async fn run(
        mut self,
        mut events: mpsc::Receiver<WsEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        tracing::info!(instrument = %self.instrument, topic = %self.topic, "Session started");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        self.send_control(ControlFrame::unsubscribe(&self.topic)).await;
                        let _ = self.status.send(ConnectionStatus::Closed);
                        break;
                    }
                }

                ev = events.recv() => {
                    match ev {
                        Some(WsEvent::Connected) => {
                            // Subscribe on every open, including reconnects;
                            // the feed answers with a fresh snapshot.
                            self.send_control(ControlFrame::subscribe(&self.topic)).await;
                            let _ = self.status.send(ConnectionStatus::Open);
                        }
                        Some(WsEvent::Text(text)) => {
                            if !self.handle_message(&text).await {
                                break;
                            }
                        }
                        Some(WsEvent::Binary(_)) => {
                            // The feed is JSON-only on this channel.
                        }
                        Some(WsEvent::Closed) => {
                            let _ = self.status.send(ConnectionStatus::Closed);
                        }
                        Some(WsEvent::Reconnecting { attempt, .. }) => {
                            telemetry::record_reconnect(&self.instrument);
                            let _ = self.status.send(ConnectionStatus::Connecting { attempt });
                        }
                        Some(WsEvent::Exhausted { attempts }) => {
                            let _ = self.status.send(ConnectionStatus::Error(format!(
                                "reconnection attempts exhausted after {attempts} tries"
                            )));
                            break;
                        }
                        None => {
                            tracing::debug!(instrument = %self.instrument, "Connector gone");
                            break;
                        }
                    }
                }
            }
        }

        tracing::info!(instrument = %self.instrument, "Session ended");
    }

    /// Classify and reconcile one inbound frame. Returns `false` when the
    /// session should stop (all observers gone).
    async fn handle_message(&mut self, text: &str) -> bool {
        let classified = (self.classify)(text);
        if matches!(classified, Classified::Ignored) {
            telemetry::record_message_ignored(&self.instrument);
            return true;
        }
        let is_snapshot = matches!(classified, Classified::Snapshot(_));

        match self.reconciler.apply(classified) {
            Ok(Some(book)) => {
                if is_snapshot {
                    telemetry::record_snapshot_applied(&self.instrument);
                } else {
                    telemetry::record_delta_applied(&self.instrument);
                }
                telemetry::set_book_depth(&self.instrument, book.bids.len(), book.asks.len());

                self.publisher.publish(&book).await;
                if !self.publisher.has_observers() {
                    tracing::debug!(
                        instrument = %self.instrument,
                        "All observers gone, stopping session"
                    );
                    return false;
                }
            }
            Ok(None) => {}
            Err(ReconcileError::SequenceGap { last, received }) => {
                tracing::warn!(
                    instrument = %self.instrument,
                    last,
                    received,
                    "Sequence gap detected, requesting fresh snapshot"
                );
                telemetry::record_sequence_gap(&self.instrument);

                // Keep the stale book visible but discard deltas until the
                // re-subscribe yields a new snapshot.
                self.reconciler.invalidate();
                self.send_control(ControlFrame::unsubscribe(&self.topic)).await;
                self.send_control(ControlFrame::subscribe(&self.topic)).await;
            }
        }

        true
    }

    async fn send_control(&self, frame: ControlFrame) {
        match serde_json::to_string(&frame) {
            Ok(json) => {
                if self.ws_tx.send(json).await.is_err() {
                    tracing::debug!(
                        instrument = %self.instrument,
                        op = %frame.op,
                        "Connector gone, control frame dropped"
                    );
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode control frame");
            }
        }
    }
}
