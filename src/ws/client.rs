//! WebSocket connector with table-driven reconnection

use super::types::{WsConfig, WsError, WsEvent};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Streaming connector that owns one WebSocket connection at a time.
///
/// On any transport close the reconnection policy picks the next delay
/// from the configured backoff table and reopens the connection. The
/// attempt counter resets to zero on every successful open. Once the
/// attempt cap is hit the connector emits [`WsEvent::Exhausted`] and
/// stops; dropping the event receiver is the explicit-disconnect signal
/// and stops the policy without further retries.
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    /// Create a new connector with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Create a connector for a URL with default config
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::new(WsConfig::new(url))
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Open the connection and return an event receiver plus a sender for
    /// outbound text frames.
    ///
    /// Spawns a background task that handles connection management,
    /// reconnection, and ping/pong keepalive. The receiver yields inbound
    /// frames and connection-state events.
    pub fn connect(&self) -> (mpsc::Receiver<WsEvent>, mpsc::Sender<String>) {
        let (event_tx, event_rx) = mpsc::channel(1024);
        let (send_tx, send_rx) = mpsc::channel(256);
        let config = self.config.clone();

        tokio::spawn(async move {
            if let Err(e) = Self::run_connection_loop(config, event_tx, send_rx).await {
                tracing::error!(error = %e, "WebSocket connection loop ended");
            }
        });

        (event_rx, send_tx)
    }

    /// Run the connect/stream/reconnect loop until the consumer goes away
    /// or the attempt cap is hit.
    async fn run_connection_loop(
        config: WsConfig,
        tx: mpsc::Sender<WsEvent>,
        mut send_rx: mpsc::Receiver<String>,
    ) -> Result<(), WsError> {
        let mut attempt: u32 = 0;

        loop {
            match Self::connect_and_stream(&config, &tx, &mut send_rx, &mut attempt).await {
                Ok(()) => {
                    // Consumer dropped its end; explicit disconnect.
                    tracing::debug!("WebSocket consumer gone, stopping");
                    break;
                }
                Err(e) => {
                    if attempt >= config.max_reconnect_attempts {
                        tracing::error!(
                            attempts = attempt,
                            error = %e,
                            "Reconnection attempts exhausted"
                        );
                        let _ = tx.send(WsEvent::Exhausted { attempts: attempt }).await;
                        return Err(WsError::ReconnectsExhausted(attempt));
                    }

                    attempt += 1;
                    let delay = config.backoff.delay_for(attempt);
                    tracing::warn!(
                        error = %e,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "WebSocket connection lost, reconnecting"
                    );

                    if tx.send(WsEvent::Reconnecting { attempt, delay }).await.is_err() {
                        break;
                    }

                    // Sleep, but wake immediately if the consumer goes away
                    // so no reconnect timer outlives its subscription.
                    tokio::select! {
                        _ = sleep(delay) => {}
                        _ = tx.closed() => break,
                    }
                }
            }
        }

        Ok(())
    }

    /// Connect once and stream frames until the connection drops.
    ///
    /// Returns `Ok(())` only when the consumer has gone away; every
    /// transport-initiated termination is an `Err` so the caller's policy
    /// decides whether to retry.
    async fn connect_and_stream(
        config: &WsConfig,
        tx: &mpsc::Sender<WsEvent>,
        send_rx: &mut mpsc::Receiver<String>,
        attempt: &mut u32,
    ) -> Result<(), WsError> {
        tracing::info!(url = %config.url, "Connecting to WebSocket");

        let (ws_stream, _response) = connect_async(config.url.as_str())
            .await
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        let (mut write, mut read) = ws_stream.split();

        // Successful open resets the reconnection policy.
        *attempt = 0;
        tracing::info!("WebSocket connected");

        if tx.send(WsEvent::Connected).await.is_err() {
            return Ok(());
        }

        let mut ping_interval = tokio::time::interval(config.ping_interval);
        ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ping_interval.tick().await; // first tick fires immediately

        let mut pong_deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if tx.send(WsEvent::Text(text)).await.is_err() {
                                return Ok(());
                            }
                        }
                        Some(Ok(Message::Binary(data))) => {
                            if tx.send(WsEvent::Binary(data)).await.is_err() {
                                return Ok(());
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await
                                .map_err(|e| WsError::SendFailed(e.to_string()))?;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            pong_deadline = None;
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("Received close frame");
                            let _ = tx.send(WsEvent::Closed).await;
                            return Err(WsError::ConnectionClosed);
                        }
                        Some(Err(e)) => {
                            let _ = tx.send(WsEvent::Closed).await;
                            return Err(WsError::ConnectionFailed(e.to_string()));
                        }
                        None => {
                            let _ = tx.send(WsEvent::Closed).await;
                            return Err(WsError::ConnectionClosed);
                        }
                        _ => {}
                    }
                }

                out = send_rx.recv() => {
                    match out {
                        Some(text) => {
                            write.send(Message::Text(text)).await
                                .map_err(|e| WsError::SendFailed(e.to_string()))?;
                        }
                        None => {
                            // Sender dropped; explicit disconnect.
                            return Ok(());
                        }
                    }
                }

                _ = ping_interval.tick() => {
                    write.send(Message::Ping(vec![])).await
                        .map_err(|e| WsError::SendFailed(e.to_string()))?;
                    if pong_deadline.is_none() {
                        pong_deadline = Some(Instant::now() + config.pong_timeout);
                    }
                }

                _ = async {
                    match pong_deadline {
                        Some(deadline) => tokio::time::sleep_until(deadline).await,
                        None => std::future::pending().await,
                    }
                } => {
                    let _ = tx.send(WsEvent::Closed).await;
                    return Err(WsError::ConnectionFailed("pong timeout".into()));
                }
            }
        }
    }
}
