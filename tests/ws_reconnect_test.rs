//! Reconnection policy tests against a local WebSocket server.

use depthsync::ws::{BackoffTable, WsClient, WsConfig, WsEvent};
use std::time::Duration;
use tokio::net::TcpListener;

#[tokio::test]
async fn attempt_counter_resets_after_successful_open() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Server: complete the handshake, then drop the connection; repeat.
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            if let Ok(ws) = tokio_tungstenite::accept_async(stream).await {
                drop(ws);
            }
        }
    });

    let client = WsClient::new(
        WsConfig::new(format!("ws://{addr}"))
            .max_reconnects(3)
            .backoff(BackoffTable::from_millis(&[10])),
    );
    let (mut rx, _tx) = client.connect();

    // Every open resets the counter, so across repeated server-side drops
    // each reconnect is attempt 1 - the policy never walks the table.
    let result = tokio::time::timeout(Duration::from_secs(10), async {
        let mut connects = 0;
        while connects < 3 {
            match rx.recv().await.expect("connector stopped early") {
                WsEvent::Connected => connects += 1,
                WsEvent::Reconnecting { attempt, .. } => {
                    assert_eq!(attempt, 1, "counter must reset after each open");
                }
                WsEvent::Exhausted { .. } => panic!("policy gave up despite resets"),
                _ => {}
            }
        }
    })
    .await;

    result.expect("test timed out");
}

#[tokio::test]
async fn server_initiated_close_triggers_reconnect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        // Accept exactly one connection, then go away entirely.
        if let Ok((stream, _)) = listener.accept().await {
            if let Ok(ws) = tokio_tungstenite::accept_async(stream).await {
                drop(ws);
            }
        }
    });

    let client = WsClient::new(
        WsConfig::new(format!("ws://{addr}"))
            .max_reconnects(1)
            .backoff(BackoffTable::from_millis(&[10])),
    );
    let (mut rx, _tx) = client.connect();

    let result = tokio::time::timeout(Duration::from_secs(10), async {
        let mut saw_connected = false;
        let mut saw_reconnecting = false;
        while let Some(ev) = rx.recv().await {
            match ev {
                WsEvent::Connected => saw_connected = true,
                WsEvent::Reconnecting { .. } => saw_reconnecting = true,
                WsEvent::Exhausted { .. } => break,
                _ => {}
            }
        }
        assert!(saw_connected, "first open should succeed");
        assert!(
            saw_reconnecting,
            "server-initiated close must schedule a reconnect"
        );
    })
    .await;

    result.expect("test timed out");
}
