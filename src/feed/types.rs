//! Feed protocol types
//!
//! Wire shapes for the depth feed: JSON envelopes over a persistent
//! WebSocket, a `type` discriminator for snapshot vs. delta, side arrays
//! of `[priceString, sizeString]` pairs, and `{op, args}` control frames.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default public depth-feed endpoint
pub const DEFAULT_FEED_WS_URL: &str = "wss://stream.bybit.com/v5/public/spot";

/// Book-update channel name for an instrument at a given depth
pub fn book_topic(instrument: &str, depth: u16) -> String {
    format!("orderbook.{}.{}", depth, instrument.to_uppercase())
}

/// Outbound control frame: `{"op": "subscribe"|"unsubscribe", "args": [topic]}`
#[derive(Debug, Clone, Serialize)]
pub struct ControlFrame {
    pub op: String,
    pub args: Vec<String>,
}

impl ControlFrame {
    pub fn subscribe(topic: impl Into<String>) -> Self {
        Self {
            op: "subscribe".to_string(),
            args: vec![topic.into()],
        }
    }

    pub fn unsubscribe(topic: impl Into<String>) -> Self {
        Self {
            op: "unsubscribe".to_string(),
            args: vec![topic.into()],
        }
    }
}

/// Typed payload of a classified book message: levels already parsed from
/// the feed's decimal strings.
#[derive(Debug, Clone)]
pub struct BookEvent {
    /// Instrument the update applies to
    pub instrument: String,
    /// Bid `(price, size)` pairs in feed order
    pub bids: Vec<(Decimal, Decimal)>,
    /// Ask `(price, size)` pairs in feed order
    pub asks: Vec<(Decimal, Decimal)>,
    /// Feed sequence marker, monotonically non-decreasing
    pub update_id: u64,
    /// Server timestamp
    pub timestamp: DateTime<Utc>,
}

/// Classification of one raw inbound message
#[derive(Debug, Clone)]
pub enum Classified {
    /// Full replacement of both sides
    Snapshot(BookEvent),
    /// Incremental per-level update
    Delta(BookEvent),
    /// Control frame, unknown topic, or unparseable payload; no state change
    Ignored,
}

/// Inbound message envelope. Control acks carry `op`/`success`; book
/// updates carry `topic`/`type`/`data`.
#[derive(Debug, Deserialize)]
pub(crate) struct FeedEnvelope {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub ts: Option<i64>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub op: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
}

/// Book payload inside a snapshot or delta envelope
#[derive(Debug, Deserialize)]
pub(crate) struct BookPayload {
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "b", default)]
    pub bids: Vec<RawLevel>,
    #[serde(rename = "a", default)]
    pub asks: Vec<RawLevel>,
    #[serde(rename = "u", default)]
    pub update_id: u64,
}

/// One `[priceString, sizeString]` row
#[derive(Debug, Deserialize)]
pub(crate) struct RawLevel(pub String, pub String);

/// Convert a feed millisecond timestamp to `DateTime<Utc>`, falling back
/// to local receive time when the field is missing or out of range.
pub(crate) fn feed_timestamp(ts: Option<i64>) -> DateTime<Utc> {
    ts.and_then(|millis| Utc.timestamp_millis_opt(millis).single())
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_topic() {
        assert_eq!(book_topic("btcusdt", 50), "orderbook.50.BTCUSDT");
        assert_eq!(book_topic("ETHUSDT", 1), "orderbook.1.ETHUSDT");
    }

    #[test]
    fn test_control_frame_serialization() {
        let frame = ControlFrame::subscribe("orderbook.50.BTCUSDT");
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(
            json,
            r#"{"op":"subscribe","args":["orderbook.50.BTCUSDT"]}"#
        );

        let frame = ControlFrame::unsubscribe("orderbook.50.BTCUSDT");
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"op\":\"unsubscribe\""));
    }

    #[test]
    fn test_raw_level_from_pair() {
        let rows: Vec<RawLevel> = serde_json::from_str(r#"[["100.5","2"],["99","0.25"]]"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, "100.5");
        assert_eq!(rows[1].1, "0.25");
    }

    #[test]
    fn test_envelope_book_message() {
        let raw = r#"{
            "topic": "orderbook.50.BTCUSDT",
            "type": "snapshot",
            "ts": 1704067200000,
            "data": {"s": "BTCUSDT", "b": [["100","2"]], "a": [["101","1"]], "u": 7}
        }"#;
        let env: FeedEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(env.topic.as_deref(), Some("orderbook.50.BTCUSDT"));
        assert_eq!(env.kind.as_deref(), Some("snapshot"));

        let payload: BookPayload = serde_json::from_value(env.data.unwrap()).unwrap();
        assert_eq!(payload.symbol, "BTCUSDT");
        assert_eq!(payload.update_id, 7);
        assert_eq!(payload.bids.len(), 1);
    }

    #[test]
    fn test_envelope_control_ack() {
        let raw = r#"{"success":true,"op":"subscribe","conn_id":"abc"}"#;
        let env: FeedEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(env.op.as_deref(), Some("subscribe"));
        assert_eq!(env.success, Some(true));
        assert!(env.topic.is_none());
    }

    #[test]
    fn test_feed_timestamp_parses_millis() {
        let ts = feed_timestamp(Some(1704067200000));
        assert_eq!(ts.timestamp(), 1704067200);
    }

    #[test]
    fn test_feed_timestamp_missing_uses_now() {
        let ts = feed_timestamp(None);
        assert!(ts.timestamp() > 0);
    }
}
