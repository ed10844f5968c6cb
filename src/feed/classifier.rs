//! Inbound message classification
//!
//! One pure function from raw frame text to `{Snapshot, Delta, Ignored}`.
//! Anything the classifier cannot fully understand is `Ignored`: a
//! malformed frame never affects the book and never tears down the
//! connection.

use super::types::{feed_timestamp, BookEvent, BookPayload, Classified, FeedEnvelope, RawLevel};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Classify one raw inbound message against the book-update channel.
pub fn classify(raw: &str) -> Classified {
    let envelope: FeedEnvelope = match serde_json::from_str(raw) {
        Ok(env) => env,
        Err(e) => {
            tracing::debug!(error = %e, "Dropping unparseable feed message");
            return Classified::Ignored;
        }
    };

    // Control acks (subscribe/unsubscribe responses, pings)
    if let Some(op) = envelope.op.as_deref() {
        tracing::debug!(op, success = ?envelope.success, "Feed control ack");
        return Classified::Ignored;
    }

    let Some(topic) = envelope.topic.as_deref() else {
        return Classified::Ignored;
    };
    if !topic.starts_with("orderbook.") {
        tracing::trace!(topic, "Message for unrelated topic");
        return Classified::Ignored;
    }

    let Some(kind) = envelope.kind.as_deref() else {
        return Classified::Ignored;
    };
    let Some(data) = envelope.data else {
        return Classified::Ignored;
    };

    let payload: BookPayload = match serde_json::from_value(data) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!(error = %e, topic, "Dropping malformed book payload");
            return Classified::Ignored;
        }
    };

    let event = BookEvent {
        instrument: payload.symbol,
        bids: parse_levels(&payload.bids),
        asks: parse_levels(&payload.asks),
        update_id: payload.update_id,
        timestamp: feed_timestamp(envelope.ts),
    };

    match kind {
        "snapshot" => Classified::Snapshot(event),
        "delta" => Classified::Delta(event),
        other => {
            tracing::trace!(kind = other, "Unknown book message type");
            Classified::Ignored
        }
    }
}

/// Parse one side's `[priceString, sizeString]` rows; rows that fail to
/// parse are dropped individually.
fn parse_levels(rows: &[RawLevel]) -> Vec<(Decimal, Decimal)> {
    rows.iter()
        .filter_map(|RawLevel(price, size)| {
            let price = Decimal::from_str(price).ok()?;
            let size = Decimal::from_str(size).ok()?;
            Some((price, size))
        })
        .collect()
}
