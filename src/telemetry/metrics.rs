//! Prometheus metrics

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Start the Prometheus exporter on the given port
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}

/// Count an applied snapshot
pub fn record_snapshot_applied(instrument: &str) {
    counter!("depthsync_snapshots_applied_total", "instrument" => instrument.to_string())
        .increment(1);
}

/// Count an applied delta
pub fn record_delta_applied(instrument: &str) {
    counter!("depthsync_deltas_applied_total", "instrument" => instrument.to_string()).increment(1);
}

/// Count a dropped control/unknown/unparseable message
pub fn record_message_ignored(instrument: &str) {
    counter!("depthsync_messages_ignored_total", "instrument" => instrument.to_string())
        .increment(1);
}

/// Count a detected sequence gap
pub fn record_sequence_gap(instrument: &str) {
    counter!("depthsync_sequence_gaps_total", "instrument" => instrument.to_string()).increment(1);
}

/// Count a reconnection attempt
pub fn record_reconnect(instrument: &str) {
    counter!("depthsync_reconnects_total", "instrument" => instrument.to_string()).increment(1);
}

/// Record current per-side book depth
pub fn set_book_depth(instrument: &str, bid_levels: usize, ask_levels: usize) {
    gauge!("depthsync_book_depth", "instrument" => instrument.to_string(), "side" => "bid")
        .set(bid_levels as f64);
    gauge!("depthsync_book_depth", "instrument" => instrument.to_string(), "side" => "ask")
        .set(ask_levels as f64);
}
