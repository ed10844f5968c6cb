//! WebSocket transport
//!
//! Reusable streaming connector with a table-driven reconnection policy
//! and ping/pong keepalive.

mod client;
mod types;

pub use client::WsClient;
pub use types::{BackoffTable, WsConfig, WsError, WsEvent};
