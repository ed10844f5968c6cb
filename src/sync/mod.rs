//! Live book synchronization
//!
//! Session pipeline (transport events → classifier → reconciler →
//! observers), the observer-facing publisher, and the symbol-switch
//! controller that owns the pipeline's lifetime.

mod controller;
mod publisher;
pub mod session;

pub use controller::{SessionState, SyncController};
pub use publisher::BookPublisher;
pub use session::{BookSubscription, ConnectionStatus, SessionHandle, SessionParams};
