//! Presence and realtime delivery for Courier
//!
//! This crate owns the presence registry (user id → single live
//! connection), the relay that fans message and read-receipt events out to
//! live connections, the typing relay, and the WebSocket endpoint itself.
//! Nothing here persists: presence is rebuilt from live connections, and a
//! missed live delivery is by design (the message store is the durable
//! record; push fallback covers offline recipients).

pub mod events;
pub mod registry;
pub mod relay;
pub mod routes;
pub mod ws;

// Re-export the routes function to be used by the main backend service
pub use routes::routes;

pub use events::{ClientEvent, ServerEvent};
pub use registry::{ConnectionHandle, PresenceRegistry};
pub use relay::RealtimeRelay;
