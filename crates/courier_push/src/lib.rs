//! Web Push fallback delivery for Courier
//!
//! When a message's recipient has no live connection, this crate delivers
//! a best-effort notification through the Web Push transport: the
//! dispatcher fans the payload out to every subscription the recipient
//! registered, the client signs each request with a VAPID token, and the
//! HTTP handlers let clients manage their subscriptions.

pub mod client;
pub mod dispatcher;
#[cfg(feature = "openapi")]
pub mod doc;
pub mod handlers;
pub mod routes;

// Re-export the routes function to be used by the main backend service
pub use routes::routes;

pub use client::{PushError, WebPushClient};
pub use dispatcher::{notification_payload, PushDispatcher, PREVIEW_LENGTH};
