//! Message store semantics, conversation summaries, and message routes
//!
//! The send path runs the core control flow of the messaging layer:
//! validate, persist, relay to live connections, and, only when the
//! recipient is offline, hand off to the push fallback dispatcher. The
//! conversation list is derived from the store on every request.

pub mod handlers;
pub mod logic;
pub mod models;
pub mod routes;

#[cfg(feature = "openapi")]
pub mod doc;

// Re-export the routes function to be used by the main backend service
pub use routes::routes;

pub use handlers::MessagesState;
pub use logic::MessageError;
pub use models::ConversationSummary;
