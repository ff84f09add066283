// Declare modules within this crate
pub mod auth; // Bearer-token verification and the AuthUser extractor
pub mod error; // Error handling
pub mod logging; // Logging utilities
pub mod models; // Data structures shared across crates
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{
    authentication_error, database_error, not_found, validation_error, CourierError,
    HttpStatusCode,
};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level};

// Re-export auth primitives for easier access
pub use auth::{AuthKeys, AuthUser, Claims};

// Re-export shared models for easier access
pub use models::{Message, MessageRecord, NotificationPayload, PushSubscription, UserProfile};
