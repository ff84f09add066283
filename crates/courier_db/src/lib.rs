//! Database integration for Courier
//!
//! This crate provides the SQLite-backed stores of the messaging layer:
//! the append-only message store, the push subscription store, and a
//! read-only view of the users table owned by the identity collaborator.
//! Each store is defined as a repository trait with an SQL implementation,
//! so core logic can be tested against in-memory fakes.

pub mod client;
pub mod error;
pub mod repositories;

// Re-export the client and the repositories for ease of use
pub use client::DbClient;
pub use error::DbError;
pub use repositories::{
    MessageRepository, PushSubscriptionRepository, SqlMessageRepository,
    SqlPushSubscriptionRepository, SqlUserDirectory,
};
