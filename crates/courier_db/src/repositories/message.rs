//! Repository for the message store
//!
//! The message store is append-only: rows are created on send and the
//! `read` flag is the only thing that ever changes, false→true, exactly
//! once. There is no deletion path.

use crate::error::DbError;

// Re-export Message from courier_common for convenience
pub use courier_common::models::Message;

/// Repository for stored messages
pub trait MessageRepository {
    /// Initialize the database schema
    ///
    /// Creates the messages table if it doesn't already exist.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Persist a new message with `read = false` and the current timestamp.
    ///
    /// Content validation (non-empty after trimming) and recipient
    /// resolution are the caller's responsibility; this only stores.
    ///
    /// # Returns
    ///
    /// The stored message with its id and timestamp assigned.
    fn create(
        &self,
        sender_id: &str,
        recipient_id: &str,
        content: &str,
    ) -> impl std::future::Future<Output = Result<Message, DbError>> + Send;

    /// All messages exchanged between the two users, in either direction,
    /// ascending by `(created_at, id)`, conversation reading order. The
    /// whole history is returned per call; there is no pagination.
    fn list_between(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, DbError>> + Send;

    /// All messages where the user is sender or recipient, ascending by
    /// `(created_at, id)`. Used by the conversation aggregator.
    fn list_all_for(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, DbError>> + Send;

    /// Flip `read` false→true on every message from `sender_id` to
    /// `recipient_id`.
    ///
    /// # Returns
    ///
    /// The number of rows updated. Idempotent: a repeat call updates 0.
    fn mark_read(
        &self,
        recipient_id: &str,
        sender_id: &str,
    ) -> impl std::future::Future<Output = Result<u64, DbError>> + Send;
}
