//! Repository for push subscriptions
//!
//! Subscriptions are unique per (user, endpoint) pair: re-subscribing with
//! the same endpoint updates the key material in place. Only the owning
//! user can delete a subscription.

use crate::error::DbError;

// Re-export PushSubscription from courier_common for convenience
pub use courier_common::models::PushSubscription;

/// Repository for push subscriptions
pub trait PushSubscriptionRepository {
    /// Initialize the database schema
    ///
    /// Creates the push_subscriptions table if it doesn't already exist.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Store a subscription, updating key material in place when the
    /// (user, endpoint) pair already exists.
    ///
    /// # Returns
    ///
    /// The stored subscription with its id set.
    fn upsert(
        &self,
        subscription: PushSubscription,
    ) -> impl std::future::Future<Output = Result<PushSubscription, DbError>> + Send;

    /// All subscriptions registered by a user.
    fn find_by_user(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<PushSubscription>, DbError>> + Send;

    /// Delete a subscription, but only if `user_id` owns it.
    ///
    /// # Returns
    ///
    /// `true` if a subscription was deleted, `false` if none matched
    /// (missing and not-owned are indistinguishable to the caller).
    fn delete_owned(
        &self,
        id: i64,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;
}
