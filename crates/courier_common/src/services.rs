//! Service abstractions for external collaborators.
//!
//! This module provides trait definitions for the collaborators the
//! messaging core depends on but does not own: the identity collaborator's
//! user directory and the push transport. These traits allow for dependency
//! injection and easier testing by decoupling the core logic from specific
//! implementations.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::models::{NotificationPayload, PushSubscription, UserProfile};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// Read-only access to the identity collaborator's user records.
///
/// The messaging layer uses this to validate that a recipient exists and to
/// resolve display names for conversation summaries and notification titles.
pub trait UserDirectory: Send + Sync {
    /// Error type returned by directory lookups.
    type Error: StdError + Send + Sync + 'static;

    /// Resolve a user id to a profile, or None if no such user exists.
    fn find_user<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Option<UserProfile>, Self::Error>;
}

/// Delivery of one notification payload to one push subscription.
///
/// Implementations perform the actual out-of-band delivery (network I/O
/// included). The dispatcher treats every delivery as independent and
/// best-effort: a failure is logged and never aborts sibling deliveries or
/// the send that triggered it.
pub trait PushTransport: Send + Sync {
    /// Error type returned by delivery attempts.
    type Error: StdError + Send + Sync + 'static;

    /// Attempt delivery of `payload` to `subscription`, exactly once.
    fn deliver<'a>(
        &'a self,
        subscription: &'a PushSubscription,
        payload: &'a NotificationPayload,
    ) -> BoxFuture<'a, (), Self::Error>;
}
