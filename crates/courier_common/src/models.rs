// This file contains data structures and models that are common across the application.
// Examples include:
// - The user profile view resolved through the identity collaborator
// - Push subscription records shared by the store and the dispatcher
// - The push notification payload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user as seen by the messaging layer.
///
/// User identity and credentials are owned by the identity collaborator;
/// this is the read-only view the messaging layer needs to validate
/// recipients and populate display names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserProfile {
    /// The user's opaque id
    pub id: String,

    /// The user's display name
    pub username: String,
}

/// A stored direct message.
///
/// Append-only: the `read` flag is the only mutable field and transitions
/// false→true exactly once. `created_at` is assigned at creation and is the
/// total order key for conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Message {
    /// The unique identifier for this message
    pub id: i64,

    /// The sending user's id
    pub sender_id: String,

    /// The receiving user's id
    pub recipient_id: String,

    /// The message text (non-empty, trimmed)
    pub content: String,

    /// Whether the recipient has read this message
    pub read: bool,

    /// The timestamp when this message was created
    pub created_at: DateTime<Utc>,
}

/// A message with sender and recipient resolved to profiles.
///
/// This is the record the HTTP boundary returns and the realtime channel
/// pushes: both participants see the same populated shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MessageRecord {
    /// The unique identifier for this message
    pub id: i64,

    /// The sending user
    pub sender: UserProfile,

    /// The receiving user
    pub recipient: UserProfile,

    /// The message text
    pub content: String,

    /// Whether the recipient has read this message
    pub read: bool,

    /// The timestamp when this message was created
    pub created_at: DateTime<Utc>,
}

impl MessageRecord {
    /// Populate a stored message with the two participants' profiles.
    ///
    /// The caller is responsible for passing profiles matching the stored
    /// sender and recipient ids.
    pub fn populate(message: Message, sender: UserProfile, recipient: UserProfile) -> Self {
        Self {
            id: message.id,
            sender,
            recipient,
            content: message.content,
            read: message.read,
            created_at: message.created_at,
        }
    }
}

/// A stored Web Push subscription.
///
/// Each subscription belongs to one user and is unique per
/// (user, endpoint) pair. Re-subscribing with the same endpoint updates
/// the key material in place rather than duplicating the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PushSubscription {
    /// The unique identifier for this subscription
    pub id: Option<i64>,

    /// The owning user's id
    pub user_id: String,

    /// The push service delivery endpoint
    pub endpoint: String,

    /// The client's public key material (p256dh)
    pub p256dh: String,

    /// The client's auth secret material
    pub auth: String,

    /// The timestamp when this subscription was created
    pub created_at: Option<DateTime<Utc>>,
}

/// The payload delivered through the push transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NotificationPayload {
    /// Notification title; embeds the sender's display name
    pub title: String,

    /// Content preview, truncated to a fixed length
    pub body: String,
}
