//! Request and response types for the message routes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the authenticated user's conversation list.
///
/// Derived on every request from the message store, never persisted, so
/// it is always consistent with the store at read time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConversationSummary {
    /// The other participant's id
    pub other_id: String,

    /// The other participant's display name
    pub other_username: String,

    /// Content of the most recent message exchanged
    pub last_message: String,

    /// Timestamp of the most recent message exchanged
    pub last_time: DateTime<Utc>,

    /// Number of unread messages the requesting user has from the other
    /// participant
    pub unread_count: u64,
}

/// Request body for sending a message
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SendMessageRequest {
    /// The recipient's user id
    pub recipient: Option<String>,

    /// The message text
    pub content: Option<String>,
}

/// Query parameter naming the other conversation participant
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct WithQuery {
    /// The other user's id
    pub with: Option<String>,
}

/// Response body for the mark-read endpoint
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MarkReadResponse {
    /// Number of messages flipped to read
    pub updated: u64,
}
