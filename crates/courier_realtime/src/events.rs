//! Events exchanged over the realtime channel
//!
//! The wire format is tagged JSON: `{"event": "...", "data": {...}}`.
//! Server events fan out through per-connection mailboxes; the only
//! client event is the typing signal.

use courier_common::models::MessageRecord;
use serde::{Deserialize, Serialize};

/// Events pushed from the server to a live connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// A message was stored; delivered to both participants when present.
    /// Carries the full populated record so clients need no follow-up fetch.
    #[serde(rename = "newMessage")]
    NewMessage(MessageRecord),

    /// The named user read the receiving user's messages.
    #[serde(rename = "messagesRead")]
    MessagesRead { from: String },

    /// The named user is typing to the receiving user. Advisory only;
    /// the client expires the indicator after a short quiet window.
    #[serde(rename = "typing")]
    Typing { from: String },
}

/// Events a client sends over the realtime channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// The connected user is typing to `to`.
    #[serde(rename = "typing")]
    Typing { to: String },
}
