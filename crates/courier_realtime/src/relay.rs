//! Realtime relay
//!
//! Fans stored-message and read-receipt events out to whichever
//! participants currently have a live connection. Connection absence is
//! not an error: events are never queued or retried, because the message
//! is already durable and delivery confidence beyond that is advisory.

use std::sync::Arc;
use tracing::debug;

use courier_common::models::MessageRecord;

use crate::events::ServerEvent;
use crate::registry::PresenceRegistry;

/// Pushes events to live connections found in the presence registry.
pub struct RealtimeRelay {
    registry: Arc<PresenceRegistry>,
}

impl RealtimeRelay {
    pub fn new(registry: Arc<PresenceRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver a freshly stored message to both participants' live
    /// connections.
    ///
    /// The recipient and the sender are looked up independently; the
    /// sender's own connection gets the event too, so their other open
    /// session reflects the send.
    pub async fn notify_new_message(&self, record: &MessageRecord) {
        if let Some(conn) = self.registry.lookup(&record.recipient.id).await {
            conn.push(ServerEvent::NewMessage(record.clone()));
        }
        // Self-messages get exactly one event on the shared connection
        if record.sender.id != record.recipient.id {
            if let Some(conn) = self.registry.lookup(&record.sender.id).await {
                conn.push(ServerEvent::NewMessage(record.clone()));
            }
        }
        debug!(
            sender = %record.sender.id,
            recipient = %record.recipient.id,
            "relayed newMessage"
        );
    }

    /// Tell the original sender that `reader` has read their messages.
    ///
    /// Sent only when the sender is connected right now; read receipts are
    /// not queued or retried.
    pub async fn notify_messages_read(&self, original_sender: &str, reader: &str) {
        if let Some(conn) = self.registry.lookup(original_sender).await {
            conn.push(ServerEvent::MessagesRead {
                from: reader.to_string(),
            });
            debug!(original_sender, reader, "relayed messagesRead");
        }
    }

    /// Forward a typing signal to the recipient if connected.
    pub async fn forward_typing(&self, to: &str, from: &str) {
        if let Some(conn) = self.registry.lookup(to).await {
            conn.push(ServerEvent::Typing {
                from: from.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ConnectionHandle;
    use chrono::Utc;
    use courier_common::models::UserProfile;

    fn record(sender: &str, recipient: &str, content: &str) -> MessageRecord {
        MessageRecord {
            id: 1,
            sender: UserProfile {
                id: sender.to_string(),
                username: sender.to_string(),
            },
            recipient: UserProfile {
                id: recipient.to_string(),
                username: recipient.to_string(),
            },
            content: content.to_string(),
            read: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn new_message_reaches_both_present_participants() {
        let registry = Arc::new(PresenceRegistry::new());
        let relay = RealtimeRelay::new(registry.clone());

        let (alice, mut alice_rx) = ConnectionHandle::new();
        let (bob, mut bob_rx) = ConnectionHandle::new();
        registry.register("alice", alice).await;
        registry.register("bob", bob).await;

        relay.notify_new_message(&record("alice", "bob", "hi")).await;

        assert!(matches!(
            alice_rx.try_recv().unwrap(),
            ServerEvent::NewMessage(_)
        ));
        assert!(matches!(
            bob_rx.try_recv().unwrap(),
            ServerEvent::NewMessage(_)
        ));
        // Exactly one event each
        assert!(alice_rx.try_recv().is_err());
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn absent_participants_get_nothing_and_nothing_fails() {
        let registry = Arc::new(PresenceRegistry::new());
        let relay = RealtimeRelay::new(registry.clone());

        let (alice, mut alice_rx) = ConnectionHandle::new();
        registry.register("alice", alice).await;

        // Recipient offline: only the sender's own connection sees the event
        relay.notify_new_message(&record("alice", "bob", "hi")).await;
        assert!(matches!(
            alice_rx.try_recv().unwrap(),
            ServerEvent::NewMessage(_)
        ));
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn self_message_is_delivered_once() {
        let registry = Arc::new(PresenceRegistry::new());
        let relay = RealtimeRelay::new(registry.clone());

        let (alice, mut alice_rx) = ConnectionHandle::new();
        registry.register("alice", alice).await;

        relay
            .notify_new_message(&record("alice", "alice", "note"))
            .await;
        assert!(matches!(
            alice_rx.try_recv().unwrap(),
            ServerEvent::NewMessage(_)
        ));
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn read_receipt_goes_only_to_the_original_sender() {
        let registry = Arc::new(PresenceRegistry::new());
        let relay = RealtimeRelay::new(registry.clone());

        let (alice, mut alice_rx) = ConnectionHandle::new();
        registry.register("alice", alice).await;

        relay.notify_messages_read("alice", "bob").await;
        assert_eq!(
            alice_rx.try_recv().unwrap(),
            ServerEvent::MessagesRead {
                from: "bob".to_string()
            }
        );

        // Sender offline: silently dropped
        relay.notify_messages_read("carol", "bob").await;
    }

    #[tokio::test]
    async fn typing_is_forwarded_to_present_recipients_only() {
        let registry = Arc::new(PresenceRegistry::new());
        let relay = RealtimeRelay::new(registry.clone());

        let (bob, mut bob_rx) = ConnectionHandle::new();
        registry.register("bob", bob).await;

        relay.forward_typing("bob", "alice").await;
        assert_eq!(
            bob_rx.try_recv().unwrap(),
            ServerEvent::Typing {
                from: "alice".to_string()
            }
        );

        relay.forward_typing("nobody", "alice").await;
        assert!(bob_rx.try_recv().is_err());
    }
}
