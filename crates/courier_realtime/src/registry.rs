//! Presence registry
//!
//! Process-wide mapping from an authenticated user id to their single live
//! connection. The registry is the one piece of shared, concurrently
//! mutated state in the messaging core, and the single source of truth for
//! "is this user reachable right now": every relay and the push fallback
//! dispatcher consult it.
//!
//! Semantics: at most one entry per user; a new connection replaces the
//! prior entry (last-connect-wins), and unregister is compare-and-remove so
//! a stale disconnect can never evict a newer registration.

use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::events::ServerEvent;

/// The addressable mailbox of one live connection.
///
/// Pushing an event enqueues it for the connection's socket task; the
/// registry and relays never block on the receiving side.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    connection_id: Uuid,
    sender: mpsc::UnboundedSender<ServerEvent>,
}

impl ConnectionHandle {
    /// Create a handle and the receiving end its socket task drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                connection_id: Uuid::new_v4(),
                sender,
            },
            receiver,
        )
    }

    /// The id distinguishing this connection from any later one for the
    /// same user (compare-and-remove on unregister).
    pub fn connection_id(&self) -> Uuid {
        self.connection_id
    }

    /// Enqueue an event for this connection.
    ///
    /// Returns false when the connection's receiving task is gone: the
    /// narrow window where a peer disconnects between lookup and push.
    /// Callers treat that as "deliver nothing live", never as an error.
    pub fn push(&self, event: ServerEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

/// Process-wide user-id → live-connection mapping.
///
/// Owned by the backend's lifecycle and passed explicitly to the relay and
/// dispatcher; rebuilt from live connections, never persisted.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    inner: RwLock<HashMap<String, ConnectionHandle>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection for the user, replacing any existing entry.
    ///
    /// The prior connection is not closed here; its own disconnect path is
    /// responsible for that (and its unregister will be rejected as stale).
    pub async fn register(&self, user_id: &str, handle: ConnectionHandle) {
        let mut map = self.inner.write().await;
        let replaced = map.insert(user_id.to_string(), handle);
        debug!(
            user_id,
            replaced = replaced.is_some(),
            "registered live connection"
        );
    }

    /// Remove the user's entry only if it is still this connection.
    ///
    /// Returns true if the entry was removed; false means a newer
    /// connection had already replaced it and stays registered.
    pub async fn unregister(&self, user_id: &str, connection_id: Uuid) -> bool {
        let mut map = self.inner.write().await;
        match map.get(user_id) {
            Some(current) if current.connection_id() == connection_id => {
                map.remove(user_id);
                debug!(user_id, "unregistered live connection");
                true
            }
            _ => false,
        }
    }

    /// The user's live connection, if any.
    pub async fn lookup(&self, user_id: &str) -> Option<ConnectionHandle> {
        self.inner.read().await.get(user_id).cloned()
    }

    /// Whether the user currently has a live connection.
    pub async fn is_present(&self, user_id: &str) -> bool {
        self.inner.read().await.contains_key(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_replaces_and_stale_unregister_is_rejected() {
        let registry = PresenceRegistry::new();
        let (c1, _rx1) = ConnectionHandle::new();
        let (c2, _rx2) = ConnectionHandle::new();

        registry.register("u1", c1.clone()).await;
        registry.register("u1", c2.clone()).await;

        let current = registry.lookup("u1").await.unwrap();
        assert_eq!(current.connection_id(), c2.connection_id());

        // The replaced connection's disconnect must not evict the newer one
        assert!(!registry.unregister("u1", c1.connection_id()).await);
        let still = registry.lookup("u1").await.unwrap();
        assert_eq!(still.connection_id(), c2.connection_id());

        // The current connection's disconnect removes the entry
        assert!(registry.unregister("u1", c2.connection_id()).await);
        assert!(registry.lookup("u1").await.is_none());
    }

    #[tokio::test]
    async fn lookup_misses_unknown_users() {
        let registry = PresenceRegistry::new();
        assert!(registry.lookup("nobody").await.is_none());
        assert!(!registry.is_present("nobody").await);
    }

    #[tokio::test]
    async fn pushed_events_arrive_in_order() {
        let registry = PresenceRegistry::new();
        let (handle, mut rx) = ConnectionHandle::new();
        registry.register("u1", handle).await;

        let conn = registry.lookup("u1").await.unwrap();
        assert!(conn.push(ServerEvent::Typing {
            from: "a".to_string()
        }));
        assert!(conn.push(ServerEvent::MessagesRead {
            from: "b".to_string()
        }));

        assert_eq!(
            rx.recv().await.unwrap(),
            ServerEvent::Typing {
                from: "a".to_string()
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            ServerEvent::MessagesRead {
                from: "b".to_string()
            }
        );
    }

    #[tokio::test]
    async fn push_to_a_dropped_connection_reports_failure() {
        let (handle, rx) = ConnectionHandle::new();
        drop(rx);
        assert!(!handle.push(ServerEvent::Typing {
            from: "a".to_string()
        }));
    }
}
