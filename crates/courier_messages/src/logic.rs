//! Core messaging logic
//!
//! Orchestrates the message store, the user directory, the realtime relay,
//! and the push fallback dispatcher. The rule running through every
//! operation here: once a message is durably stored the send has
//! succeeded; live delivery and push fallback are best-effort and their
//! failures never reach the caller.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use courier_common::auth::AuthUser;
use courier_common::models::{Message, MessageRecord, UserProfile};
use courier_common::services::UserDirectory;
use courier_db::repositories::MessageRepository;
use courier_db::DbError;
use courier_push::{notification_payload, PushDispatcher};
use courier_realtime::{PresenceRegistry, RealtimeRelay};

use crate::models::ConversationSummary;

/// Errors surfaced by the message operations
#[derive(Error, Debug)]
pub enum MessageError {
    /// Recipient or content missing/blank; nothing was stored
    #[error("Recipient and content are required")]
    MissingFields,

    /// The named recipient does not resolve to an existing user
    #[error("Recipient not found")]
    RecipientNotFound,

    /// The `with` query parameter is required for this operation
    #[error("Missing other user ID in query parameter \"with\"")]
    MissingCounterpart,

    /// Underlying storage failure
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// The user directory could not be consulted
    #[error("Directory error: {0}")]
    Directory(String),
}

/// Send a message from the authenticated user.
///
/// Validates, persists, then fans out: the relay pushes the stored record
/// to both participants' live connections, and when the recipient has no
/// live connection the dispatcher delivers a fallback push in the
/// background. The returned record is the durably stored message; it is
/// returned regardless of live-delivery or push outcome.
pub async fn send_message<R, D>(
    repo: &R,
    directory: &D,
    registry: &PresenceRegistry,
    relay: &RealtimeRelay,
    dispatcher: Option<&Arc<PushDispatcher>>,
    sender: &AuthUser,
    recipient: Option<&str>,
    content: Option<&str>,
) -> Result<MessageRecord, MessageError>
where
    R: MessageRepository + Sync,
    D: UserDirectory + ?Sized,
{
    let recipient_id = recipient
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or(MessageError::MissingFields)?;
    let content = content
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(MessageError::MissingFields)?;

    let recipient_profile = directory
        .find_user(recipient_id)
        .await
        .map_err(|e| MessageError::Directory(e.to_string()))?
        .ok_or(MessageError::RecipientNotFound)?;

    let stored = repo.create(&sender.id, recipient_id, content).await?;
    let record = MessageRecord::populate(
        stored,
        UserProfile {
            id: sender.id.clone(),
            username: sender.username.clone(),
        },
        recipient_profile,
    );

    relay.notify_new_message(&record).await;

    // Fallback push only when the recipient has no live connection right
    // now; detached so fan-out never extends the response.
    if !registry.is_present(&record.recipient.id).await {
        if let Some(dispatcher) = dispatcher {
            let payload = notification_payload(&record.sender.username, &record.content);
            Arc::clone(dispatcher).dispatch_detached(record.recipient.id.clone(), payload);
        }
    }

    debug!(
        sender = %record.sender.id,
        recipient = %record.recipient.id,
        "message stored"
    );
    Ok(record)
}

/// The authenticated user's message history, populated with profiles.
///
/// With a counterpart this is the two users' conversation in reading
/// order; without one it is everything involving the caller.
pub async fn list_messages<R, D>(
    repo: &R,
    directory: &D,
    caller: &AuthUser,
    with: Option<&str>,
) -> Result<Vec<MessageRecord>, MessageError>
where
    R: MessageRepository + Sync,
    D: UserDirectory + ?Sized,
{
    let messages = match with.map(str::trim).filter(|w| !w.is_empty()) {
        Some(other) => repo.list_between(&caller.id, other).await?,
        None => repo.list_all_for(&caller.id).await?,
    };

    let mut profiles: HashMap<String, UserProfile> = HashMap::new();
    let mut records = Vec::with_capacity(messages.len());
    for message in messages {
        let sender = resolve_profile(directory, &mut profiles, caller, &message.sender_id).await?;
        let recipient =
            resolve_profile(directory, &mut profiles, caller, &message.recipient_id).await?;
        records.push(MessageRecord::populate(message, sender, recipient));
    }
    Ok(records)
}

/// Mark all messages from `with` to the caller as read.
///
/// Idempotent: repeating the call updates nothing. When anything was
/// updated and the original sender is connected, they receive a
/// `messagesRead` event naming the caller; read receipts are never queued
/// or retried.
pub async fn mark_read<R>(
    repo: &R,
    relay: &RealtimeRelay,
    caller: &AuthUser,
    with: Option<&str>,
) -> Result<u64, MessageError>
where
    R: MessageRepository + Sync,
{
    let other = with
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .ok_or(MessageError::MissingCounterpart)?;

    let updated = repo.mark_read(&caller.id, other).await?;
    if updated > 0 {
        relay.notify_messages_read(other, &caller.id).await;
    }
    Ok(updated)
}

/// The caller's conversation list, newest conversation first.
///
/// One summary per distinct counterpart: the latest message as preview and
/// the count of unread messages the caller has from that counterpart.
/// Recomputed from the store on every call. Messages with equal timestamps
/// tie-break by id: higher id is newer (insertion order).
pub async fn summarize<R, D>(
    repo: &R,
    directory: &D,
    caller: &AuthUser,
) -> Result<Vec<ConversationSummary>, MessageError>
where
    R: MessageRepository + Sync,
    D: UserDirectory + ?Sized,
{
    let messages = repo.list_all_for(&caller.id).await?;

    struct Group<'a> {
        preview: &'a Message,
        unread: u64,
    }

    let mut groups: HashMap<&str, Group> = HashMap::new();
    for message in &messages {
        let other = if message.sender_id == caller.id {
            message.recipient_id.as_str()
        } else {
            message.sender_id.as_str()
        };

        let group = groups.entry(other).or_insert(Group {
            preview: message,
            unread: 0,
        });
        if (message.created_at, message.id) > (group.preview.created_at, group.preview.id) {
            group.preview = message;
        }
        if !message.read && message.recipient_id == caller.id && message.sender_id == other {
            group.unread += 1;
        }
    }

    let mut keyed: Vec<(i64, ConversationSummary)> = Vec::with_capacity(groups.len());
    for (other_id, group) in groups {
        let other_username = match directory
            .find_user(other_id)
            .await
            .map_err(|e| MessageError::Directory(e.to_string()))?
        {
            Some(profile) => profile.username,
            None => other_id.to_string(),
        };

        keyed.push((
            group.preview.id,
            ConversationSummary {
                other_id: other_id.to_string(),
                other_username,
                last_message: group.preview.content.clone(),
                last_time: group.preview.created_at,
                unread_count: group.unread,
            },
        ));
    }

    keyed.sort_by(|(id_a, a), (id_b, b)| {
        b.last_time.cmp(&a.last_time).then(id_b.cmp(id_a))
    });
    Ok(keyed.into_iter().map(|(_, summary)| summary).collect())
}

async fn resolve_profile<D>(
    directory: &D,
    cache: &mut HashMap<String, UserProfile>,
    caller: &AuthUser,
    user_id: &str,
) -> Result<UserProfile, MessageError>
where
    D: UserDirectory + ?Sized,
{
    if user_id == caller.id {
        return Ok(UserProfile {
            id: caller.id.clone(),
            username: caller.username.clone(),
        });
    }
    if let Some(profile) = cache.get(user_id) {
        return Ok(profile.clone());
    }

    let profile = directory
        .find_user(user_id)
        .await
        .map_err(|e| MessageError::Directory(e.to_string()))?
        .unwrap_or_else(|| UserProfile {
            id: user_id.to_string(),
            username: user_id.to_string(),
        });
    cache.insert(user_id.to_string(), profile.clone());
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use courier_common::services::{BoxFuture, BoxedError};
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    /// In-memory message store with a controllable clock.
    #[derive(Default)]
    struct MemoryMessageStore {
        messages: Mutex<Vec<Message>>,
        next_id: AtomicI64,
    }

    impl MemoryMessageStore {
        fn new() -> Self {
            Self::default()
        }

        fn insert_at(
            &self,
            sender: &str,
            recipient: &str,
            content: &str,
            created_at: DateTime<Utc>,
        ) -> Message {
            let message = Message {
                id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
                sender_id: sender.to_string(),
                recipient_id: recipient.to_string(),
                content: content.to_string(),
                read: false,
                created_at,
            };
            self.messages.lock().unwrap().push(message.clone());
            message
        }
    }

    impl MessageRepository for MemoryMessageStore {
        async fn init_schema(&self) -> Result<(), DbError> {
            Ok(())
        }

        async fn create(
            &self,
            sender_id: &str,
            recipient_id: &str,
            content: &str,
        ) -> Result<Message, DbError> {
            Ok(self.insert_at(sender_id, recipient_id, content, Utc::now()))
        }

        async fn list_between(&self, user_a: &str, user_b: &str) -> Result<Vec<Message>, DbError> {
            let mut result: Vec<Message> = self
                .messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| {
                    (m.sender_id == user_a && m.recipient_id == user_b)
                        || (m.sender_id == user_b && m.recipient_id == user_a)
                })
                .cloned()
                .collect();
            result.sort_by_key(|m| (m.created_at, m.id));
            Ok(result)
        }

        async fn list_all_for(&self, user_id: &str) -> Result<Vec<Message>, DbError> {
            let mut result: Vec<Message> = self
                .messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.sender_id == user_id || m.recipient_id == user_id)
                .cloned()
                .collect();
            result.sort_by_key(|m| (m.created_at, m.id));
            Ok(result)
        }

        async fn mark_read(&self, recipient_id: &str, sender_id: &str) -> Result<u64, DbError> {
            let mut messages = self.messages.lock().unwrap();
            let mut updated = 0;
            for message in messages.iter_mut() {
                if message.sender_id == sender_id
                    && message.recipient_id == recipient_id
                    && !message.read
                {
                    message.read = true;
                    updated += 1;
                }
            }
            Ok(updated)
        }
    }

    /// Directory backed by a fixed user list.
    struct FixedDirectory {
        users: Vec<UserProfile>,
    }

    impl FixedDirectory {
        fn with(ids: &[(&str, &str)]) -> Self {
            Self {
                users: ids
                    .iter()
                    .map(|(id, username)| UserProfile {
                        id: id.to_string(),
                        username: username.to_string(),
                    })
                    .collect(),
            }
        }
    }

    impl UserDirectory for FixedDirectory {
        type Error = BoxedError;

        fn find_user<'a>(
            &'a self,
            user_id: &'a str,
        ) -> BoxFuture<'a, Option<UserProfile>, BoxedError> {
            Box::pin(async move { Ok(self.users.iter().find(|u| u.id == user_id).cloned()) })
        }
    }

    fn user(id: &str, username: &str) -> AuthUser {
        AuthUser {
            id: id.to_string(),
            username: username.to_string(),
        }
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    fn fixtures() -> (MemoryMessageStore, FixedDirectory, Arc<PresenceRegistry>, RealtimeRelay)
    {
        let registry = Arc::new(PresenceRegistry::new());
        let relay = RealtimeRelay::new(registry.clone());
        (
            MemoryMessageStore::new(),
            FixedDirectory::with(&[("u1", "alice"), ("u2", "bob"), ("u3", "carol")]),
            registry,
            relay,
        )
    }

    #[tokio::test]
    async fn send_rejects_blank_fields_without_storing() {
        let (repo, directory, registry, relay) = fixtures();
        let alice = user("u1", "alice");

        for (recipient, content) in [
            (None, Some("hi")),
            (Some("u2"), None),
            (Some("u2"), Some("   ")),
            (Some(""), Some("hi")),
        ] {
            let result = send_message(
                &repo, &directory, &registry, &relay, None, &alice, recipient, content,
            )
            .await;
            assert!(matches!(result, Err(MessageError::MissingFields)));
        }
        assert!(repo.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_rejects_unknown_recipients() {
        let (repo, directory, registry, relay) = fixtures();
        let alice = user("u1", "alice");

        let result = send_message(
            &repo,
            &directory,
            &registry,
            &relay,
            None,
            &alice,
            Some("ghost"),
            Some("hi"),
        )
        .await;
        assert!(matches!(result, Err(MessageError::RecipientNotFound)));
        assert!(repo.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_trims_content_and_returns_the_populated_record() {
        let (repo, directory, registry, relay) = fixtures();
        let alice = user("u1", "alice");

        let record = send_message(
            &repo,
            &directory,
            &registry,
            &relay,
            None,
            &alice,
            Some("u2"),
            Some("  hello  "),
        )
        .await
        .unwrap();

        assert_eq!(record.content, "hello");
        assert!(!record.read);
        assert_eq!(record.sender.username, "alice");
        assert_eq!(record.recipient.username, "bob");

        let history = list_messages(&repo, &directory, &alice, Some("u2"))
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0], record);
    }

    #[tokio::test]
    async fn mark_read_requires_a_counterpart_and_is_idempotent() {
        let (repo, directory, registry, relay) = fixtures();
        let _ = (&directory, &registry);
        let bob = user("u2", "bob");

        repo.insert_at("u1", "u2", "one", at(0));
        repo.insert_at("u1", "u2", "two", at(1));

        assert!(matches!(
            mark_read(&repo, &relay, &bob, None).await,
            Err(MessageError::MissingCounterpart)
        ));

        let first = mark_read(&repo, &relay, &bob, Some("u1")).await.unwrap();
        let second = mark_read(&repo, &relay, &bob, Some("u1")).await.unwrap();
        assert_eq!((first, second), (2, 0));
    }

    #[tokio::test]
    async fn summaries_group_by_counterpart_and_count_unread() {
        let (repo, directory, _registry, relay) = fixtures();
        let alice = user("u1", "alice");

        // Two threads: bob (two unread for alice), carol (read traffic)
        repo.insert_at("u2", "u1", "from bob 1", at(0));
        repo.insert_at("u1", "u2", "to bob", at(1));
        repo.insert_at("u2", "u1", "from bob 2", at(2));
        repo.insert_at("u3", "u1", "from carol", at(3));
        mark_read(&repo, &relay, &alice, Some("u3")).await.unwrap();

        let summaries = summarize(&repo, &directory, &alice).await.unwrap();
        assert_eq!(summaries.len(), 2);

        // Newest conversation first
        assert_eq!(summaries[0].other_id, "u3");
        assert_eq!(summaries[0].other_username, "carol");
        assert_eq!(summaries[0].unread_count, 0);
        assert_eq!(summaries[0].last_message, "from carol");

        assert_eq!(summaries[1].other_id, "u2");
        assert_eq!(summaries[1].unread_count, 2);
        assert_eq!(summaries[1].last_message, "from bob 2");
    }

    #[tokio::test]
    async fn summary_unread_counts_track_interleaved_sends_and_marks() {
        let (repo, directory, _registry, relay) = fixtures();
        let alice = user("u1", "alice");

        repo.insert_at("u2", "u1", "a", at(0));
        mark_read(&repo, &relay, &alice, Some("u2")).await.unwrap();
        repo.insert_at("u2", "u1", "b", at(1));
        repo.insert_at("u2", "u1", "c", at(2));

        let summaries = summarize(&repo, &directory, &alice).await.unwrap();
        assert_eq!(summaries[0].unread_count, 2);

        mark_read(&repo, &relay, &alice, Some("u2")).await.unwrap();
        let summaries = summarize(&repo, &directory, &alice).await.unwrap();
        assert_eq!(summaries[0].unread_count, 0);
    }

    #[tokio::test]
    async fn equal_timestamps_tie_break_by_insertion_order() {
        let (repo, directory, _registry, _relay) = fixtures();
        let alice = user("u1", "alice");

        let when = at(10);
        repo.insert_at("u2", "u1", "first", when);
        repo.insert_at("u2", "u1", "second", when);

        let summaries = summarize(&repo, &directory, &alice).await.unwrap();
        // The later insert (higher id) wins the preview
        assert_eq!(summaries[0].last_message, "second");
    }

    #[tokio::test]
    async fn messages_a_user_sent_do_not_count_as_their_unread() {
        let (repo, directory, _registry, _relay) = fixtures();
        let alice = user("u1", "alice");

        repo.insert_at("u1", "u2", "outbound", at(0));
        let summaries = summarize(&repo, &directory, &alice).await.unwrap();
        assert_eq!(summaries[0].unread_count, 0);

        // ...while the recipient sees it as unread
        let bob = user("u2", "bob");
        let summaries = summarize(&repo, &directory, &bob).await.unwrap();
        assert_eq!(summaries[0].unread_count, 1);
    }
}
