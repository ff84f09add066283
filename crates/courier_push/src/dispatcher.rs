//! Push fallback dispatcher
//!
//! When a message's recipient has no live connection at send time, the
//! dispatcher delivers an out-of-band notification to every subscription
//! the recipient has registered. Each delivery is an independent unit of
//! work: a failed endpoint is logged and skipped, siblings proceed, and
//! the triggering send already succeeded. There is no retry, no backoff,
//! and no dead-subscription pruning.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{error, warn};

use courier_common::models::NotificationPayload;
use courier_common::services::{BoxedError, PushTransport};
use courier_db::repositories::PushSubscriptionRepository;
use courier_db::SqlPushSubscriptionRepository;

/// Maximum number of characters of message content carried in a
/// notification body before truncation.
pub const PREVIEW_LENGTH: usize = 100;

/// Build the notification payload for a stored message.
///
/// The title references the sender; the body is the content truncated to
/// [`PREVIEW_LENGTH`] characters with an ellipsis marker appended when
/// truncated. Content at or under the limit is carried unmodified.
pub fn notification_payload(sender_username: &str, content: &str) -> NotificationPayload {
    let body = if content.chars().count() > PREVIEW_LENGTH {
        let preview: String = content.chars().take(PREVIEW_LENGTH).collect();
        format!("{}...", preview)
    } else {
        content.to_string()
    };

    NotificationPayload {
        title: format!("New message from {}", sender_username),
        body,
    }
}

/// Fans one notification out to all of a recipient's subscriptions.
pub struct PushDispatcher {
    subscriptions: SqlPushSubscriptionRepository,
    transport: Arc<dyn PushTransport<Error = BoxedError>>,
}

impl PushDispatcher {
    pub fn new(
        subscriptions: SqlPushSubscriptionRepository,
        transport: Arc<dyn PushTransport<Error = BoxedError>>,
    ) -> Self {
        Self {
            subscriptions,
            transport,
        }
    }

    /// Attempt delivery to every subscription the recipient has registered.
    ///
    /// Zero subscriptions is a silent no-op. Failures are logged per
    /// subscription and never abort the remaining deliveries.
    ///
    /// # Returns
    ///
    /// The number of delivery attempts made.
    pub async fn dispatch(&self, recipient_id: &str, payload: &NotificationPayload) -> usize {
        let subscriptions = match self.subscriptions.find_by_user(recipient_id).await {
            Ok(subscriptions) => subscriptions,
            Err(err) => {
                error!(recipient_id, "failed to load push subscriptions: {}", err);
                return 0;
            }
        };

        if subscriptions.is_empty() {
            return 0;
        }

        let attempts = subscriptions.len();
        let deliveries = subscriptions
            .iter()
            .map(|subscription| async move {
                if let Err(err) = self.transport.deliver(subscription, payload).await {
                    warn!(
                        endpoint = %subscription.endpoint,
                        "push delivery failed: {}",
                        err
                    );
                }
            })
            .collect::<Vec<_>>();
        join_all(deliveries).await;

        attempts
    }

    /// Dispatch in the background so notification fan-out never extends the
    /// triggering request's latency.
    pub fn dispatch_detached(self: Arc<Self>, recipient_id: String, payload: NotificationPayload) {
        tokio::spawn(async move {
            self.dispatch(&recipient_id, &payload).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_common::models::PushSubscription;
    use courier_common::services::BoxFuture;
    use courier_db::DbClient;
    use std::sync::Mutex;

    /// Transport that records every delivery and fails selected endpoints.
    struct RecordingTransport {
        calls: Mutex<Vec<(String, NotificationPayload)>>,
        failing_endpoint: Option<String>,
    }

    impl RecordingTransport {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                failing_endpoint: None,
            }
        }

        fn failing_on(endpoint: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                failing_endpoint: Some(endpoint.to_string()),
            }
        }

        fn calls(&self) -> Vec<(String, NotificationPayload)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PushTransport for RecordingTransport {
        type Error = BoxedError;

        fn deliver<'a>(
            &'a self,
            subscription: &'a PushSubscription,
            payload: &'a NotificationPayload,
        ) -> BoxFuture<'a, (), BoxedError> {
            Box::pin(async move {
                self.calls
                    .lock()
                    .unwrap()
                    .push((subscription.endpoint.clone(), payload.clone()));
                if self.failing_endpoint.as_deref() == Some(subscription.endpoint.as_str()) {
                    return Err(BoxedError(Box::from("410 Gone")));
                }
                Ok(())
            })
        }
    }

    fn subscription(user_id: &str, endpoint: &str) -> PushSubscription {
        PushSubscription {
            id: None,
            user_id: user_id.to_string(),
            endpoint: endpoint.to_string(),
            p256dh: "p256dh-key".to_string(),
            auth: "auth-secret".to_string(),
            created_at: None,
        }
    }

    async fn repo() -> SqlPushSubscriptionRepository {
        let client = DbClient::in_memory().await.unwrap();
        let repo = SqlPushSubscriptionRepository::new(client);
        repo.init_schema().await.unwrap();
        repo
    }

    #[tokio::test]
    async fn delivers_exactly_once_per_subscription() {
        let repo = repo().await;
        repo.upsert(subscription("bob", "https://push.example/a"))
            .await
            .unwrap();
        repo.upsert(subscription("bob", "https://push.example/b"))
            .await
            .unwrap();

        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = PushDispatcher::new(repo, transport.clone());

        let payload = notification_payload("alice", "hello");
        let attempts = dispatcher.dispatch("bob", &payload).await;

        assert_eq!(attempts, 2);
        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|(_, p)| p.body == "hello"));
    }

    #[tokio::test]
    async fn zero_subscriptions_is_a_silent_no_op() {
        let repo = repo().await;
        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = PushDispatcher::new(repo, transport.clone());

        let attempts = dispatcher
            .dispatch("bob", &notification_payload("alice", "hello"))
            .await;

        assert_eq!(attempts, 0);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn one_failing_endpoint_does_not_abort_siblings() {
        let repo = repo().await;
        repo.upsert(subscription("bob", "https://push.example/dead"))
            .await
            .unwrap();
        repo.upsert(subscription("bob", "https://push.example/live"))
            .await
            .unwrap();

        let transport = Arc::new(RecordingTransport::failing_on("https://push.example/dead"));
        let dispatcher = PushDispatcher::new(repo, transport.clone());

        let attempts = dispatcher
            .dispatch("bob", &notification_payload("alice", "hello"))
            .await;

        // Both endpoints were attempted despite the failure
        assert_eq!(attempts, 2);
        assert_eq!(transport.calls().len(), 2);
    }

    #[test]
    fn preview_is_truncated_over_the_limit_only() {
        let exact: String = "x".repeat(PREVIEW_LENGTH);
        assert_eq!(notification_payload("alice", &exact).body, exact);

        let under = "hello";
        assert_eq!(notification_payload("alice", under).body, "hello");

        let over: String = "y".repeat(PREVIEW_LENGTH + 1);
        let body = notification_payload("alice", &over).body;
        assert_eq!(body.chars().count(), PREVIEW_LENGTH + 3);
        assert!(body.ends_with("..."));
        assert!(body.starts_with(&"y".repeat(PREVIEW_LENGTH)));
    }

    #[test]
    fn title_references_the_sender() {
        let payload = notification_payload("alice", "hi");
        assert_eq!(payload.title, "New message from alice");
    }
}
