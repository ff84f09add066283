//! Application state construction
//!
//! Builds every long-lived component of the messaging backend from the
//! loaded configuration: the database client and stores, the presence
//! registry and relay (owned here, passed explicitly to the routes that
//! consult them), and, when push is enabled, the fallback dispatcher.

use std::error::Error;
use std::sync::Arc;
use tracing::{info, warn};

use courier_common::auth::AuthKeys;
use courier_config::AppConfig;
use courier_db::repositories::{MessageRepository, PushSubscriptionRepository};
use courier_db::{
    DbClient, SqlMessageRepository, SqlPushSubscriptionRepository, SqlUserDirectory,
};
use courier_messages::MessagesState;
use courier_push::{PushDispatcher, WebPushClient};
use courier_realtime::{PresenceRegistry, RealtimeRelay};

/// Application state that is shared across all routes.
///
/// Constructed once at startup and torn down at shutdown. The presence
/// registry lives here, injected into the message routes, the realtime
/// routes, and the dispatcher decision, never as ambient global state.
pub struct AppState {
    /// The application configuration.
    pub config: Arc<AppConfig>,

    /// Keys for verifying the identity collaborator's bearer tokens.
    pub auth: Arc<AuthKeys>,

    /// The process-wide presence registry.
    pub registry: Arc<PresenceRegistry>,

    /// The relay fanning events out to live connections.
    pub relay: Arc<RealtimeRelay>,

    /// State for the message routes.
    pub messages: MessagesState,

    /// The push subscription store.
    pub subscriptions: SqlPushSubscriptionRepository,

    /// The public VAPID key handed to subscribing clients, when push is
    /// configured.
    pub vapid_public_key: Option<String>,
}

impl AppState {
    /// Build the application state: connect to the database, initialize
    /// schemas, and wire the registry, relay, and dispatcher together.
    pub async fn build(config: Arc<AppConfig>) -> Result<Self, Box<dyn Error>> {
        let auth = Arc::new(AuthKeys::from_secret(&config.auth.jwt_secret));

        let db_client = DbClient::new(&config).await?;

        let repo = SqlMessageRepository::new(db_client.clone());
        repo.init_schema().await?;

        let subscriptions = SqlPushSubscriptionRepository::new(db_client.clone());
        subscriptions.init_schema().await?;

        let directory = SqlUserDirectory::new(db_client.clone());
        directory.init_schema().await?;

        let registry = Arc::new(PresenceRegistry::new());
        let relay = Arc::new(RealtimeRelay::new(registry.clone()));

        let (dispatcher, vapid_public_key) = if config.use_push {
            match &config.push {
                Some(push_config) => {
                    let client = WebPushClient::new(push_config.clone())?;
                    let dispatcher = Arc::new(PushDispatcher::new(
                        subscriptions.clone(),
                        Arc::new(client),
                    ));
                    info!("Push fallback dispatcher enabled");
                    (Some(dispatcher), Some(push_config.vapid_public_key.clone()))
                }
                None => {
                    warn!("use_push is set but the push configuration section is missing; offline notifications disabled");
                    (None, None)
                }
            }
        } else {
            (None, None)
        };

        let messages = MessagesState {
            repo,
            directory: Arc::new(directory),
            registry: registry.clone(),
            relay: relay.clone(),
            dispatcher,
            auth: auth.clone(),
        };

        Ok(Self {
            config,
            auth,
            registry,
            relay,
            messages,
            subscriptions,
            vapid_public_key,
        })
    }
}
