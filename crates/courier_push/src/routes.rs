use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use courier_common::auth::AuthKeys;
use courier_db::SqlPushSubscriptionRepository;

use crate::handlers::{
    subscribe_handler, unsubscribe_handler, vapid_public_key_handler, PushState,
};

/// Create the push subscription routes for the API.
///
/// # Arguments
///
/// * `subscriptions` - The subscription store
/// * `auth` - Keys for verifying bearer tokens
/// * `vapid_public_key` - The public key handed to subscribing clients,
///   when push is configured
pub fn routes(
    subscriptions: SqlPushSubscriptionRepository,
    auth: Arc<AuthKeys>,
    vapid_public_key: Option<String>,
) -> Router {
    info!("Push subscription routes initialized");

    let state = PushState {
        subscriptions,
        auth,
        vapid_public_key,
    };

    Router::new()
        .route("/subscribe", post(subscribe_handler))
        .route("/subscribe/{id}", delete(unsubscribe_handler))
        .route("/vapid-public-key", get(vapid_public_key_handler))
        .with_state(state)
}
