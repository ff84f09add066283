//! HTTP handlers for push subscription management
//!
//! Clients register a Web Push subscription to receive offline
//! notifications, and delete it when they opt out. The public VAPID key
//! endpoint exists because browsers need it to create the subscription in
//! the first place.

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use courier_common::auth::{AuthKeys, AuthUser};
use courier_common::error::CourierError;
use courier_common::models::PushSubscription;
use courier_db::repositories::PushSubscriptionRepository;
use courier_db::SqlPushSubscriptionRepository;

/// Shared state for push subscription handlers
#[derive(Clone)]
pub struct PushState {
    /// The subscription store
    pub subscriptions: SqlPushSubscriptionRepository,

    /// Keys for verifying bearer tokens
    pub auth: Arc<AuthKeys>,

    /// The public VAPID key handed to subscribing clients, when push is
    /// configured
    pub vapid_public_key: Option<String>,
}

impl FromRef<PushState> for Arc<AuthKeys> {
    fn from_ref(state: &PushState) -> Self {
        state.auth.clone()
    }
}

/// Key material presented by the subscribing client
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubscriptionKeys {
    pub p256dh: Option<String>,
    pub auth: Option<String>,
}

/// Request body for saving a push subscription
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubscribeRequest {
    /// The push service delivery endpoint
    pub endpoint: Option<String>,

    /// The client's cryptographic key material
    pub keys: Option<SubscriptionKeys>,
}

/// Acknowledgement body for subscription changes
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubscriptionAck {
    pub message: String,
}

/// Response body for the VAPID public key endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VapidPublicKeyResponse {
    pub public_key: String,
}

/// Handler for `POST /subscribe`.
///
/// Saves or updates a Web Push subscription for the authenticated user.
/// Re-subscribing with an endpoint that already exists for the user
/// updates the key material in place.
#[axum::debug_handler]
pub async fn subscribe_handler(
    State(state): State<PushState>,
    user: AuthUser,
    Json(payload): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<SubscriptionAck>), CourierError> {
    let endpoint = payload
        .endpoint
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| CourierError::Validation("Invalid subscription data".to_string()))?;
    let keys = payload
        .keys
        .ok_or_else(|| CourierError::Validation("Invalid subscription data".to_string()))?;
    let (p256dh, auth) = match (keys.p256dh, keys.auth) {
        (Some(p256dh), Some(auth)) => (p256dh, auth),
        _ => return Err(CourierError::Validation("Invalid subscription data".to_string())),
    };

    debug!(user_id = %user.id, "saving push subscription");

    state
        .subscriptions
        .upsert(PushSubscription {
            id: None,
            user_id: user.id,
            endpoint: endpoint.to_string(),
            p256dh,
            auth,
            created_at: None,
        })
        .await
        .map_err(|e| CourierError::Database(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionAck {
            message: "Subscription saved".to_string(),
        }),
    ))
}

/// Handler for `DELETE /subscribe/{id}`.
///
/// Removes a subscription, but only for its owner; a missing or
/// foreign-owned id is reported as not found.
#[axum::debug_handler]
pub async fn unsubscribe_handler(
    State(state): State<PushState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<SubscriptionAck>, CourierError> {
    let deleted = state
        .subscriptions
        .delete_owned(id, &user.id)
        .await
        .map_err(|e| CourierError::Database(e.to_string()))?;

    if !deleted {
        return Err(CourierError::NotFound("Subscription not found".to_string()));
    }

    info!(user_id = %user.id, subscription_id = id, "push subscription removed");
    Ok(Json(SubscriptionAck {
        message: "Subscription removed".to_string(),
    }))
}

/// Handler for `GET /vapid-public-key`.
///
/// Provides the public VAPID key clients need to create a subscription.
#[axum::debug_handler]
pub async fn vapid_public_key_handler(
    State(state): State<PushState>,
) -> Result<Json<VapidPublicKeyResponse>, CourierError> {
    let public_key = state
        .vapid_public_key
        .clone()
        .ok_or_else(|| CourierError::NotFound("Push notifications are not configured".to_string()))?;

    Ok(Json(VapidPublicKeyResponse { public_key }))
}
