#![allow(dead_code)]
use utoipa::OpenApi;
use crate::handlers::{SubscribeRequest, SubscriptionAck, SubscriptionKeys, VapidPublicKeyResponse};

/// Documentation for the subscribe endpoint
#[utoipa::path(
    post,
    path = "/subscribe", // Path relative to /api
    request_body(content = SubscribeRequest, example = json!({
        "endpoint": "https://push.example/send/abc",
        "keys": {"p256dh": "BP...", "auth": "dGVzdA"}
    })),
    responses(
        (status = 201, description = "Subscription saved or updated", body = SubscriptionAck),
        (status = 400, description = "Missing or blank endpoint / key material"),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Push Subscriptions"
)]
fn doc_subscribe_handler() {}

/// Documentation for the unsubscribe endpoint
#[utoipa::path(
    delete,
    path = "/subscribe/{id}",
    params(
        ("id" = i64, Path, description = "Subscription id")
    ),
    responses(
        (status = 200, description = "Subscription removed", body = SubscriptionAck),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Subscription not found or not owned by the caller"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Push Subscriptions"
)]
fn doc_unsubscribe_handler() {}

/// Documentation for the VAPID public key endpoint
#[utoipa::path(
    get,
    path = "/vapid-public-key",
    responses(
        (status = 200, description = "The public VAPID key for subscribing", body = VapidPublicKeyResponse),
        (status = 404, description = "Push notifications are not configured")
    ),
    tag = "Push Subscriptions"
)]
fn doc_vapid_public_key_handler() {}

/// OpenAPI documentation for the Push Subscriptions API
#[derive(OpenApi)]
#[openapi(
    paths(
        doc_subscribe_handler,
        doc_unsubscribe_handler,
        doc_vapid_public_key_handler
    ),
    components(
        schemas(
            SubscribeRequest,
            SubscriptionKeys,
            SubscriptionAck,
            VapidPublicKeyResponse
        )
    ),
    tags(
        (name = "Push Subscriptions", description = "Registration of Web Push subscriptions for offline notification")
    )
)]
pub struct PushApiDoc;
