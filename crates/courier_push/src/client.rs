//! Web Push delivery client
//!
//! Delivers notification payloads to push service endpoints using VAPID
//! authentication: each request carries an ES256-signed JWT scoped to the
//! endpoint's origin, alongside the server's public key. Delivery is a
//! single POST per attempt; callers own the best-effort semantics (no
//! retry, no backoff).

use courier_common::models::{NotificationPayload, PushSubscription};
use courier_common::services::{BoxFuture, BoxedError, PushTransport};
use courier_config::PushConfig;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{header, Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when delivering a push notification
#[derive(Error, Debug)]
pub enum PushError {
    /// Error during HTTP request to the push service
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Missing or invalid configuration
    #[error("Missing configuration: {0}")]
    ConfigError(String),

    /// Error signing the VAPID authorization token
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// The subscription endpoint could not be parsed
    #[error("Invalid endpoint: {0}")]
    EndpointError(String),

    /// The push service rejected the delivery
    #[error("Push service error: {0}")]
    ServiceError(String),
}

/// Claims of the VAPID authorization token, scoped to one push service
/// origin.
#[derive(Debug, Serialize, Deserialize)]
struct VapidClaims {
    /// The push service origin this token is valid for
    aud: String,
    /// Expiration timestamp (Unix epoch seconds, at most 24h out)
    exp: usize,
    /// Contact address for the sending server
    sub: String,
}

/// Client for delivering Web Push notifications
pub struct WebPushClient {
    /// HTTP client for requests to push service endpoints
    client: Client,

    /// VAPID configuration: subject, key material, delivery TTL
    config: PushConfig,

    /// Signing key parsed once from the configured PEM
    signing_key: EncodingKey,
}

impl WebPushClient {
    /// Create a new Web Push client from the push configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configured private key PEM cannot be
    /// parsed as an EC P-256 key.
    pub fn new(config: PushConfig) -> Result<Self, PushError> {
        let signing_key = EncodingKey::from_ec_pem(config.vapid_private_key_pem.as_bytes())
            .map_err(|e| PushError::ConfigError(format!("invalid VAPID private key: {}", e)))?;

        Ok(Self {
            client: Client::new(),
            config,
            signing_key,
        })
    }

    /// Build the `Authorization: vapid t=..., k=...` header value for an
    /// endpoint.
    fn vapid_authorization(&self, endpoint: &Url) -> Result<String, PushError> {
        let audience = endpoint.origin().ascii_serialization();
        let claims = VapidClaims {
            aud: audience,
            exp: (chrono::Utc::now() + chrono::Duration::hours(12)).timestamp() as usize,
            sub: self.config.vapid_subject.clone(),
        };

        let token = encode(&Header::new(Algorithm::ES256), &claims, &self.signing_key)
            .map_err(|e| PushError::AuthError(e.to_string()))?;

        Ok(format!(
            "vapid t={}, k={}",
            token, self.config.vapid_public_key
        ))
    }

    /// Deliver one payload to one subscription, exactly once.
    pub async fn send_notification(
        &self,
        subscription: &PushSubscription,
        payload: &NotificationPayload,
    ) -> Result<(), PushError> {
        let endpoint = Url::parse(&subscription.endpoint)
            .map_err(|e| PushError::EndpointError(e.to_string()))?;
        let authorization = self.vapid_authorization(&endpoint)?;

        debug!(endpoint = %subscription.endpoint, "delivering push notification");

        let response = self
            .client
            .post(endpoint)
            .header(header::AUTHORIZATION, authorization)
            .header("TTL", self.config.ttl_seconds)
            .json(payload)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(PushError::ServiceError(format!(
                "endpoint returned {}",
                response.status()
            )))
        }
    }
}

impl PushTransport for WebPushClient {
    type Error = BoxedError;

    fn deliver<'a>(
        &'a self,
        subscription: &'a PushSubscription,
        payload: &'a NotificationPayload,
    ) -> BoxFuture<'a, (), BoxedError> {
        Box::pin(async move {
            self.send_notification(subscription, payload)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }
}
