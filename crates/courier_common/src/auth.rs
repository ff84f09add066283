//! Bearer-token authentication for the HTTP boundary and the realtime channel.
//!
//! The identity collaborator issues HS256 JWTs carrying the user's id and
//! username. This module verifies them: HTTP handlers receive the verified
//! identity through the [`AuthUser`] extractor, and the WebSocket handshake
//! verifies the same token before the upgrade completes. Requests without a
//! valid token are rejected before any core logic executes.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header, request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::CourierError;

/// Claims carried by an identity token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user's id
    pub id: String,
    /// The authenticated user's display name
    pub username: String,
    /// Expiration timestamp (Unix epoch seconds)
    pub exp: usize,
}

/// Encoding and decoding keys derived from the shared token secret.
#[derive(Clone)]
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl AuthKeys {
    /// Derive keys from the shared HS256 secret.
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token for the given identity.
    ///
    /// Token issuance belongs to the identity collaborator; this exists so
    /// tests and tooling can mint tokens compatible with [`verify`](Self::verify).
    pub fn issue(
        &self,
        user_id: &str,
        username: &str,
        valid_for: Duration,
    ) -> Result<String, CourierError> {
        let claims = Claims {
            id: user_id.to_string(),
            username: username.to_string(),
            exp: (Utc::now() + valid_for).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| CourierError::Internal(format!("failed to sign token: {}", e)))
    }

    /// Verify a bearer token and return the identity it carries.
    pub fn verify(&self, token: &str) -> Result<AuthUser, CourierError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| CourierError::Authentication("Invalid or expired token".to_string()))?;
        Ok(AuthUser {
            id: data.claims.id,
            username: data.claims.username,
        })
    }
}

/// The verified identity of the requesting user.
///
/// Extracting this from a request performs bearer-token verification; a
/// missing or invalid `Authorization` header rejects the request with 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<AuthKeys>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = CourierError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = Arc::<AuthKeys>::from_ref(state);
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| CourierError::Authentication("No token provided".to_string()))?;
        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| CourierError::Authentication("No token provided".to_string()))?;
        keys.verify(token)
    }
}
