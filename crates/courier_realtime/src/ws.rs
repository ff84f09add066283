//! The realtime WebSocket endpoint
//!
//! Connections authenticate during the handshake: the identity token is
//! presented as a query parameter and verified before the upgrade
//! completes. An authenticated socket is registered in the presence
//! registry and its task then pumps two directions until close: draining
//! the connection's mailbox out to the socket, and reading client events
//! (typing signals) off it.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use courier_common::auth::{AuthKeys, AuthUser};
use courier_common::error::CourierError;

use crate::events::ClientEvent;
use crate::registry::{ConnectionHandle, PresenceRegistry};
use crate::relay::RealtimeRelay;

/// Shared state for the realtime endpoint
#[derive(Clone)]
pub struct RealtimeState {
    /// The process-wide presence registry
    pub registry: Arc<PresenceRegistry>,

    /// The relay used to forward typing signals
    pub relay: Arc<RealtimeRelay>,

    /// Keys for verifying the handshake token
    pub auth: Arc<AuthKeys>,
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Identity token presented in the handshake
    pub token: Option<String>,
}

/// Upgrade handler for `GET /ws?token=...`.
///
/// Verification happens before the upgrade: a missing or invalid token is
/// rejected with 401 and no connection is established.
pub async fn ws_handler(
    State(state): State<RealtimeState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let verified = query
        .token
        .as_deref()
        .ok_or_else(|| CourierError::Authentication("No token provided".to_string()))
        .and_then(|token| state.auth.verify(token));
    let user = match verified {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, user))
}

async fn handle_socket(socket: WebSocket, state: RealtimeState, user: AuthUser) {
    let (handle, mut outbox) = ConnectionHandle::new();
    let connection_id = handle.connection_id();
    state.registry.register(&user.id, handle).await;
    info!(user_id = %user.id, "realtime connection established");

    let (mut ws_sender, mut ws_receiver) = socket.split();

    loop {
        tokio::select! {
            outgoing = outbox.recv() => {
                let Some(event) = outgoing else { break };
                match serde_json::to_string(&event) {
                    Ok(text) => {
                        if ws_sender.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!(user_id = %user.id, "failed to encode event: {}", err),
                }
            }
            incoming = ws_receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(ClientEvent::Typing { to }) => {
                                state.relay.forward_typing(&to, &user.id).await;
                            }
                            Err(err) => {
                                debug!(user_id = %user.id, "ignoring malformed client event: {}", err);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // ping/pong and binary frames are ignored
                    Some(Err(err)) => {
                        debug!(user_id = %user.id, "socket error: {}", err);
                        break;
                    }
                }
            }
        }
    }

    // A stale disconnect (this connection was already replaced) leaves the
    // newer registration untouched.
    state.registry.unregister(&user.id, connection_id).await;
    info!(user_id = %user.id, "realtime connection closed");
}
