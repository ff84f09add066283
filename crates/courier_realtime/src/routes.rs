use axum::{routing::get, Router};
use std::sync::Arc;

use courier_common::auth::AuthKeys;

use crate::registry::PresenceRegistry;
use crate::relay::RealtimeRelay;
use crate::ws::{ws_handler, RealtimeState};

/// Create the realtime route for the API.
///
/// The registry and relay are constructed by the backend and shared with
/// the message routes, which consult the same presence state on send and
/// read-mark.
pub fn routes(
    registry: Arc<PresenceRegistry>,
    relay: Arc<RealtimeRelay>,
    auth: Arc<AuthKeys>,
) -> Router {
    let state = RealtimeState {
        registry,
        relay,
        auth,
    };

    Router::new().route("/ws", get(ws_handler)).with_state(state)
}
