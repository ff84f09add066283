use axum::{
    routing::{get, put},
    Router,
};
use tracing::info;

use crate::handlers::{
    conversations_handler, list_messages_handler, mark_read_handler, send_message_handler,
    MessagesState,
};

/// Create the message routes for the API.
///
/// The state carries the store plus every collaborator the send path fans
/// out to; the backend constructs it once and shares the registry/relay
/// with the realtime routes.
pub fn routes(state: MessagesState) -> Router {
    info!("Message routes initialized");

    Router::new()
        .route("/conversations", get(conversations_handler))
        .route(
            "/messages",
            get(list_messages_handler).post(send_message_handler),
        )
        .route("/messages/read", put(mark_read_handler))
        .with_state(state)
}
