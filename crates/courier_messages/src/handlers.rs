//! HTTP handlers for the message routes
//!
//! Thin translation layer: extract the authenticated user, delegate to
//! the logic module, and map `MessageError` variants onto status codes.

use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;

use courier_common::auth::{AuthKeys, AuthUser};
use courier_common::models::MessageRecord;
use courier_common::services::{BoxedError, UserDirectory};
use courier_db::SqlMessageRepository;
use courier_push::PushDispatcher;
use courier_realtime::{PresenceRegistry, RealtimeRelay};

use crate::logic::{self, MessageError};
use crate::models::{ConversationSummary, MarkReadResponse, SendMessageRequest, WithQuery};

/// Shared state for the message handlers
///
/// Cloning is cheap: every field is reference-counted or a pooled handle.
#[derive(Clone)]
pub struct MessagesState {
    /// The message store
    pub repo: SqlMessageRepository,

    /// Read-only view of the identity collaborator's users
    pub directory: Arc<dyn UserDirectory<Error = BoxedError>>,

    /// The process-wide presence registry
    pub registry: Arc<PresenceRegistry>,

    /// The relay fanning events out to live connections
    pub relay: Arc<RealtimeRelay>,

    /// Fallback dispatcher, present when push is configured
    pub dispatcher: Option<Arc<PushDispatcher>>,

    /// Keys for verifying bearer tokens
    pub auth: Arc<AuthKeys>,
}

impl FromRef<MessagesState> for Arc<AuthKeys> {
    fn from_ref(state: &MessagesState) -> Self {
        state.auth.clone()
    }
}

fn error_response(err: MessageError) -> (StatusCode, String) {
    let status = match err {
        MessageError::MissingFields | MessageError::MissingCounterpart => StatusCode::BAD_REQUEST,
        MessageError::RecipientNotFound => StatusCode::NOT_FOUND,
        MessageError::Database(_) | MessageError::Directory(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

/// Handler for `GET /conversations`.
///
/// The authenticated user's conversation list, newest first.
#[axum::debug_handler]
pub async fn conversations_handler(
    State(state): State<MessagesState>,
    user: AuthUser,
) -> Result<Json<Vec<ConversationSummary>>, (StatusCode, String)> {
    logic::summarize(&state.repo, state.directory.as_ref(), &user)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Handler for `GET /messages?with=...`.
///
/// Conversation history with the named user in reading order, or the
/// caller's whole history when `with` is omitted.
#[axum::debug_handler]
pub async fn list_messages_handler(
    State(state): State<MessagesState>,
    user: AuthUser,
    Query(query): Query<WithQuery>,
) -> Result<Json<Vec<MessageRecord>>, (StatusCode, String)> {
    logic::list_messages(
        &state.repo,
        state.directory.as_ref(),
        &user,
        query.with.as_deref(),
    )
    .await
    .map(Json)
    .map_err(error_response)
}

/// Handler for `POST /messages`.
///
/// Stores the message and returns it with 201. Live delivery and push
/// fallback happen after the store and never affect the response.
#[axum::debug_handler]
pub async fn send_message_handler(
    State(state): State<MessagesState>,
    user: AuthUser,
    Json(payload): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageRecord>), (StatusCode, String)> {
    logic::send_message(
        &state.repo,
        state.directory.as_ref(),
        &state.registry,
        &state.relay,
        state.dispatcher.as_ref(),
        &user,
        payload.recipient.as_deref(),
        payload.content.as_deref(),
    )
    .await
    .map(|record| (StatusCode::CREATED, Json(record)))
    .map_err(error_response)
}

/// Handler for `PUT /messages/read?with=...`.
///
/// Marks everything from the named user to the caller as read.
#[axum::debug_handler]
pub async fn mark_read_handler(
    State(state): State<MessagesState>,
    user: AuthUser,
    Query(query): Query<WithQuery>,
) -> Result<Json<MarkReadResponse>, (StatusCode, String)> {
    logic::mark_read(&state.repo, &state.relay, &user, query.with.as_deref())
        .await
        .map(|updated| Json(MarkReadResponse { updated }))
        .map_err(error_response)
}
