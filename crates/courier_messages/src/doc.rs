#![allow(dead_code)]
use utoipa::OpenApi;
use crate::models::{ConversationSummary, MarkReadResponse, SendMessageRequest, WithQuery};

/// Documentation for the conversations endpoint
#[utoipa::path(
    get,
    path = "/conversations", // Path relative to /api
    responses(
        (status = 200, description = "Conversation summaries, newest first", body = [ConversationSummary]),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Messages"
)]
fn doc_conversations_handler() {}

/// Documentation for the message history endpoint
#[utoipa::path(
    get,
    path = "/messages",
    params(WithQuery),
    responses(
        (status = 200, description = "Messages in ascending creation order"),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Messages"
)]
fn doc_list_messages_handler() {}

/// Documentation for the send endpoint
#[utoipa::path(
    post,
    path = "/messages",
    request_body(content = SendMessageRequest, example = json!({
        "recipient": "u2",
        "content": "hello"
    })),
    responses(
        (status = 201, description = "Message stored; returned with populated participants"),
        (status = 400, description = "Recipient or content missing/blank"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Recipient not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Messages"
)]
fn doc_send_message_handler() {}

/// Documentation for the mark-read endpoint
#[utoipa::path(
    put,
    path = "/messages/read",
    params(WithQuery),
    responses(
        (status = 200, description = "Count of messages flipped to read", body = MarkReadResponse),
        (status = 400, description = "Missing `with` query parameter"),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Messages"
)]
fn doc_mark_read_handler() {}

/// OpenAPI documentation for the Messages API
#[derive(OpenApi)]
#[openapi(
    paths(
        doc_conversations_handler,
        doc_list_messages_handler,
        doc_send_message_handler,
        doc_mark_read_handler
    ),
    components(
        schemas(
            ConversationSummary,
            SendMessageRequest,
            MarkReadResponse
        )
    ),
    tags(
        (name = "Messages", description = "Direct messages, conversation summaries, and read receipts")
    )
)]
pub struct MessagesApiDoc;
