use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use utoipa::ToSchema;

use threadline_persist::Message;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: String,
    pub thread_id: String,
    pub role: String,
    pub content: String,
    pub tokens: Option<u32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    pub limit: Option<usize>,
}

/// List messages in a thread, oldest first
#[utoipa::path(
    get,
    path = "/threads/{thread_id}/messages",
    params(
        ("thread_id" = String, Path, description = "Thread ID"),
        ("limit" = Option<usize>, Query, description = "Maximum number of messages (default: all)")
    ),
    responses(
        (status = 200, description = "List of messages", body = [MessageResponse]),
        (status = 404, description = "Thread not found")
    ),
    tag = "messages"
)]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Query(query): Query<ListMessagesQuery>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    if state.persist.get_thread(&thread_id).await?.is_none() {
        return Err(ApiError::ThreadNotFound(thread_id));
    }

    let messages = state.persist.get_messages(&thread_id).await?;
    let limit = query.limit.unwrap_or(usize::MAX);

    Ok(Json(
        messages
            .into_iter()
            .take(limit)
            .map(message_to_response)
            .collect(),
    ))
}

/// Send a message and stream the assistant's reply as plain text
///
/// The status is committed once streaming starts; a failure after that point
/// arrives as a final in-band error line instead of an HTTP error.
#[utoipa::path(
    post,
    path = "/threads/{thread_id}/messages",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Streaming reply", content_type = "text/plain"),
        (status = 400, description = "Empty message"),
        (status = 404, description = "Thread not found")
    ),
    tag = "messages"
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Response> {
    if req.content.trim().is_empty() {
        return Err(ApiError::BadRequest("Message content must not be empty".to_string()));
    }

    // User message is committed before the response starts
    let turn = state.pipeline.begin_turn(&thread_id, &req.content).await?;

    // Dropping the body (client disconnect) drops the receiver and cancels the turn
    let (rx, _handle) = state.pipeline.spawn_turn(turn);
    let body = Body::from_stream(ReceiverStream::new(rx).map(Ok::<_, Infallible>));

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response())
}

pub(crate) fn message_to_response(message: Message) -> MessageResponse {
    MessageResponse {
        id: message.id,
        thread_id: message.thread_id,
        role: message.role.as_str().to_string(),
        content: message.content,
        tokens: message.tokens,
        created_at: message.created_at,
    }
}
