use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use threadline_persist::{NewThread, Thread, ThreadQuery, ThreadUpdate};

use crate::{
    error::{ApiError, ApiResult},
    routes::messages::{message_to_response, MessageResponse},
    state::AppState,
};

const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateThreadRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateThreadRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ThreadResponse {
    pub id: String,
    pub title: String,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ThreadWithMessagesResponse {
    pub id: String,
    pub title: String,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<MessageResponse>,
}

#[derive(Debug, Deserialize)]
pub struct ListThreadsQuery {
    /// Case-insensitive title substring
    pub q: Option<String>,
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    100
}

/// Create a new thread
#[utoipa::path(
    post,
    path = "/threads",
    request_body = CreateThreadRequest,
    responses(
        (status = 201, description = "Thread created", body = ThreadResponse),
        (status = 400, description = "Invalid request")
    ),
    tag = "threads"
)]
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateThreadRequest>,
) -> ApiResult<(StatusCode, Json<ThreadResponse>)> {
    let thread = state
        .persist
        .create_thread(NewThread {
            title: req.title,
            summary: req.summary,
        })
        .await?;

    tracing::info!(thread_id = %thread.id, "Thread created");
    Ok((StatusCode::CREATED, Json(thread_to_response(thread))))
}

/// List threads, most recently updated first
#[utoipa::path(
    get,
    path = "/threads",
    params(
        ("q" = Option<String>, Query, description = "Case-insensitive title filter"),
        ("skip" = Option<u64>, Query, description = "Threads to skip (default: 0)"),
        ("limit" = Option<u64>, Query, description = "Maximum number of threads to return (default: 100)")
    ),
    responses(
        (status = 200, description = "List of threads", body = [ThreadResponse])
    ),
    tag = "threads"
)]
pub async fn list_threads(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListThreadsQuery>,
) -> ApiResult<Json<Vec<ThreadResponse>>> {
    let mut filter = ThreadQuery::new()
        .skip(query.skip)
        .limit(query.limit.min(MAX_PAGE_SIZE));
    if let Some(q) = query.q {
        filter = filter.title_contains(q);
    }

    let threads = state.persist.list_threads(filter).await?;

    Ok(Json(threads.into_iter().map(thread_to_response).collect()))
}

/// Get a specific thread with its messages
#[utoipa::path(
    get,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Thread details", body = ThreadWithMessagesResponse),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<ThreadWithMessagesResponse>> {
    let thread = state
        .persist
        .get_thread(&thread_id)
        .await?
        .ok_or_else(|| ApiError::ThreadNotFound(thread_id.clone()))?;

    let messages = state.persist.get_messages(&thread_id).await?;

    Ok(Json(ThreadWithMessagesResponse {
        id: thread.id,
        title: thread.title,
        summary: thread.summary,
        created_at: thread.created_at,
        updated_at: thread.updated_at,
        messages: messages.into_iter().map(message_to_response).collect(),
    }))
}

/// Update title and/or summary
#[utoipa::path(
    patch,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    request_body = UpdateThreadRequest,
    responses(
        (status = 200, description = "Thread updated", body = ThreadResponse),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn update_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Json(req): Json<UpdateThreadRequest>,
) -> ApiResult<Json<ThreadResponse>> {
    let update = ThreadUpdate {
        title: req.title,
        summary: req.summary,
    };
    let thread = state.persist.update_thread(&thread_id, update).await?;

    Ok(Json(thread_to_response(thread)))
}

/// Delete a thread and all of its messages
#[utoipa::path(
    delete,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 204, description = "Thread deleted"),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.persist.delete_thread(&thread_id).await?;

    tracing::info!(thread_id = %thread_id, "Thread deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn thread_to_response(thread: Thread) -> ThreadResponse {
    ThreadResponse {
        id: thread.id,
        title: thread.title,
        summary: thread.summary,
        created_at: thread.created_at,
        updated_at: thread.updated_at,
    }
}
