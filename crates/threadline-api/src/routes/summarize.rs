use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummarizeResponse {
    pub status: String,
    pub thread_id: String,
}

/// Request an out-of-band summary regeneration
#[utoipa::path(
    post,
    path = "/threads/{thread_id}/summarize",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 202, description = "Summarization accepted", body = SummarizeResponse),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn summarize_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<(StatusCode, Json<SummarizeResponse>)> {
    if state.persist.get_thread(&thread_id).await?.is_none() {
        return Err(ApiError::ThreadNotFound(thread_id));
    }

    state.summarizer.submit(&thread_id).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SummarizeResponse {
            status: "accepted".to_string(),
            thread_id,
        }),
    ))
}
