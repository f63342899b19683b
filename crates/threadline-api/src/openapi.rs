use axum::Json;
use utoipa::OpenApi;

use crate::routes::{health, messages, summarize, threads};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::root,
        health::health_check,
        threads::create_thread,
        threads::list_threads,
        threads::get_thread,
        threads::update_thread,
        threads::delete_thread,
        messages::list_messages,
        messages::send_message,
        summarize::summarize_thread,
    ),
    components(schemas(
        health::StatusResponse,
        health::HealthResponse,
        threads::CreateThreadRequest,
        threads::UpdateThreadRequest,
        threads::ThreadResponse,
        threads::ThreadWithMessagesResponse,
        messages::MessageResponse,
        messages::SendMessageRequest,
        summarize::SummarizeResponse,
    )),
    tags(
        (name = "health", description = "Liveness and health"),
        (name = "threads", description = "Thread management"),
        (name = "messages", description = "Messages and streamed replies")
    ),
    info(title = "Threadline API")
)]
pub struct ApiDoc;

/// OpenAPI document for the whole HTTP surface
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
