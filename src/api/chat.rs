//! `POST /chat`
//!
//! Runs one task through the orchestration graph. The run is bounded by the
//! request timeout and cancelled on shutdown or when the client disconnects
//! (the handler future is dropped).

use super::types::{ChatMetadata, ChatRequest, ChatResponse, ErrorResponse, ENGINE_NAME, STATUS_SUCCESS};
use super::{failure_status, rejection_response, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use tracing::{info, warn};

/// Run a task through the mesh
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Task executed", body = ChatResponse),
        (status = 400, description = "Empty task or malformed body", body = ErrorResponse),
        (status = 415, description = "Body is not JSON", body = ErrorResponse),
        (status = 422, description = "Body does not match the schema", body = ErrorResponse),
        (status = 502, description = "Provider failure", body = ErrorResponse),
        (status = 503, description = "No executor available", body = ErrorResponse),
        (status = 504, description = "Timed out", body = ErrorResponse)
    )
)]
pub async fn chat(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };

    if request.task.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Task must not be empty.", Vec::new());
    }

    if let Some(preferred) = &request.preferred_agent {
        info!(preferred_agent = %preferred, "preferred_agent is ignored; routing by capability");
    }

    let cancel = state.shutdown.child_token();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let run = state.engine.run(&request.task, &request.user_id, &cancel);
    let result = match tokio::time::timeout(state.request_timeout, run).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                timeout_secs = state.request_timeout.as_secs(),
                user_id = %request.user_id,
                "Request timed out"
            );
            return error_response(
                StatusCode::GATEWAY_TIMEOUT,
                "Request timed out.",
                Vec::new(),
            );
        }
    };

    match result {
        Ok(success) => {
            let metadata = ChatMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                engine: ENGINE_NAME.to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                executor: success.state.selected_executor_id.clone(),
                cache_hit: success.cache_hit,
                duration_ms: u64::try_from(success.duration.as_millis()).unwrap_or(u64::MAX),
            };
            let agent_chain = success.state.history().to_vec();
            Json(ChatResponse {
                status: STATUS_SUCCESS.to_string(),
                final_output: success.state.final_output,
                agent_chain,
                metadata,
            })
            .into_response()
        }
        Err(failure) => {
            error_response(
                failure_status(failure.error.failure_class()),
                failure.error.public_message(),
                failure.state.history().to_vec(),
            )
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>, chain: Vec<String>) -> Response {
    (status, Json(ErrorResponse::new(message, chain))).into_response()
}

/// Create chat routes
pub fn chat_routes() -> Router {
    Router::new().route("/chat", post(chat))
}
