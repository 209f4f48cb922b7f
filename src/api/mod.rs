//! Web API module for Relaymesh
//!
//! Provides REST endpoints for:
//! - Task execution (`POST /chat`)
//! - Knowledge search and strategy synthesis (`POST /search`, `POST /analyze`)
//! - Health and readiness
//! - OpenAPI document
//! - Relay forwarding

pub mod chat;
pub mod docs;
pub mod health;
pub mod knowledge;
pub mod relay;
pub mod types;


use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::{Extension, Router};
use relaymesh_core::{EngineContext, FailureClass};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;
use types::ErrorResponse;

pub use chat::chat_routes;
pub use docs::docs_routes;
pub use health::health_routes;
pub use knowledge::knowledge_routes;
pub use relay::{relay_routes, RelayState};

/// Shared orchestrator state
pub struct AppState {
    pub engine: Arc<EngineContext>,
    pub request_timeout: Duration,
    /// Cancelled on shutdown; each request runs under a child token
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        engine: Arc<EngineContext>,
        request_timeout: Duration,
        shutdown: CancellationToken,
    ) -> Arc<Self> {
        Arc::new(Self {
            engine,
            request_timeout,
            shutdown,
        })
    }
}

/// Create the orchestrator router with all endpoints
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(chat_routes())
        .merge(knowledge_routes())
        .merge(docs_routes())
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Create the relay router
pub fn relay_router(state: Arc<RelayState>) -> Router {
    Router::new()
        .merge(relay_routes())
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Turn a body extraction failure into the standard error payload, keeping
/// the rejection's status code.
pub(crate) fn rejection_response(rejection: JsonRejection) -> Response {
    let status = rejection.status();
    let detail = rejection.body_text();
    debug!(status = status.as_u16(), error = %detail, "Rejected request body");
    error_response(status, format!("Invalid request body: {detail}"))
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message, Vec::new()))).into_response()
}

/// Status code for a failed run or analysis
pub(crate) fn failure_status(class: FailureClass) -> StatusCode {
    match class {
        FailureClass::ServiceUnavailable | FailureClass::Cancelled => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        FailureClass::UpstreamFailure => StatusCode::BAD_GATEWAY,
        FailureClass::Timeout => StatusCode::GATEWAY_TIMEOUT,
    }
}
