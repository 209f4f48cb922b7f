//! Health check endpoints
//!
//! Provides:
//! - `/health`: liveness plus registry summary (always 200)
//! - `/health/ready`: 200 only when at least one executor is loaded

use super::types::{HealthResponse, ReadyResponse};
use super::AppState;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use relaymesh_core::BrainState;
use std::sync::Arc;

fn brain_label(brain: BrainState) -> &'static str {
    match brain {
        BrainState::Active => "active",
        BrainState::Initializing => "initializing",
        BrainState::Unavailable => "unavailable",
    }
}

/// Liveness and registry summary
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Process is alive", body = HealthResponse))
)]
pub async fn health_check(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    let health = state.engine.health();
    Json(HealthResponse {
        status: "healthy".to_string(),
        brain: brain_label(health.brain).to_string(),
        executor_count: health.executors.len(),
        agents_loaded: health.executors,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness for deployment orchestration
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Ready", body = ReadyResponse),
        (status = 503, description = "No executors loaded", body = ReadyResponse)
    )
)]
pub async fn readiness_check(
    Extension(state): Extension<Arc<AppState>>,
) -> (StatusCode, Json<ReadyResponse>) {
    let brain = state.engine.health().brain;
    match not_ready_reason(brain) {
        None => (
            StatusCode::OK,
            Json(ReadyResponse {
                ready: true,
                reason: None,
            }),
        ),
        Some(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                ready: false,
                reason: Some(reason.to_string()),
            }),
        ),
    }
}

/// Client-facing reason; load errors stay in the logs
fn not_ready_reason(brain: BrainState) -> Option<&'static str> {
    match brain {
        BrainState::Active => None,
        BrainState::Initializing => Some("no executors loaded"),
        BrainState::Unavailable => Some("executor registry unavailable"),
    }
}

/// Create health routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brain_labels() {
        assert_eq!(brain_label(BrainState::Active), "active");
        assert_eq!(brain_label(BrainState::Initializing), "initializing");
        assert_eq!(brain_label(BrainState::Unavailable), "unavailable");
    }

    #[test]
    fn test_not_ready_reasons_are_fixed() {
        assert_eq!(not_ready_reason(BrainState::Active), None);
        assert_eq!(
            not_ready_reason(BrainState::Initializing),
            Some("no executors loaded")
        );
        assert_eq!(
            not_ready_reason(BrainState::Unavailable),
            Some("executor registry unavailable")
        );
    }

    #[test]
    fn test_health_response_serialization() {
        let resp = HealthResponse {
            status: "healthy".to_string(),
            brain: "active".to_string(),
            agents_loaded: vec!["researcher".to_string()],
            executor_count: 1,
            version: "0.1.0".to_string(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["brain"], "active");
        assert_eq!(json["agents_loaded"][0], "researcher");
    }
}
