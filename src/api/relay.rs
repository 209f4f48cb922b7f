//! Relay gateway endpoints
//!
//! Forwards `/chat` to the orchestrator and converts transport failures
//! into the standard error payload.

use super::rejection_response;
use super::types::{ChatRequest, ErrorResponse};
use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Shared relay state
pub struct RelayState {
    client: reqwest::Client,
    upstream_url: String,
}

impl RelayState {
    /// Create relay state for an upstream orchestrator
    pub fn new(upstream_url: &str, timeout: Duration) -> Result<Arc<Self>> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build relay HTTP client")?;
        Ok(Arc::new(Self {
            client,
            upstream_url: upstream_url.trim_end_matches('/').to_string(),
        }))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.upstream_url, path)
    }
}

fn relay_error(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse::new(message, Vec::new()))).into_response()
}

async fn relay_chat(
    Extension(state): Extension<Arc<RelayState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };

    debug!(user_id = %request.user_id, "Relaying chat request");

    let response = match state.client.post(state.url("/chat")).json(&request).send().await {
        Ok(response) => response,
        Err(e) if e.is_timeout() => {
            warn!("Orchestrator timed out: {}", e);
            return relay_error(StatusCode::GATEWAY_TIMEOUT, "Orchestrator timed out.");
        }
        Err(e) => {
            warn!("Orchestrator unreachable: {}", e);
            return relay_error(StatusCode::BAD_GATEWAY, "Orchestrator is unavailable.");
        }
    };

    let status =
        StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    match response.json::<serde_json::Value>().await {
        Ok(body) => (status, Json(body)).into_response(),
        Err(e) => {
            warn!("Invalid orchestrator response: {}", e);
            relay_error(
                StatusCode::BAD_GATEWAY,
                "Orchestrator returned an invalid response.",
            )
        }
    }
}

async fn relay_health(Extension(state): Extension<Arc<RelayState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "mode": "relay",
        "upstream": state.upstream_url,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn relay_ready(Extension(state): Extension<Arc<RelayState>>) -> Response {
    match state.client.get(state.url("/health/ready")).send().await {
        Ok(response) if response.status().is_success() => {
            (StatusCode::OK, Json(json!({ "ready": true }))).into_response()
        }
        Ok(response) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "ready": false,
                "reason": format!("upstream returned {}", response.status().as_u16()),
            })),
        )
            .into_response(),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "ready": false, "reason": "upstream unreachable" })),
        )
            .into_response(),
    }
}

/// Create relay routes
pub fn relay_routes() -> Router {
    Router::new()
        .route("/chat", post(relay_chat))
        .route("/health", get(relay_health))
        .route("/health/ready", get(relay_ready))
}
