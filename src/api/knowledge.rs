//! Knowledge endpoints
//!
//! - `POST /search`: closest knowledge documents for a query
//! - `POST /knowledge`: add a document
//! - `POST /analyze`: synthesize a strategy from research findings on the
//!   default executor

use super::types::{
    AnalyzeRequest, AnalyzeResponse, ErrorResponse, IngestRequest, IngestResponse, SearchHit,
    SearchRequest, SearchResponse,
};
use super::{error_response, failure_status, rejection_response, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use relaymesh_cache::KnowledgeBase;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Upper bound on `limit` for one search
pub const MAX_SEARCH_LIMIT: usize = 50;

fn knowledge_base(state: &AppState) -> Result<&Arc<KnowledgeBase>, Response> {
    state.engine.knowledge().ok_or_else(|| {
        error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Knowledge search is not enabled.",
        )
    })
}

/// Search the knowledge base
#[utoipa::path(
    post,
    path = "/search",
    tag = "knowledge",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Matches ordered by score", body = SearchResponse),
        (status = 400, description = "Empty query or malformed body", body = ErrorResponse),
        (status = 500, description = "Search failed", body = ErrorResponse),
        (status = 503, description = "Knowledge search disabled", body = ErrorResponse)
    )
)]
pub async fn search(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    let knowledge = match knowledge_base(&state) {
        Ok(knowledge) => knowledge,
        Err(response) => return response,
    };
    if request.query.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Query must not be empty.");
    }

    let limit = request.limit.min(MAX_SEARCH_LIMIT);
    match knowledge.search(&request.query, limit).await {
        Ok(results) => Json(SearchResponse {
            results: results.into_iter().map(SearchHit::from).collect(),
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "Knowledge search failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Search engine failure.")
        }
    }
}

/// Add a document to the knowledge base
#[utoipa::path(
    post,
    path = "/knowledge",
    tag = "knowledge",
    request_body = IngestRequest,
    responses(
        (status = 201, description = "Document stored", body = IngestResponse),
        (status = 400, description = "Empty content or malformed body", body = ErrorResponse),
        (status = 500, description = "Store failed", body = ErrorResponse),
        (status = 503, description = "Knowledge search disabled", body = ErrorResponse)
    )
)]
pub async fn ingest(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    let knowledge = match knowledge_base(&state) {
        Ok(knowledge) => knowledge,
        Err(response) => return response,
    };

    match knowledge
        .add(&request.content, request.source.as_deref())
        .await
    {
        Ok(id) => (
            StatusCode::CREATED,
            Json(IngestResponse { id: id.to_string() }),
        )
            .into_response(),
        Err(relaymesh_cache::Error::InvalidInput(_)) => {
            error_response(StatusCode::BAD_REQUEST, "Content must not be empty.")
        }
        Err(e) => {
            error!(error = %e, "Failed to store knowledge document");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to store the document.",
            )
        }
    }
}

/// Synthesize a strategy from research findings
#[utoipa::path(
    post,
    path = "/analyze",
    tag = "knowledge",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Strategy produced", body = AnalyzeResponse),
        (status = 400, description = "Empty task or malformed body", body = ErrorResponse),
        (status = 502, description = "Provider failure", body = ErrorResponse),
        (status = 503, description = "No default executor", body = ErrorResponse),
        (status = 504, description = "Timed out", body = ErrorResponse)
    )
)]
pub async fn analyze(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    if request.original_task.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Task must not be empty.");
    }

    let task_preview: String = request.original_task.chars().take(50).collect();
    info!(task = %task_preview, findings = request.research_data.len(), "Analyzing research");

    let findings: Vec<String> = request
        .research_data
        .into_iter()
        .map(|finding| finding.content)
        .collect();

    let cancel = state.shutdown.child_token();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let analysis = state
        .engine
        .analyze(&request.original_task, &findings, &cancel);
    match tokio::time::timeout(state.request_timeout, analysis).await {
        Ok(Ok(analysis)) => Json(AnalyzeResponse {
            strategy: analysis.strategy,
            executor: analysis.executor_id,
        })
        .into_response(),
        Ok(Err(e)) => {
            warn!(error = %e, "Analysis failed");
            error_response(failure_status(e.failure_class()), e.public_message())
        }
        Err(_) => {
            warn!(
                timeout_secs = state.request_timeout.as_secs(),
                "Analysis timed out"
            );
            error_response(StatusCode::GATEWAY_TIMEOUT, "Request timed out.")
        }
    }
}

/// Create knowledge routes
pub fn knowledge_routes() -> Router {
    Router::new()
        .route("/search", post(search))
        .route("/knowledge", post(ingest))
        .route("/analyze", post(analyze))
}
