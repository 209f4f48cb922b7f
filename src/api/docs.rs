//! API Documentation
//!
//! Serves the OpenAPI document at `/api/openapi.json`

use axum::response::Json;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

use super::types::{
    AnalyzeRequest, AnalyzeResponse, ChatMetadata, ChatRequest, ChatResponse, ErrorResponse,
    HealthResponse, IngestRequest, IngestResponse, ReadyResponse, ResearchFinding, SearchHit,
    SearchRequest, SearchResponse,
};

/// Relaymesh OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Relaymesh API",
        version = "0.1.0",
        description = "Capability-routed executor mesh.

## Overview
- **Chat**: route a task to one executor and return its output with the agent chain
- **Knowledge**: embedding search over stored documents and strategy synthesis from findings
- **Health**: liveness and readiness for deployment orchestration
",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        crate::api::chat::chat,
        crate::api::knowledge::search,
        crate::api::knowledge::ingest,
        crate::api::knowledge::analyze,
        crate::api::health::health_check,
        crate::api::health::readiness_check,
    ),
    components(
        schemas(
            ChatRequest,
            ChatResponse,
            ChatMetadata,
            ErrorResponse,
            HealthResponse,
            ReadyResponse,
            SearchRequest,
            SearchResponse,
            SearchHit,
            IngestRequest,
            IngestResponse,
            ResearchFinding,
            AnalyzeRequest,
            AnalyzeResponse,
        )
    ),
    tags(
        (name = "chat", description = "Task execution"),
        (name = "knowledge", description = "Knowledge search and strategy synthesis"),
        (name = "health", description = "Liveness and readiness"),
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Create documentation routes
pub fn docs_routes() -> Router {
    Router::new().route("/api/openapi.json", get(openapi_json))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/chat"));
        assert!(doc.paths.paths.contains_key("/health"));
        assert!(doc.paths.paths.contains_key("/health/ready"));
        assert!(doc.paths.paths.contains_key("/search"));
        assert!(doc.paths.paths.contains_key("/analyze"));
        assert!(doc.paths.paths.contains_key("/knowledge"));
    }
}
