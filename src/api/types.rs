//! Request and response bodies shared by the orchestrator and the relay

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status value of a successful response
pub const STATUS_SUCCESS: &str = "success";

/// Status value of a failed response
pub const STATUS_ERROR: &str = "error";

/// Engine name reported in response metadata
pub const ENGINE_NAME: &str = "relaymesh";

/// Chat request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// Task text
    pub task: String,
    /// Requesting user
    pub user_id: String,
    /// Accepted for compatibility; routing always uses capabilities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_agent: Option<String>,
}

/// Metadata attached to a successful response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMetadata {
    /// Relaymesh version
    pub version: String,
    /// Engine name
    pub engine: String,
    /// Response time (RFC 3339)
    pub timestamp: String,
    /// Executor that produced the output
    pub executor: String,
    /// Output came from the semantic cache
    pub cache_hit: bool,
    /// Run duration in milliseconds
    pub duration_ms: u64,
}

/// Successful chat response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    /// Always `success`
    pub status: String,
    /// Executor output
    pub final_output: String,
    /// Routing and execution events in order
    pub agent_chain: Vec<String>,
    /// Run metadata
    pub metadata: ChatMetadata,
}

/// Error payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `error`
    pub status: String,
    /// Client-safe message
    pub message: String,
    /// Events recorded before the failure
    #[serde(default)]
    pub agent_chain: Vec<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, agent_chain: Vec<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            message: message.into(),
            agent_chain,
        }
    }
}

/// Liveness response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `healthy` while the process serves requests
    pub status: String,
    /// `active`, `initializing` or `unavailable`
    pub brain: String,
    /// Executor ids in load order
    pub agents_loaded: Vec<String>,
    /// Number of executors
    pub executor_count: usize,
    /// Relaymesh version
    pub version: String,
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReadyResponse {
    /// Ready to receive traffic
    pub ready: bool,
    /// Reason when not ready
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Knowledge search request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchRequest {
    /// Query text
    pub query: String,
    /// Maximum results (default 5)
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

fn default_search_limit() -> usize {
    relaymesh_cache::DEFAULT_SEARCH_LIMIT
}

/// One knowledge document returned by a search
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchHit {
    /// Document text
    pub content: String,
    /// Document source, `unknown` when none was recorded
    pub source: String,
    /// Cosine similarity to the query
    pub score: f32,
}

impl From<relaymesh_cache::SearchResult> for SearchHit {
    fn from(result: relaymesh_cache::SearchResult) -> Self {
        Self {
            content: result.content,
            source: result.source,
            score: result.score,
        }
    }
}

/// Knowledge search response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    /// Matches ordered by descending score
    pub results: Vec<SearchHit>,
}

/// Document to add to the knowledge base
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngestRequest {
    /// Document text
    pub content: String,
    /// Where the document came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Stored document id
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngestResponse {
    /// Document id
    pub id: String,
}

/// One research finding; search hits can be passed through unchanged
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResearchFinding {
    /// Finding text
    pub content: String,
    /// Where the finding came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Strategy synthesis request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Findings to synthesize
    #[serde(default)]
    pub research_data: Vec<ResearchFinding>,
    /// Task the findings were gathered for
    pub original_task: String,
}

/// Synthesized strategy
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeResponse {
    /// Provider output
    pub strategy: String,
    /// Executor that produced it
    pub executor: String,
}
