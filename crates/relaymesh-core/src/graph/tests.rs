use super::*;
use crate::error::Error;
use crate::gateway::ProviderGateway;
use crate::registry::{ExecutorDefinition, Registry};
use crate::router::CapabilityRouter;
use relaymesh_cache::{CacheConfig, InMemoryStore, SemanticCache};
use relaymesh_llm::{MockEmbeddingProvider, MockProvider, ProviderFamily};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn registry() -> Arc<Registry> {
    Arc::new(Registry::from_definitions(vec![
        ExecutorDefinition::new("researcher", "research", "You research."),
        ExecutorDefinition::new("strategist", "", "You strategize."),
    ]))
}

fn graph_with(provider: Arc<MockProvider>) -> OrchestrationGraph {
    OrchestrationGraph::new(
        registry(),
        CapabilityRouter::new().with_default_executor("strategist"),
        Arc::new(ProviderGateway::new().with_provider(ProviderFamily::OpenAi, provider)),
    )
}

#[test]
fn test_state_transitions_record_history() {
    let mut state = ExecutionState::new("task", "u1");
    assert_eq!(state.stage(), Stage::Start);
    assert!(state.history().is_empty());
    assert!(state.selected_executor_id.is_empty());

    state.mark_routed("researcher");
    state.mark_executed("out".to_string());
    state.finish();

    assert_eq!(state.stage(), Stage::Done);
    assert_eq!(
        state.history(),
        ["Router selected: researcher", "Executed: researcher"]
    );
    assert_eq!(state.final_output, "out");
}

#[tokio::test]
async fn test_run_routes_and_executes() {
    let provider = Arc::new(MockProvider::new());
    provider.push_response("trend report");
    let graph = graph_with(provider.clone());

    let success = graph
        .run("Research AI marketing trends", "u1", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(success.state.stage(), Stage::Done);
    assert_eq!(success.state.selected_executor_id, "researcher");
    assert_eq!(success.state.final_output, "trend report");
    assert_eq!(
        success.state.history(),
        ["Router selected: researcher", "Executed: researcher"]
    );
    assert!(!success.cache_hit);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_provider_failure_keeps_router_event() {
    let provider = Arc::new(MockProvider::new());
    provider.push_error(relaymesh_llm::Error::Api("boom".into()));
    let graph = graph_with(provider);

    let failure = graph
        .run("plan my Q1 budget", "u1", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(failure.error, Error::ProviderUnavailable { .. }));
    assert_eq!(failure.state.stage(), Stage::Done);
    assert_eq!(failure.state.history(), ["Router selected: strategist"]);
    assert!(failure.state.final_output.is_empty());
}

#[tokio::test]
async fn test_empty_registry_fails_without_calling_provider() {
    let provider = Arc::new(MockProvider::new());
    let graph = OrchestrationGraph::new(
        Arc::new(Registry::empty()),
        CapabilityRouter::new().with_default_executor("strategist"),
        Arc::new(ProviderGateway::new().with_provider(ProviderFamily::OpenAi, provider.clone())),
    );

    let failure = graph
        .run("anything", "u1", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(failure.error, Error::NoExecutorAvailable(_)));
    assert!(failure.state.history().is_empty());
    assert_eq!(failure.state.stage(), Stage::Done);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_cache_hit_skips_provider_on_second_run() {
    let provider = Arc::new(MockProvider::new());
    provider.push_response("first answer");
    let cache = Arc::new(SemanticCache::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(MockEmbeddingProvider::new(64)),
        CacheConfig::default(),
    ));
    let graph = graph_with(provider.clone()).with_cache(cache);
    let cancel = CancellationToken::new();

    let first = graph.run("Research AI trends", "u1", &cancel).await.unwrap();
    let second = graph.run("Research AI trends", "u1", &cancel).await.unwrap();

    assert!(!first.cache_hit);
    assert!(second.cache_hit);
    assert_eq!(first.state.final_output, second.state.final_output);
    assert_eq!(second.state.history(), first.state.history());
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_pre_cancelled_run_never_routes() {
    let provider = Arc::new(MockProvider::new());
    let graph = graph_with(provider.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let failure = graph.run("Research", "u1", &cancel).await.unwrap_err();
    assert!(matches!(failure.error, Error::Cancelled));
    assert!(failure.state.history().is_empty());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_aborts_in_flight_call() {
    let provider = Arc::new(MockProvider::new().with_delay(Duration::from_secs(60)));
    let graph = graph_with(provider);
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let failure = graph.run("Research", "u1", &cancel).await.unwrap_err();
    assert!(matches!(failure.error, Error::Cancelled));
    assert_eq!(failure.state.history(), ["Router selected: researcher"]);
}
