//! Orchestration Graph Integration Tests
//!
//! Runs the graph end to end over registries loaded from disk, including the
//! project's own `agents/` directory.

use async_trait::async_trait;
use mockall::mock;
use relaymesh_cache::{CacheConfig, InMemoryStore, SemanticCache};
use relaymesh_core::{
    BrainState, CapabilityRouter, EngineContext, Error, FailureClass, ProviderGateway,
    RegistryLoader, Stage,
};
use relaymesh_llm::{
    CompletionRequest, CompletionResponse, LlmProvider, MockEmbeddingProvider, ProviderFamily,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

mock! {
    pub Provider {}

    #[async_trait]
    impl LlmProvider for Provider {
        fn name(&self) -> &str;
        fn default_model(&self) -> &str;
        async fn complete(&self, request: CompletionRequest) -> relaymesh_llm::Result<CompletionResponse>;
    }
}

fn project_agents_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("agents")
}

fn response(content: &str) -> CompletionResponse {
    CompletionResponse {
        content: content.to_string(),
        usage: None,
        finish_reason: Some("stop".to_string()),
        model: "gpt-4o".to_string(),
    }
}

/// researcher (capability `research`) and strategist (no capability, default)
fn scenario_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("researcher.md"),
        "---\nmodel: gpt-4o\ncapability: research\n---\nYou are a researcher.\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("strategist.md"),
        "---\nmodel: gpt-4o\ncapability: \"\"\ndefault: true\n---\nYou are a strategist.\n",
    )
    .unwrap();
    dir
}

fn context(dir: &TempDir, provider: MockProvider) -> EngineContext {
    EngineContext::load(
        dir.path(),
        CapabilityRouter::new().with_default_executor("strategist"),
        ProviderGateway::new().with_provider(ProviderFamily::OpenAi, Arc::new(provider)),
        None,
    )
}

fn named_provider() -> MockProvider {
    let mut provider = MockProvider::new();
    provider.expect_name().return_const("mock".to_string());
    provider
}

#[test]
fn test_project_agents_load() {
    let registry = RegistryLoader::with_path(project_agents_dir())
        .load()
        .expect("Failed to load project agents");

    assert!(registry.contains("researcher"), "Should have researcher");
    assert!(registry.contains("strategist"), "Should have strategist");
    assert_eq!(
        registry.declared_default().map(|e| e.id.as_str()),
        Some("strategist")
    );
}

#[tokio::test]
async fn test_research_task_routes_to_researcher() {
    let dir = scenario_dir();
    let mut provider = named_provider();
    provider
        .expect_complete()
        .withf(|req| req.prompt == "You are a researcher.\n\nTask: Research AI marketing trends")
        .times(1)
        .returning(|_| Ok(response("AI marketing is shifting to agents.")));

    let ctx = context(&dir, provider);
    let success = ctx
        .run("Research AI marketing trends", "user-1", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(success.state.selected_executor_id, "researcher");
    assert_eq!(
        success.state.history(),
        ["Router selected: researcher", "Executed: researcher"]
    );
    assert_eq!(success.state.final_output, "AI marketing is shifting to agents.");
}

#[tokio::test]
async fn test_unmatched_task_falls_back_to_strategist() {
    let dir = scenario_dir();
    let mut provider = named_provider();
    provider
        .expect_complete()
        .times(1)
        .returning(|_| Ok(response("Allocate 40% to growth.")));

    let ctx = context(&dir, provider);
    let success = ctx
        .run("plan my Q1 budget", "user-1", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(success.state.selected_executor_id, "strategist");
    assert_eq!(
        success.state.history(),
        ["Router selected: strategist", "Executed: strategist"]
    );
}

#[tokio::test]
async fn test_unmatched_task_without_strategist_has_no_executor() {
    let dir = scenario_dir();
    fs::remove_file(dir.path().join("strategist.md")).unwrap();
    let mut provider = named_provider();
    provider.expect_complete().never();

    let ctx = context(&dir, provider);
    let failure = ctx
        .run("plan my Q1 budget", "user-1", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(failure.error, Error::NoExecutorAvailable(_)));
    assert_eq!(failure.error.failure_class(), FailureClass::ServiceUnavailable);
    assert_eq!(failure.state.stage(), Stage::Done);
}

#[tokio::test]
async fn test_empty_registry_fails_every_run() {
    let dir = TempDir::new().unwrap();
    let mut provider = named_provider();
    provider.expect_complete().never();

    let ctx = context(&dir, provider);
    assert_eq!(ctx.health().brain, BrainState::Initializing);

    for task in ["Research anything", "plan my Q1 budget", ""] {
        let failure = ctx
            .run(task, "user-1", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(failure.error, Error::NoExecutorAvailable(_)));
        assert_eq!(failure.state.stage(), Stage::Done);
    }
}

#[tokio::test]
async fn test_provider_failure_is_upstream_failure() {
    let dir = scenario_dir();
    let mut provider = named_provider();
    provider
        .expect_complete()
        .times(1)
        .returning(|_| Err(relaymesh_llm::Error::Api("quota exceeded for key sk-abc".into())));

    let ctx = context(&dir, provider);
    let failure = ctx
        .run("Research AI marketing trends", "user-1", &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(failure.error.failure_class(), FailureClass::UpstreamFailure);
    assert!(!failure.error.public_message().contains("sk-abc"));
    assert_eq!(failure.state.history(), ["Router selected: researcher"]);
}

#[tokio::test]
async fn test_repeated_run_is_served_from_cache() {
    let dir = scenario_dir();
    let mut provider = named_provider();
    provider
        .expect_complete()
        .times(1)
        .returning(|_| Ok(response("cached insight")));

    let cache = Arc::new(SemanticCache::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(MockEmbeddingProvider::new(128)),
        CacheConfig::default(),
    ));
    let ctx = EngineContext::load(
        dir.path(),
        CapabilityRouter::new().with_default_executor("strategist"),
        ProviderGateway::new().with_provider(ProviderFamily::OpenAi, Arc::new(provider)),
        Some(cache.clone()),
    );

    let cancel = CancellationToken::new();
    let first = ctx
        .run("Research AI marketing trends", "user-1", &cancel)
        .await
        .unwrap();
    let second = ctx
        .run("Research AI marketing trends", "user-1", &cancel)
        .await
        .unwrap();

    assert_eq!(first.state.final_output, second.state.final_output);
    assert!(second.cache_hit);
    assert_eq!(cache.stats().hits, 1);
}

#[tokio::test]
async fn test_concurrent_runs_share_nothing() {
    let dir = scenario_dir();
    let mut provider = named_provider();
    provider
        .expect_complete()
        .times(8)
        .returning(|req| Ok(response(&format!("answer for {}", req.prompt.len()))));

    let ctx = Arc::new(context(&dir, provider));
    let mut handles = Vec::new();
    for i in 0..8 {
        let ctx = Arc::clone(&ctx);
        handles.push(tokio::spawn(async move {
            let task = if i % 2 == 0 {
                format!("Research topic {}", i)
            } else {
                format!("plan quarter {}", i)
            };
            ctx.run(&task, "user-1", &CancellationToken::new()).await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let success = handle.await.unwrap().unwrap();
        let expected = if i % 2 == 0 { "researcher" } else { "strategist" };
        assert_eq!(success.state.selected_executor_id, expected);
        assert_eq!(success.state.history().len(), 2);
    }
}
