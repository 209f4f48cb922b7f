//! Mock providers for testing
//!
//! `MockProvider` answers from a queue (falling back to an echo of the
//! prompt) and counts calls. `MockEmbeddingProvider` hashes words into a
//! fixed number of buckets, so identical word sets embed identically.

use crate::completion::{CompletionRequest, CompletionResponse};
use crate::embeddings::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::provider::LlmProvider;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A mock LLM provider
pub struct MockProvider {
    name: String,
    responses: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create a new mock provider named `mock`.
    #[must_use]
    pub fn new() -> Self {
        Self::named("mock")
    }

    /// Create a new mock provider with a custom name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Sleep before answering (for timeout and cancellation tests).
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a successful response.
    pub fn push_response(&self, content: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Ok(content.into()));
    }

    /// Queue a failure.
    pub fn push_error(&self, error: Error) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(error));
    }

    /// Number of `complete` calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let queued = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        let content = match queued {
            Some(result) => result?,
            None => format!("mock response to: {}", request.prompt),
        };

        Ok(CompletionResponse {
            content,
            usage: None,
            finish_reason: Some("stop".to_string()),
            model: request.model,
        })
    }
}

/// Deterministic bag-of-words embedder
pub struct MockEmbeddingProvider {
    dimensions: usize,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl MockEmbeddingProvider {
    /// Create an embedder producing `dimensions`-length unit vectors.
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Make subsequent `embed` calls fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `embed` calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn bucket(&self, word: &str) -> usize {
        // FNV-1a
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in word.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        (hash % self.dimensions as u64) as usize
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Network("mock embedder offline".to_string()));
        }

        let mut vector = vec![0.0_f32; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[self.bucket(&word.to_lowercase())] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        "mock-embedding"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_queue_then_echo() {
        let provider = MockProvider::new();
        provider.push_response("first");

        let first = provider
            .complete(CompletionRequest::new("m", "p1"))
            .await
            .unwrap();
        let second = provider
            .complete(CompletionRequest::new("m", "p2"))
            .await
            .unwrap();

        assert_eq!(first.content, "first");
        assert_eq!(second.content, "mock response to: p2");
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.requests()[1].prompt, "p2");
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let provider = MockProvider::new();
        provider.push_error(Error::Network("down".into()));
        let result = provider.complete(CompletionRequest::new("m", "p")).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }

    #[tokio::test]
    async fn test_mock_embedding_is_deterministic_and_normalized() {
        let embedder = MockEmbeddingProvider::new(32);
        let a = embedder.embed("Research AI trends").await.unwrap();
        let b = embedder.embed("research ai TRENDS").await.unwrap();

        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_mock_embedding_failure_toggle() {
        let embedder = MockEmbeddingProvider::new(8);
        embedder.set_failing(true);
        assert!(embedder.embed("x").await.is_err());
        embedder.set_failing(false);
        assert!(embedder.embed("x").await.is_ok());
        assert_eq!(embedder.call_count(), 2);
    }
}
