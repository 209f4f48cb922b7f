//! Relaymesh LLM - Provider Gateway boundary
//!
//! This crate provides the two black-box provider calls the orchestrator
//! depends on:
//! - `LlmProvider::complete(request)`: OpenAI and Gemini over HTTP
//! - `EmbeddingProvider::embed(text)`: OpenAI embeddings
//!
//! plus `ModelSelection`, which turns an executor's model name into a provider
//! family, a concrete model and the reasoning-effort/verbosity knobs that
//! family understands.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod embeddings;
pub mod error;
pub mod family;
pub mod gemini;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod util;

pub use completion::{CompletionRequest, CompletionResponse, ReasoningEffort, TokenUsage, Verbosity};
pub use embeddings::{
    EmbeddingProvider, OpenAiEmbeddingConfig, OpenAiEmbeddingProvider, SharedEmbeddingProvider,
    DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL,
};
pub use error::{Error, Result};
pub use family::{ModelSelection, ProviderFamily, FALLBACK_MODEL};
pub use gemini::{GeminiConfig, GeminiProvider};
pub use mock::{MockEmbeddingProvider, MockProvider};
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use provider::LlmProvider;
