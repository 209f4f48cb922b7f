//! Embedding providers for the semantic cache
//!
//! - `EmbeddingProvider` trait for abstraction
//! - `OpenAiEmbeddingProvider` calling the OpenAI embeddings endpoint
//!
//! Every vector stored by a cache must come from the same model used for its
//! lookups; mixing embedding spaces silently corrupts similarity scores.

use crate::error::{Error, Result};
use crate::openai::OPENAI_API_BASE;
use crate::util::{mask_api_key, sanitize_api_error, transport_error};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Dimensions of [`DEFAULT_EMBEDDING_MODEL`]
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

/// Trait for embedding providers
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the embedding dimension
    fn dimensions(&self) -> usize;

    /// Get the model name
    fn model(&self) -> &str;
}

/// Shared embedding provider handle
pub type SharedEmbeddingProvider = Arc<dyn EmbeddingProvider>;

/// OpenAI embeddings configuration
#[derive(Clone)]
pub struct OpenAiEmbeddingConfig {
    /// API key
    pub api_key: String,
    /// Base URL
    pub base_url: String,
    /// Embedding model
    pub model: String,
    /// Vector length produced by `model`
    pub dimensions: usize,
    /// Request timeout
    pub timeout: Duration,
}

impl fmt::Debug for OpenAiEmbeddingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiEmbeddingConfig")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl OpenAiEmbeddingConfig {
    /// Create a configuration for the default model
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENAI_API_BASE.to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            timeout: Duration::from_secs(30),
        }
    }

    /// Create configuration from `OPENAI_API_KEY` and optional `OPENAI_BASE_URL`
    ///
    /// # Errors
    /// Returns error if `OPENAI_API_KEY` is not set
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::NotConfigured("OPENAI_API_KEY not set".to_string()))?;
        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }

    /// Set the model and its dimensions
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// OpenAI embeddings provider
pub struct OpenAiEmbeddingProvider {
    client: Client,
    config: OpenAiEmbeddingConfig,
}

impl OpenAiEmbeddingProvider {
    /// Create a new provider
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OpenAiEmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Provider(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    #[instrument(skip(self, text), fields(model = %self.config.model, text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&EmbeddingRequest {
                model: &self.config.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| transport_error(&e, self.config.timeout))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Api(sanitize_api_error(&error_text)));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| transport_error(&e, self.config.timeout))?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::InvalidResponse("No embedding in response".to_string()))?;

        if embedding.len() != self.config.dimensions {
            return Err(Error::Provider(format!(
                "expected {} dimensions from {}, got {}",
                self.config.dimensions,
                self.config.model,
                embedding.len()
            )));
        }

        debug!(dims = embedding.len(), "Generated embedding");
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OpenAiEmbeddingConfig::new("sk-1234567890abcdefghij");
        assert_eq!(config.model, DEFAULT_EMBEDDING_MODEL);
        assert_eq!(config.dimensions, DEFAULT_EMBEDDING_DIMENSIONS);
        assert!(!format!("{config:?}").contains("567890"));
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{"data": [{"embedding": [0.1, 0.2, 0.3], "index": 0}], "model": "x"}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.data[0].embedding.len(), 3);
    }
}
