//! Error types for relaymesh-llm

use thiserror::Error;

/// Provider error type
#[derive(Debug, Error)]
pub enum Error {
    /// Provider not configured (missing API key, unknown family)
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// API error returned by the provider
    #[error("api error: {0}")]
    Api(String),

    /// Response could not be decoded or had no content
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Transport failure
    #[error("network error: {0}")]
    Network(String),

    /// Timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// Generic provider failure (client construction, embedding shape)
    #[error("provider error: {0}")]
    Provider(String),
}

impl Error {
    /// Whether the failure came from the transport rather than the provider's answer.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
