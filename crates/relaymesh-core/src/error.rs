//! Error types for relaymesh-core
//!
//! Every failure a request can end in maps onto one [`FailureClass`], which
//! the entry point turns into a status code. [`Error::public_message`] is the
//! only text that should reach a client.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Executor directory missing or unreadable
    #[error("executor source unavailable at {path:?}: {message}")]
    SourceUnavailable {
        /// Directory that was scanned
        path: PathBuf,
        /// I/O error detail
        message: String,
    },

    /// Empty registry, or no match and no valid default
    #[error("no executor available: {0}")]
    NoExecutorAvailable(String),

    /// Provider timed out, failed in transport, or answered garbage
    #[error("provider unavailable for executor '{executor}': {source}")]
    ProviderUnavailable {
        /// Executor whose call failed
        executor: String,
        /// Underlying provider error
        #[source]
        source: relaymesh_llm::Error,
    },

    /// Cache store unreachable
    #[error("semantic cache unavailable: {0}")]
    CacheUnavailable(#[from] relaymesh_cache::Error),

    /// Run was cancelled before it finished
    #[error("execution cancelled")]
    Cancelled,

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse failure category used to pick the response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The mesh cannot serve the request (503)
    ServiceUnavailable,
    /// The provider failed (502)
    UpstreamFailure,
    /// The provider did not answer in time (504)
    Timeout,
    /// The caller went away or the process is shutting down
    Cancelled,
}

impl Error {
    /// Failure category for this error
    #[must_use]
    pub fn failure_class(&self) -> FailureClass {
        match self {
            Self::ProviderUnavailable {
                source: relaymesh_llm::Error::Timeout(_),
                ..
            } => FailureClass::Timeout,
            Self::ProviderUnavailable { .. } => FailureClass::UpstreamFailure,
            Self::Cancelled => FailureClass::Cancelled,
            Self::SourceUnavailable { .. }
            | Self::NoExecutorAvailable(_)
            | Self::CacheUnavailable(_)
            | Self::Configuration(_) => FailureClass::ServiceUnavailable,
        }
    }

    /// Client-safe message. Never includes provider response text.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::SourceUnavailable { .. } => {
                "Executor registry is unavailable. The service is not ready.".to_string()
            }
            Self::NoExecutorAvailable(_) => "No executor is available for this task.".to_string(),
            Self::ProviderUnavailable { executor, source } => match source {
                relaymesh_llm::Error::Timeout(_) => {
                    format!("Executor '{executor}' timed out waiting for its provider.")
                }
                _ => format!("Executor '{executor}' could not reach its provider."),
            },
            Self::CacheUnavailable(_) => "Semantic cache is unavailable.".to_string(),
            Self::Cancelled => "Request was cancelled.".to_string(),
            Self::Configuration(_) => "Service is misconfigured.".to_string(),
        }
    }
}
