//! Completion request and response types
//!
//! A request carries one assembled prompt plus the two logical knobs every
//! provider family understands: reasoning effort and verbosity. Each provider
//! maps them onto its own wire parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Logical reasoning depth.
///
/// OpenAI calls this `reasoning_effort`, Gemini calls it `thinking_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    /// Minimal reasoning
    Minimal,
    /// Low reasoning
    Low,
    /// Medium reasoning
    Medium,
    /// High reasoning
    High,
}

impl ReasoningEffort {
    /// Returns the wire representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ReasoningEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReasoningEffort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minimal" => Ok(Self::Minimal),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown reasoning effort: {other}")),
        }
    }
}

/// Logical answer length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Terse answers
    Low,
    /// Default length
    Medium,
    /// Expansive answers
    High,
}

impl Verbosity {
    /// Returns the wire representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown verbosity: {other}")),
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens
    pub prompt_tokens: u32,
    /// Completion tokens
    pub completion_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
}

/// Completion request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    /// Model to use (provider-specific)
    pub model: String,
    /// Fully assembled prompt
    pub prompt: String,
    /// Reasoning effort, if the model supports it
    pub reasoning_effort: Option<ReasoningEffort>,
    /// Verbosity, if the model supports it
    pub verbosity: Option<Verbosity>,
}

impl CompletionRequest {
    /// Create a new completion request
    #[must_use]
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Set reasoning effort
    #[must_use]
    pub fn with_reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.reasoning_effort = Some(effort);
        self
    }

    /// Set verbosity
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = Some(verbosity);
        self
    }
}

/// Completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated content
    pub content: String,
    /// Token usage
    pub usage: Option<TokenUsage>,
    /// Finish reason
    pub finish_reason: Option<String>,
    /// Model used
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasoning_effort_parse() {
        assert_eq!("HIGH".parse::<ReasoningEffort>(), Ok(ReasoningEffort::High));
        assert_eq!(" low ".parse::<ReasoningEffort>(), Ok(ReasoningEffort::Low));
        assert!("extreme".parse::<ReasoningEffort>().is_err());
    }

    #[test]
    fn test_verbosity_parse() {
        assert_eq!("low".parse::<Verbosity>(), Ok(Verbosity::Low));
        assert!("minimal".parse::<Verbosity>().is_err());
    }

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::new("gpt-5", "hello")
            .with_reasoning_effort(ReasoningEffort::High)
            .with_verbosity(Verbosity::Low);

        assert_eq!(request.model, "gpt-5");
        assert_eq!(request.reasoning_effort, Some(ReasoningEffort::High));
        assert_eq!(request.verbosity, Some(Verbosity::Low));
    }

    #[test]
    fn test_effort_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ReasoningEffort::Medium).unwrap(),
            "\"medium\""
        );
    }
}
