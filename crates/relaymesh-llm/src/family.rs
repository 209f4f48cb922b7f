//! Provider family resolution
//!
//! Executors name a model; the family (and therefore the wire format and the
//! parameter names used for reasoning effort and verbosity) is derived from
//! the model name prefix. Unknown names fall back to a fixed default model.

use crate::completion::{CompletionRequest, ReasoningEffort, Verbosity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Model used when an executor names nothing recognizable
pub const FALLBACK_MODEL: &str = "gpt-4o";

/// Provider family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderFamily {
    /// OpenAI chat completions (`reasoning_effort`, `verbosity`)
    OpenAi,
    /// Google Gemini generateContent (`thinkingLevel`)
    Gemini,
}

impl ProviderFamily {
    /// Returns the canonical name used as provider registration key
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }

    /// Parse an explicit provider selector (`provider:` executor metadata).
    #[must_use]
    pub fn from_selector(selector: &str) -> Option<Self> {
        match selector.trim().to_lowercase().as_str() {
            "openai" | "gpt" => Some(Self::OpenAi),
            "gemini" | "google" => Some(Self::Gemini),
            _ => None,
        }
    }

    /// Detect the family from a model name prefix.
    #[must_use]
    pub fn detect(model: &str) -> Option<Self> {
        let lower = model.trim().to_lowercase();
        if lower.starts_with("gemini") {
            Some(Self::Gemini)
        } else if lower.starts_with("gpt-") || is_o_series(&lower) {
            Some(Self::OpenAi)
        } else {
            None
        }
    }

    /// Whether this model accepts a reasoning knob at all.
    #[must_use]
    pub fn supports_reasoning(&self, model: &str) -> bool {
        let lower = model.to_lowercase();
        match self {
            Self::OpenAi => lower.starts_with("gpt-5") || is_o_series(&lower),
            Self::Gemini => lower.starts_with("gemini-3"),
        }
    }

    /// Whether this model accepts a verbosity knob.
    #[must_use]
    pub fn supports_verbosity(&self, model: &str) -> bool {
        matches!(self, Self::OpenAi) && model.to_lowercase().starts_with("gpt-5")
    }

    /// Reasoning effort used when the executor does not specify one.
    #[must_use]
    pub fn default_reasoning_effort(&self) -> ReasoningEffort {
        match self {
            Self::OpenAi => ReasoningEffort::Medium,
            Self::Gemini => ReasoningEffort::High,
        }
    }
}

impl fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `o1`, `o3-mini`, `o4-mini`...
fn is_o_series(lower: &str) -> bool {
    let mut chars = lower.chars();
    chars.next() == Some('o') && chars.next().is_some_and(|c| c.is_ascii_digit())
}

/// Resolved provider, model and knobs for one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    /// Provider family to dispatch to
    pub family: ProviderFamily,
    /// Concrete model name
    pub model: String,
    /// Reasoning effort sent to the provider
    pub reasoning_effort: Option<ReasoningEffort>,
    /// Verbosity sent to the provider
    pub verbosity: Option<Verbosity>,
}

impl ModelSelection {
    /// Resolve a selection from executor model parameters.
    ///
    /// An explicit `provider` selector wins over prefix detection. A model name
    /// no family recognizes is replaced by [`FALLBACK_MODEL`] with no knobs.
    #[must_use]
    pub fn resolve(
        model: Option<&str>,
        provider: Option<ProviderFamily>,
        reasoning_effort: Option<ReasoningEffort>,
        verbosity: Option<Verbosity>,
    ) -> Self {
        let requested = model.map(str::trim).filter(|m| !m.is_empty());

        let (family, model) = match (requested, provider) {
            (Some(m), Some(family)) => (family, m.to_string()),
            (Some(m), None) => match ProviderFamily::detect(m) {
                Some(family) => (family, m.to_string()),
                None => return Self::fallback(),
            },
            (None, _) => return Self::fallback(),
        };

        let reasoning_effort = family
            .supports_reasoning(&model)
            .then(|| reasoning_effort.unwrap_or_else(|| family.default_reasoning_effort()));
        let verbosity = verbosity.filter(|_| family.supports_verbosity(&model));

        Self {
            family,
            model,
            reasoning_effort,
            verbosity,
        }
    }

    /// The fixed default provider/model
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            family: ProviderFamily::OpenAi,
            model: FALLBACK_MODEL.to_string(),
            reasoning_effort: None,
            verbosity: None,
        }
    }

    /// Build the completion request for an assembled prompt.
    #[must_use]
    pub fn to_request(&self, prompt: impl Into<String>) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            prompt: prompt.into(),
            reasoning_effort: self.reasoning_effort,
            verbosity: self.verbosity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_family() {
        assert_eq!(ProviderFamily::detect("gemini-3-pro"), Some(ProviderFamily::Gemini));
        assert_eq!(ProviderFamily::detect("gpt-5.2"), Some(ProviderFamily::OpenAi));
        assert_eq!(ProviderFamily::detect("o3-mini"), Some(ProviderFamily::OpenAi));
        assert_eq!(ProviderFamily::detect("claude-opus"), None);
        assert_eq!(ProviderFamily::detect("ollama"), None);
    }

    #[test]
    fn test_gemini_defaults_to_high_thinking() {
        let sel = ModelSelection::resolve(Some("gemini-3-pro-preview"), None, None, None);
        assert_eq!(sel.family, ProviderFamily::Gemini);
        assert_eq!(sel.reasoning_effort, Some(ReasoningEffort::High));
        assert_eq!(sel.verbosity, None);
    }

    #[test]
    fn test_gpt5_defaults_to_medium_effort() {
        let sel = ModelSelection::resolve(Some("gpt-5.2"), None, None, Some(Verbosity::Low));
        assert_eq!(sel.family, ProviderFamily::OpenAi);
        assert_eq!(sel.reasoning_effort, Some(ReasoningEffort::Medium));
        assert_eq!(sel.verbosity, Some(Verbosity::Low));
    }

    #[test]
    fn test_explicit_effort_is_kept() {
        let sel =
            ModelSelection::resolve(Some("gpt-5"), None, Some(ReasoningEffort::High), None);
        assert_eq!(sel.reasoning_effort, Some(ReasoningEffort::High));
    }

    #[test]
    fn test_non_reasoning_model_drops_knobs() {
        let sel = ModelSelection::resolve(
            Some("gpt-4o-mini"),
            None,
            Some(ReasoningEffort::High),
            Some(Verbosity::High),
        );
        assert_eq!(sel.model, "gpt-4o-mini");
        assert_eq!(sel.reasoning_effort, None);
        assert_eq!(sel.verbosity, None);
    }

    #[test]
    fn test_unknown_model_falls_back() {
        let sel = ModelSelection::resolve(Some("llama-3"), None, Some(ReasoningEffort::Low), None);
        assert_eq!(sel, ModelSelection::fallback());
        assert_eq!(sel.model, FALLBACK_MODEL);

        let sel = ModelSelection::resolve(None, None, None, None);
        assert_eq!(sel, ModelSelection::fallback());
    }

    #[test]
    fn test_provider_selector_overrides_detection() {
        let sel = ModelSelection::resolve(
            Some("my-proxy-model"),
            Some(ProviderFamily::Gemini),
            None,
            None,
        );
        assert_eq!(sel.family, ProviderFamily::Gemini);
        assert_eq!(sel.model, "my-proxy-model");
        assert_eq!(sel.reasoning_effort, None);
    }

    #[test]
    fn test_from_selector() {
        assert_eq!(ProviderFamily::from_selector("Google"), Some(ProviderFamily::Gemini));
        assert_eq!(ProviderFamily::from_selector("openai"), Some(ProviderFamily::OpenAi));
        assert_eq!(ProviderFamily::from_selector("bedrock"), None);
    }

    #[test]
    fn test_to_request_carries_knobs() {
        let sel = ModelSelection::resolve(Some("gpt-5"), None, None, None);
        let request = sel.to_request("do it");
        assert_eq!(request.model, "gpt-5");
        assert_eq!(request.prompt, "do it");
        assert_eq!(request.reasoning_effort, Some(ReasoningEffort::Medium));
    }
}
