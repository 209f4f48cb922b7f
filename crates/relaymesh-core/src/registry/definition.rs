//! Executor definitions

use relaymesh_llm::{ModelSelection, ProviderFamily, ReasoningEffort, Verbosity};
use serde::Serialize;
use std::collections::BTreeMap;

/// Model parameters declared in an executor header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelParameters {
    /// Requested model name
    pub model: Option<String>,
    /// Logical reasoning knob (`reasoning_effort` or `thinking_level`)
    pub reasoning_effort: Option<ReasoningEffort>,
    /// Output verbosity
    pub verbosity: Option<Verbosity>,
    /// Explicit provider family, overriding model-name detection
    pub provider: Option<ProviderFamily>,
}

impl ModelParameters {
    /// Resolve the provider, model and knobs to call.
    ///
    /// Without a model name, or when neither `provider` nor the model name
    /// identifies a family, the call goes to OpenAI with `fallback_model`
    /// and no reasoning knobs.
    #[must_use]
    pub fn selection(&self, fallback_model: &str) -> ModelSelection {
        let model = self.model.as_deref().map(str::trim).filter(|m| !m.is_empty());
        let identified = match model {
            Some(m) => self.provider.is_some() || ProviderFamily::detect(m).is_some(),
            None => false,
        };

        if !identified {
            return ModelSelection {
                model: fallback_model.to_string(),
                ..ModelSelection::fallback()
            };
        }

        ModelSelection::resolve(
            model,
            self.provider,
            self.reasoning_effort,
            self.verbosity,
        )
    }
}

/// One executor: capability tag, prompt template and model parameters.
///
/// Loaded once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutorDefinition {
    /// Unique id (the definition file's stem)
    pub id: String,
    /// Lowercase capability tag; empty means "never matched by routing"
    pub capability_tag: String,
    /// Prompt body the task is appended to
    pub prompt_template: String,
    /// Model parameters
    pub model_parameters: ModelParameters,
    /// Declared as the fallback executor (`default: true`)
    pub is_default: bool,
    /// Header keys not interpreted by relaymesh
    #[serde(skip)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl ExecutorDefinition {
    /// Create a definition with no model parameters
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        capability_tag: impl Into<String>,
        prompt_template: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            capability_tag: capability_tag.into().trim().to_lowercase(),
            prompt_template: prompt_template.into(),
            model_parameters: ModelParameters::default(),
            is_default: false,
            extra: BTreeMap::new(),
        }
    }

    /// Set model parameters
    #[must_use]
    pub fn with_model_parameters(mut self, parameters: ModelParameters) -> Self {
        self.model_parameters = parameters;
        self
    }

    /// Mark as the declared default executor
    #[must_use]
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Whether routing can select this executor by tag
    #[must_use]
    pub fn has_capability(&self) -> bool {
        !self.capability_tag.is_empty()
    }

    /// Whether the capability tag occurs in an already-lowercased task
    #[must_use]
    pub fn matches(&self, lowercase_task: &str) -> bool {
        self.has_capability() && lowercase_task.contains(self.capability_tag.as_str())
    }

    /// Assemble the provider prompt: template, blank line, then the task.
    #[must_use]
    pub fn build_prompt(&self, task: &str) -> String {
        format!("{}\n\nTask: {}", self.prompt_template, task)
    }
}
