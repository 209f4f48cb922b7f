//! Executor definition loader
//!
//! Loads `*.md` files with an optional YAML front-matter header from a
//! single directory (non-recursive).

use super::{ExecutorDefinition, ModelParameters, Registry};
use crate::error::{Error, Result};
use relaymesh_llm::{ProviderFamily, ReasoningEffort, Verbosity};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default executor definition directory
const DEFAULT_REGISTRY_DIR: &str = "agents";

/// Header delimiter line
const FRONT_MATTER_FENCE: &str = "---";

/// Raw header keys
#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    model: Option<String>,
    #[serde(alias = "thinking_level")]
    reasoning_effort: Option<String>,
    verbosity: Option<String>,
    capability: Option<String>,
    provider: Option<String>,
    #[serde(default)]
    default: bool,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_yaml::Value>,
}

/// Executor definition loader
#[derive(Debug)]
pub struct RegistryLoader {
    source_dir: PathBuf,
}

impl RegistryLoader {
    /// Create loader with default path (`agents/`)
    #[must_use]
    pub fn new() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_REGISTRY_DIR),
        }
    }

    /// Create loader with custom path
    #[must_use]
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            source_dir: path.as_ref().to_path_buf(),
        }
    }

    /// Return source directory path
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Load every definition in the directory.
    ///
    /// Files are read in file-name order, so the registry order (and with it
    /// routing) is reproducible.
    ///
    /// # Errors
    /// - Directory missing or unreadable: [`Error::SourceUnavailable`]
    /// - Individual file failures are warned and skipped
    pub fn load(&self) -> Result<Registry> {
        let unavailable = |e: std::io::Error| Error::SourceUnavailable {
            path: self.source_dir.clone(),
            message: e.to_string(),
        };

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.source_dir)
            .map_err(unavailable)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| Self::is_definition_file(path))
            .collect();
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut definitions = Vec::with_capacity(paths.len());
        for path in &paths {
            match Self::load_file(path) {
                Ok(definition) => {
                    info!(
                        "Loaded executor: {} (capability: {:?})",
                        definition.id, definition.capability_tag
                    );
                    definitions.push(definition);
                }
                Err(e) => {
                    warn!("Skipping executor definition {:?}: {}", path, e);
                }
            }
        }

        let registry = Registry::from_definitions(definitions);
        if registry.is_empty() {
            warn!("No executor definitions found in {:?}", self.source_dir);
        } else {
            debug!(
                "Loaded {} executors from {:?}",
                registry.len(),
                self.source_dir
            );
        }
        Ok(registry)
    }

    /// Parse one definition file.
    fn load_file(path: &Path) -> std::result::Result<ExecutorDefinition, String> {
        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| "file has no stem".to_string())?;

        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read: {}", e))?;

        parse_definition(&id, &content)
    }

    fn is_definition_file(path: &Path) -> bool {
        path.is_file() && path.extension().is_some_and(|ext| ext == "md")
    }
}

impl Default for RegistryLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a definition from document text.
pub(crate) fn parse_definition(
    id: &str,
    content: &str,
) -> std::result::Result<ExecutorDefinition, String> {
    let (header, body) = split_front_matter(content)?;

    let front: FrontMatter = match header {
        Some(header) if !header.trim().is_empty() => {
            serde_yaml::from_str(header).map_err(|e| format!("invalid header: {}", e))?
        }
        _ => FrontMatter::default(),
    };

    let reasoning_effort = front
        .reasoning_effort
        .as_deref()
        .map(str::parse::<ReasoningEffort>)
        .transpose()?;
    let verbosity = front
        .verbosity
        .as_deref()
        .map(str::parse::<Verbosity>)
        .transpose()?;
    let provider = front
        .provider
        .as_deref()
        .map(|selector| {
            ProviderFamily::from_selector(selector)
                .ok_or_else(|| format!("unknown provider '{}'", selector))
        })
        .transpose()?;

    let mut definition = ExecutorDefinition::new(
        id,
        front.capability.unwrap_or_default(),
        body.trim(),
    )
    .with_model_parameters(ModelParameters {
        model: front.model,
        reasoning_effort,
        verbosity,
        provider,
    });
    definition.is_default = front.default;
    definition.extra = front.extra;

    Ok(definition)
}

/// Split a document into `(header, body)`.
///
/// A document whose first line is not `---` has no header. An opening fence
/// without a closing one is malformed.
fn split_front_matter(content: &str) -> std::result::Result<(Option<&str>, &str), String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let Some(first_line_end) = content.find('\n') else {
        return Ok(if content.trim_end() == FRONT_MATTER_FENCE {
            (Some(""), "")
        } else {
            (None, content)
        });
    };
    if content[..first_line_end].trim_end() != FRONT_MATTER_FENCE {
        return Ok((None, content));
    }

    let rest = &content[first_line_end + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FRONT_MATTER_FENCE {
            let header = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((Some(header), body));
        }
        offset += line.len();
    }

    Err("front matter is not closed".to_string())
}
