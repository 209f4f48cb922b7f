//! Executor Registry
//!
//! Executors are data: each `*.md` file in the registry directory becomes one
//! [`ExecutorDefinition`]. The loaded [`Registry`] is an immutable snapshot
//! shared by every request for the lifetime of the process.
//!
//! # Example
//!
//! ```rust,ignore
//! use relaymesh_core::registry::RegistryLoader;
//!
//! let registry = RegistryLoader::with_path("agents").load()?;
//! for executor in registry.iter() {
//!     println!("{} ({})", executor.id, executor.capability_tag);
//! }
//! ```

mod definition;
mod loader;

pub use definition::{ExecutorDefinition, ModelParameters};
pub use loader::RegistryLoader;

use std::collections::HashMap;
use tracing::warn;

/// Immutable, ordered set of executor definitions
#[derive(Debug, Clone, Default)]
pub struct Registry {
    executors: Vec<ExecutorDefinition>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Create an empty registry
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a registry, keeping the given order.
    ///
    /// A definition whose id was already seen is dropped with a warning.
    #[must_use]
    pub fn from_definitions(definitions: impl IntoIterator<Item = ExecutorDefinition>) -> Self {
        let mut registry = Self::default();
        for definition in definitions {
            if registry.index.contains_key(&definition.id) {
                warn!("Duplicate executor id '{}', keeping the first", definition.id);
                continue;
            }
            registry
                .index
                .insert(definition.id.clone(), registry.executors.len());
            registry.executors.push(definition);
        }
        registry
    }

    /// Look up an executor by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ExecutorDefinition> {
        self.index.get(id).map(|&i| &self.executors[i])
    }

    /// Whether an executor with this id exists
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Executors in load order
    pub fn iter(&self) -> impl Iterator<Item = &ExecutorDefinition> {
        self.executors.iter()
    }

    /// Executor ids in load order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.executors.iter().map(|e| e.id.as_str())
    }

    /// First executor declaring `default: true`
    #[must_use]
    pub fn declared_default(&self) -> Option<&ExecutorDefinition> {
        self.executors.iter().find(|e| e.is_default)
    }

    /// Number of executors
    #[must_use]
    pub fn len(&self) -> usize {
        self.executors.len()
    }

    /// Whether the registry has no executors
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}
