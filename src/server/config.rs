//! Server configuration types
//!
//! Mirrors `config/default.toml`. Every section has serde defaults so a
//! partial override file is enough.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub cache: CacheAppConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub data_dir: Option<String>,
}

impl AppConfig {
    /// Directory for persistent state (`data_dir` or `~/.relaymesh`)
    pub fn data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".relaymesh"),
        }
    }

    /// Semantic cache database path (`cache.path` or `<data_dir>/semantic_cache.db`)
    pub fn cache_path(&self) -> PathBuf {
        match &self.cache.path {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => self.data_dir().join("semantic_cache.db"),
        }
    }

    /// Knowledge base database path (`knowledge.path` or `<data_dir>/knowledge.db`)
    pub fn knowledge_path(&self) -> PathBuf {
        match &self.knowledge.path {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => self.data_dir().join("knowledge.db"),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8001
}

fn default_timeout_secs() -> u64 {
    120
}

/// Executor registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_path")]
    pub path: String,
    #[serde(default = "default_executor")]
    pub default_executor: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: default_registry_path(),
            default_executor: default_executor(),
        }
    }
}

fn default_registry_path() -> String {
    "agents".to_string()
}

fn default_executor() -> String {
    "strategist".to_string()
}

/// Provider call configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            fallback_model: default_fallback_model(),
        }
    }
}

fn default_fallback_model() -> String {
    relaymesh_llm::FALLBACK_MODEL.to_string()
}

/// Vector store backing the semantic cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    #[default]
    Sqlite,
    Hnsw,
}

/// Semantic cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheAppConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub backend: CacheBackend,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    #[serde(default = "default_overfetch")]
    pub overfetch: usize,
    /// 0 means unbounded
    #[serde(default)]
    pub max_entries: usize,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    #[serde(default)]
    pub write_behind: bool,
}

impl Default for CacheAppConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: CacheBackend::default(),
            path: None,
            threshold: default_threshold(),
            overfetch: default_overfetch(),
            max_entries: 0,
            embedding_model: default_embedding_model(),
            dimensions: default_dimensions(),
            write_behind: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_threshold() -> f32 {
    relaymesh_cache::DEFAULT_THRESHOLD
}

fn default_overfetch() -> usize {
    relaymesh_cache::DEFAULT_OVERFETCH
}

fn default_embedding_model() -> String {
    relaymesh_llm::DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_dimensions() -> usize {
    relaymesh_llm::DEFAULT_EMBEDDING_DIMENSIONS
}

/// Knowledge search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub backend: CacheBackend,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_overfetch")]
    pub overfetch: usize,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: CacheBackend::default(),
            path: None,
            overfetch: default_overfetch(),
            embedding_model: default_embedding_model(),
            dimensions: default_dimensions(),
        }
    }
}

/// Relay gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_relay_port")]
    pub port: u16,
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,
    /// Should exceed `server.request_timeout_secs`
    #[serde(default = "default_relay_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: default_relay_port(),
            upstream_url: default_upstream_url(),
            timeout_secs: default_relay_timeout_secs(),
        }
    }
}

fn default_relay_timeout_secs() -> u64 {
    default_timeout_secs() + 5
}

fn default_relay_port() -> u16 {
    8000
}

fn default_upstream_url() -> String {
    "http://127.0.0.1:8001".to_string()
}
