//! Configuration loading, validation, and management for Cornerman.
//!
//! Loads configuration from `~/.cornerman/config.toml` with environment
//! variable overrides, and validates all settings at startup. The three
//! remote settings (API token, chat base URL, embeddings base URL) have no
//! defaults — [`AppConfig::remote`] fails with a message naming the missing
//! variable, and the process must not start without them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.cornerman/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API token for the hosted model endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the chat completion endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_base_url: Option<String>,

    /// Base URL of the embeddings endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddings_base_url: Option<String>,

    /// Brand the assistant speaks for (interpolated into the system prompt).
    #[serde(default = "default_brand")]
    pub brand: String,

    /// Chat completion settings
    #[serde(default)]
    pub chat: ChatSettings,

    /// Conversation memory settings
    #[serde(default)]
    pub memory: MemorySettings,

    /// Index build and retrieval settings
    #[serde(default)]
    pub index: IndexSettings,

    /// Reasoning loop settings
    #[serde(default)]
    pub agent: AgentSettings,
}

fn default_brand() -> String {
    "Everlast Chile".into()
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("chat_base_url", &self.chat_base_url)
            .field("embeddings_base_url", &self.embeddings_base_url)
            .field("brand", &self.brand)
            .field("chat", &self.chat)
            .field("memory", &self.memory)
            .field("index", &self.index)
            .field("agent", &self.agent)
            .finish()
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    #[serde(default = "default_chat_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Retries after the first attempt (total attempts = retries + 1).
    #[serde(default = "default_retries")]
    pub retries: usize,

    #[serde(default = "default_chat_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_chat_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.5
}
fn default_max_tokens() -> u32 {
    800
}
fn default_top_p() -> f32 {
    0.9
}
fn default_retries() -> usize {
    2
}
fn default_chat_timeout_secs() -> u64 {
    30
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: default_chat_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            retries: default_retries(),
            timeout_secs: default_chat_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySettings {
    /// Messages surfaced to the model from the rolling buffer.
    #[serde(default = "default_memory_window")]
    pub window: usize,

    /// Per-message character cap for stored content.
    #[serde(default = "default_memory_max_chars")]
    pub max_message_chars: usize,

    /// History entries included when assembling a turn's context.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

fn default_memory_window() -> usize {
    8
}
fn default_memory_max_chars() -> usize {
    800
}
fn default_history_window() -> usize {
    6
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            window: default_memory_window(),
            max_message_chars: default_memory_max_chars(),
            history_window: default_history_window(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Directory holding the built index artifact.
    #[serde(default = "default_index_dir")]
    pub dir: PathBuf,

    /// Source document folder for `build-index`.
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,

    /// Document extension picked up by the recursive walk.
    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("data/index")
}
fn default_docs_dir() -> PathBuf {
    PathBuf::from("data/docs")
}
fn default_extension() -> String {
    "md".into()
}
fn default_chunk_size() -> usize {
    2000
}
fn default_chunk_overlap() -> usize {
    200
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            dir: default_index_dir(),
            docs_dir: default_docs_dir(),
            extension: default_extension(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            embedding_model: default_embedding_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Maximum reason-act iterations per turn.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// User input character cap before truncation.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,

    /// Tool observation character cap before truncation.
    #[serde(default = "default_max_tool_output_chars")]
    pub max_tool_output_chars: usize,
}

fn default_max_iterations() -> usize {
    2
}
fn default_max_input_chars() -> usize {
    500
}
fn default_max_tool_output_chars() -> usize {
    2000
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_input_chars: default_max_input_chars(),
            max_tool_output_chars: default_max_tool_output_chars(),
        }
    }
}

/// The three settings the remote endpoints require. Resolved once at
/// startup; absence is a startup error, never a mid-conversation surprise.
#[derive(Clone)]
pub struct RemoteSettings {
    pub api_key: String,
    pub chat_base_url: String,
    pub embeddings_base_url: String,
}

impl std::fmt::Debug for RemoteSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSettings")
            .field("api_key", &"[REDACTED]")
            .field("chat_base_url", &self.chat_base_url)
            .field("embeddings_base_url", &self.embeddings_base_url)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.cornerman/config.toml),
    /// then apply environment overrides:
    ///
    /// - `CORNERMAN_API_KEY` (fallback `GITHUB_TOKEN`)
    /// - `CORNERMAN_CHAT_URL` (fallback `OPENAI_BASE_URL`)
    /// - `CORNERMAN_EMBEDDINGS_URL` (fallback `OPENAI_EMBEDDINGS_URL`)
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path. A missing file yields
    /// the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if self.api_key.is_none() {
            self.api_key = std::env::var("CORNERMAN_API_KEY")
                .ok()
                .or_else(|| std::env::var("GITHUB_TOKEN").ok());
        }
        if self.chat_base_url.is_none() {
            self.chat_base_url = std::env::var("CORNERMAN_CHAT_URL")
                .ok()
                .or_else(|| std::env::var("OPENAI_BASE_URL").ok());
        }
        if self.embeddings_base_url.is_none() {
            self.embeddings_base_url = std::env::var("CORNERMAN_EMBEDDINGS_URL")
                .ok()
                .or_else(|| std::env::var("OPENAI_EMBEDDINGS_URL").ok());
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".cornerman")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.chat.temperature) {
            return Err(ConfigError::Validation(
                "chat.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.index.chunk_size == 0 {
            return Err(ConfigError::Validation(
                "index.chunk_size must be greater than 0".into(),
            ));
        }
        if self.index.chunk_overlap >= self.index.chunk_size {
            return Err(ConfigError::Validation(
                "index.chunk_overlap must be smaller than index.chunk_size".into(),
            ));
        }
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::Validation(
                "agent.max_iterations must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the required remote settings, failing with the name of the
    /// first missing one.
    pub fn remote(&self) -> Result<RemoteSettings, ConfigError> {
        let api_key = self
            .api_key
            .clone()
            .ok_or(ConfigError::MissingSetting("CORNERMAN_API_KEY"))?;
        let chat_base_url = self
            .chat_base_url
            .clone()
            .ok_or(ConfigError::MissingSetting("CORNERMAN_CHAT_URL"))?;
        let embeddings_base_url = self
            .embeddings_base_url
            .clone()
            .ok_or(ConfigError::MissingSetting("CORNERMAN_EMBEDDINGS_URL"))?;
        Ok(RemoteSettings {
            api_key,
            chat_base_url,
            embeddings_base_url,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            chat_base_url: None,
            embeddings_base_url: None,
            brand: default_brand(),
            chat: ChatSettings::default(),
            memory: MemorySettings::default(),
            index: IndexSettings::default(),
            agent: AgentSettings::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("failed to parse config file at {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("configuration validation failed: {0}")]
    Validation(String),

    #[error("missing required setting: {0} (set it in the environment or in config.toml)")]
    MissingSetting(&'static str),
}
