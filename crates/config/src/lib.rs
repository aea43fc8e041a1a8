//! Configuration loading, validation, and management for chatbridge.
//!
//! Loads configuration from `~/.chatbridge/config.toml` (or the file named by
//! `CHATBRIDGE_CONFIG`) with environment variable overrides. Validates all
//! settings at startup.

use chatbridge_core::GenerationParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.chatbridge/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Conversation history configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Remote text-generation configuration
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Keyword table and canned replies
    #[serde(default)]
    pub responder: ResponderConfig,
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    5000
}
fn default_host() -> String {
    "0.0.0.0".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Exchanges kept per user; older ones are evicted first.
    #[serde(default = "default_max_exchanges")]
    pub max_exchanges: usize,
}

fn default_max_exchanges() -> usize {
    10
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_exchanges: default_max_exchanges(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Bearer token for the inference API. Usually supplied via `HF_TOKEN`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Target-language model, tried first.
    #[serde(default = "default_primary_url")]
    pub primary_url: String,

    /// General-purpose model, tried when the primary yields nothing.
    #[serde(default = "default_secondary_url")]
    pub secondary_url: String,

    /// Upper bound per attempt, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_length")]
    pub max_length: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Prompt wrapped around the user's message; `{message}` is substituted.
    #[serde(default = "default_prompt_template")]
    pub prompt_template: String,

    /// Ordered replacements applied to the secondary model's output.
    /// Omit to use the built-in lexicon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitutions: Option<Vec<SubstitutionConfig>>,
}

fn default_primary_url() -> String {
    "https://api-inference.huggingface.co/models/rinna/japanese-gpt-neox-3.6b-instruction-sft"
        .into()
}
fn default_secondary_url() -> String {
    "https://api-inference.huggingface.co/models/microsoft/DialoGPT-medium".into()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_max_length() -> u32 {
    100
}
fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    0.9
}
fn default_prompt_template() -> String {
    "ユーザー: {message}\nAI: ".into()
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            primary_url: default_primary_url(),
            secondary_url: default_secondary_url(),
            timeout_secs: default_timeout_secs(),
            max_length: default_max_length(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            prompt_template: default_prompt_template(),
            substitutions: None,
        }
    }
}

impl std::fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("api_token", &redact(&self.api_token))
            .field("primary_url", &self.primary_url)
            .field("secondary_url", &self.secondary_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_length", &self.max_length)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("prompt_template", &self.prompt_template)
            .field("substitutions", &self.substitutions)
            .finish()
    }
}

impl InferenceConfig {
    /// Sampling parameters for every generation request.
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_length: self.max_length,
            temperature: self.temperature,
            top_p: self.top_p,
            do_sample: true,
        }
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

/// One `from → to` replacement pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionConfig {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponderConfig {
    /// Keyword rules in match order. Omit to use the built-in table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<KeywordConfig>>,

    /// Last-resort replies. Omit to use the built-in pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canned: Option<Vec<String>>,
}

/// A keyword rule: any message containing `key` (case-insensitively) gets
/// `reply`. `{time}` and `{date}` in the reply are filled in at match time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordConfig {
    pub key: String,
    pub reply: String,
}

impl AppConfig {
    /// Load configuration from `CHATBRIDGE_CONFIG` or the default path
    /// (`~/.chatbridge/config.toml`), then apply environment overrides:
    /// - `HF_TOKEN` — inference bearer token
    /// - `PORT` — listen port
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = std::env::var("CHATBRIDGE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::config_dir().join("config.toml"));
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`, so tests don't have to
    /// mutate the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("HF_TOKEN").filter(|t| !t.trim().is_empty()) {
            self.inference.api_token = Some(token);
        }

        if let Some(port) = lookup("PORT") {
            self.gateway.port = port.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("PORT must be a port number, got '{port}'"))
            })?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".chatbridge")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let inference = &self.inference;

        if !(0.0..=2.0).contains(&inference.temperature) {
            return Err(ConfigError::ValidationError(
                "inference.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if inference.top_p <= 0.0 || inference.top_p > 1.0 {
            return Err(ConfigError::ValidationError(
                "inference.top_p must be in (0.0, 1.0]".into(),
            ));
        }

        if inference.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "inference.timeout_secs must be at least 1".into(),
            ));
        }

        if !inference.prompt_template.contains("{message}") {
            return Err(ConfigError::ValidationError(
                "inference.prompt_template must contain {message}".into(),
            ));
        }

        if self.history.max_exchanges == 0 {
            return Err(ConfigError::ValidationError(
                "history.max_exchanges must be at least 1".into(),
            ));
        }

        if let Some(keywords) = &self.responder.keywords {
            if keywords.iter().any(|k| k.key.is_empty()) {
                return Err(ConfigError::ValidationError(
                    "responder.keywords entries need a non-empty key".into(),
                ));
            }
        }

        Ok(())
    }

    /// Check if an inference token is available (from config or environment).
    pub fn has_api_token(&self) -> bool {
        self.inference.api_token.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
