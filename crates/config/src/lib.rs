//! Configuration loading, validation, and management for SkyChat.
//!
//! Loads configuration from `~/.skychat/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.skychat/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Command routing and history window settings
    #[serde(default)]
    pub bot: BotConfig,

    /// Prompt template and character budget
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Chat completion backend
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Messages starting with this prefix are commands for the bot
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Channel names the bot answers in. Empty = all channels.
    #[serde(default = "default_channels")]
    pub channels: Vec<String>,

    /// How many recent messages are fetched for curation
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    /// Human lines echoed in this many bot messages are dropped from history
    #[serde(default = "default_message_limit")]
    pub message_limit: usize,

    /// Middle section used when a command carries no `(...)` override
    #[serde(default)]
    pub default_middle_section: String,

    /// The bot's own user ID, when known ahead of connecting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

fn default_prefix() -> String {
    "!sky".into()
}
fn default_channels() -> Vec<String> {
    vec!["bot-test".into(), "chat".into()]
}
fn default_context_window() -> usize {
    50
}
fn default_message_limit() -> usize {
    2
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            channels: default_channels(),
            context_window: default_context_window(),
            message_limit: default_message_limit(),
            default_middle_section: String::new(),
            user_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default)]
    pub prefix: String,

    #[serde(default)]
    pub suffix: String,

    /// Maximum characters for the base prompt plus curated history
    #[serde(default = "default_history_character_limit")]
    pub history_character_limit: usize,
}

fn default_history_character_limit() -> usize {
    10_000
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
            history_character_limit: default_history_character_limit(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Replies at or above this many characters are truncated
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,

    /// Model used for image generation, on the same endpoint and key
    #[serde(default = "default_image_model")]
    pub image_model: String,

    #[serde(default = "default_image_size")]
    pub image_size: String,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_http_timeout() -> u64 {
    45
}
fn default_max_message_length() -> usize {
    2000
}
fn default_image_model() -> String {
    "dall-e-3".into()
}
fn default_image_size() -> String {
    "1024x1024".into()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            http_timeout_secs: default_http_timeout(),
            max_message_length: default_max_message_length(),
            image_model: default_image_model(),
            image_size: default_image_size(),
        }
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("max_message_length", &self.max_message_length)
            .field("image_model", &self.image_model)
            .field("image_size", &self.image_size)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.skychat/config.toml),
    /// then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"))
    }

    /// Load from `path`, then apply environment overrides and validate.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path (no environment overrides).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Apply overrides using the legacy bot environment variable names.
    ///
    /// `lookup` returns the raw value for a variable name, which keeps this
    /// testable without touching the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prefix) = lookup("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }
        if let Some(channels) = lookup("BOT_CHANNELS") {
            self.bot.channels = parse_channel_list(&channels);
        }
        if let Some(value) = lookup("BOT_CONTEXT") {
            self.bot.context_window = parse_number("BOT_CONTEXT", &value)?;
        }
        if let Some(value) = lookup("BOT_MESSAGE_LIMIT") {
            self.bot.message_limit = parse_number("BOT_MESSAGE_LIMIT", &value)?;
        }
        if let Some(middle) = lookup("CHATGPT_USER_SPECIFIED_MIDDLE_SECTION") {
            self.bot.default_middle_section = middle;
        }
        if let Some(id) = lookup("BOT_USER_ID") {
            self.bot.user_id = Some(id);
        }
        if let Some(prefix) = lookup("CHATGPT_PROMPT_PREFIX") {
            self.prompt.prefix = prefix;
        }
        if let Some(suffix) = lookup("CHATGPT_PROMPT_SUFFIX") {
            self.prompt.suffix = suffix;
        }
        if let Some(value) = lookup("HISTORY_CHARACTER_LIMIT") {
            self.prompt.history_character_limit = parse_number("HISTORY_CHARACTER_LIMIT", &value)?;
        }
        if let Some(key) = lookup("CHATGPT_API_KEY") {
            self.chat.api_key = Some(key);
        }
        if let Some(model) = lookup("CHATGPT_MODEL") {
            self.chat.model = model;
        }
        if let Some(url) = lookup("CHATGPT_API_URL") {
            self.chat.api_url = url;
        }
        if let Some(value) = lookup("HTTP_TIMEOUT_SECONDS") {
            self.chat.http_timeout_secs = parse_number("HTTP_TIMEOUT_SECONDS", &value)?;
        }
        if let Some(model) = lookup("OPENAI_IMAGE_MODEL") {
            self.chat.image_model = model;
        }
        if let Some(size) = lookup("OPENAI_IMAGE_SIZE") {
            self.chat.image_size = size;
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".skychat")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefix.is_empty() {
            return Err(ConfigError::ValidationError(
                "bot.prefix must not be empty".into(),
            ));
        }
        if self.bot.context_window == 0 {
            return Err(ConfigError::ValidationError(
                "bot.context_window must be > 0".into(),
            ));
        }
        if self.bot.message_limit == 0 {
            return Err(ConfigError::ValidationError(
                "bot.message_limit must be > 0".into(),
            ));
        }
        if self.prompt.history_character_limit == 0 {
            return Err(ConfigError::ValidationError(
                "prompt.history_character_limit must be > 0".into(),
            ));
        }
        if self.chat.max_message_length < 4 {
            return Err(ConfigError::ValidationError(
                "chat.max_message_length must be at least 4".into(),
            ));
        }
        if self.chat.image_model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "chat.image_model must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.chat.api_key.is_some()
    }

    /// Render the configuration as TOML with secrets removed.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        let mut redacted = self.clone();
        redacted.chat.api_key = None;
        toml::to_string_pretty(&redacted)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))
    }
}

/// Parse a channel list given either as a JSON array or comma separated.
pub fn parse_channel_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if let Ok(list) = serde_json::from_str::<Vec<serde_json::Value>>(trimmed) {
        return list
            .iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .filter(|s| !s.is_empty())
            .collect();
    }
    trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_number<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::EnvError {
        var: var.to_string(),
        reason: format!("expected a non-negative integer, got {value:?}"),
    })
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

    #[error("Invalid value for environment variable {var}: {reason}")]
    EnvError { var: String, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Failed to serialize config: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bot.context_window, 50);
        assert_eq!(config.bot.message_limit, 2);
        assert_eq!(config.prompt.history_character_limit, 10_000);
        assert_eq!(config.bot.channels, vec!["bot-test", "chat"]);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.bot.prefix, config.bot.prefix);
        assert_eq!(parsed.chat.model, config.chat.model);
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.bot.prefix, "!sky");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[bot]
prefix = "!react"
context_window = 5

[prompt]
prefix = "You are "
suffix = ", respond to the following:"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.bot.prefix, "!react");
        assert_eq!(config.bot.context_window, 5);
        assert_eq!(config.bot.message_limit, 2);
        assert_eq!(config.prompt.suffix, ", respond to the following:");
        assert_eq!(config.chat.max_message_length, 2000);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[bot\nprefix = ").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env(&[
                ("BOT_PREFIX", "!test"),
                ("BOT_CHANNELS", "general, random"),
                ("BOT_CONTEXT", "20"),
                ("BOT_MESSAGE_LIMIT", "3"),
                ("CHATGPT_PROMPT_PREFIX", "You are "),
                ("CHATGPT_API_KEY", "sk-test"),
                ("CHATGPT_MODEL", "gpt-test"),
                ("OPENAI_IMAGE_MODEL", "gpt-image-1"),
                ("OPENAI_IMAGE_SIZE", "512x512"),
            ]))
            .unwrap();

        assert_eq!(config.bot.prefix, "!test");
        assert_eq!(config.bot.channels, vec!["general", "random"]);
        assert_eq!(config.bot.context_window, 20);
        assert_eq!(config.bot.message_limit, 3);
        assert_eq!(config.prompt.prefix, "You are ");
        assert!(config.has_api_key());
        assert_eq!(config.chat.model, "gpt-test");
        assert_eq!(config.chat.image_model, "gpt-image-1");
        assert_eq!(config.chat.image_size, "512x512");
    }

    #[test]
    fn image_settings_default() {
        let config = AppConfig::default();
        assert_eq!(config.chat.image_model, "dall-e-3");
        assert_eq!(config.chat.image_size, "1024x1024");

        let mut config = AppConfig::default();
        config.chat.image_model = " ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_numeric_env_value_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_overrides(env(&[("BOT_CONTEXT", "lots")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvError { ref var, .. } if var == "BOT_CONTEXT"));
    }

    #[test]
    fn channel_list_accepts_json_or_commas() {
        assert_eq!(parse_channel_list(r#"["a", "b"]"#), vec!["a", "b"]);
        assert_eq!(parse_channel_list("a,b,,c "), vec!["a", "b", "c"]);
        assert_eq!(parse_channel_list("solo"), vec!["solo"]);
        assert!(parse_channel_list("  ").is_empty());
    }

    #[test]
    fn zero_limits_rejected() {
        let mut config = AppConfig::default();
        config.bot.message_limit = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.prompt.history_character_limit = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.bot.prefix.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn api_key_redacted() {
        let mut config = AppConfig::default();
        config.chat.api_key = Some("sk-secret".into());
        assert!(!format!("{config:?}").contains("sk-secret"));
        let rendered = config.to_redacted_toml().unwrap();
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("image_model = \"dall-e-3\""));

        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert!(parsed.chat.api_key.is_none());
        assert_eq!(parsed.bot.prefix, "!sky");
    }
}
