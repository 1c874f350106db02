//! DevBot configuration.
//!
//! Loaded from `~/.devbot/config.json` (or an explicit path). Every section
//! is `#[serde(default)]`, so a partial file only overrides what it names.
//! Environment variables are applied on top of the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DevbotError, Result};

/// Default relay endpoint. The prompt is appended as a single path segment.
pub const DEFAULT_RELAY_BASE_URL: &str = "https://api.i-as.dev/api/gemini";

/// Persona prefix sent ahead of every question.
pub const DEFAULT_PERSONA_PROMPT: &str =
    "You are DevBot, an AI assistant developed by I-As.Dev. Answer briefly and specifically.";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub resolver: ResolverConfig,
    pub provider: ProviderConfig,
    pub server: ServerConfig,
    pub history: HistoryConfig,
}

/// Where the answer store lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON store file.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("database.json"),
        }
    }
}

/// Cache policy for the answer resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Write freshly generated answers back to the store.
    pub persist_new_answers: bool,
    /// Minimum bigram similarity (0.0..=1.0) for a near-duplicate.
    pub similarity_threshold: f64,
    /// Minimum token overlap percentage (0.0..=100.0) for a near-duplicate.
    pub token_overlap_threshold: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            persist_new_answers: true,
            similarity_threshold: 0.90,
            token_overlap_threshold: 90.0,
        }
    }
}

/// Which answer provider to call on a cache miss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Plain GET relay returning `{"text": ...}`.
    #[default]
    Relay,
    /// Native Gemini `generateContent` API.
    Gemini,
}

impl std::str::FromStr for ProviderKind {
    type Err = DevbotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relay" => Ok(Self::Relay),
            "gemini" => Ok(Self::Gemini),
            other => Err(DevbotError::Config(format!(
                "Unknown provider '{}' (expected 'relay' or 'gemini')",
                other
            ))),
        }
    }
}

/// Answer provider settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Override for the provider endpoint.
    pub base_url: Option<String>,
    /// API key (Gemini only).
    pub api_key: Option<String>,
    /// Model name (Gemini only).
    pub model: Option<String>,
    /// Instruction prefix sent with every question.
    pub persona_prompt: String,
    /// Upper bound on a single generation call.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("persona_prompt", &self.persona_prompt)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Relay,
            base_url: None,
            api_key: None,
            model: None,
            persona_prompt: DEFAULT_PERSONA_PROMPT.to_string(),
            timeout_secs: 30,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Directory served as the static front end, if any.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: None,
        }
    }
}

/// In-memory conversation log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of inputs kept before the oldest is evicted.
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

impl Config {
    /// `~/.devbot`, or `./.devbot` when no home directory is known.
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".devbot")
    }

    /// Default config file location.
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::path())
    }

    /// Load from `path`, then apply environment overrides.
    ///
    /// A missing file yields defaults. A file that exists but cannot be
    /// parsed is an error.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str::<Config>(&raw).map_err(|e| {
                DevbotError::Config(format!("Invalid config at {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Config::default()
            }
            Err(e) => {
                return Err(DevbotError::Config(format!(
                    "Failed to read config at {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `DEVBOT_*` style overrides using `lookup` as the variable source.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get("DEVBOT_STORE_PATH") {
            self.store.path = PathBuf::from(path);
        }
        if let Some(raw) = get("DEVBOT_PERSIST_NEW_ANSWERS") {
            self.resolver.persist_new_answers = parse_bool(&raw).ok_or_else(|| {
                DevbotError::Config(format!(
                    "DEVBOT_PERSIST_NEW_ANSWERS must be a boolean, got '{}'",
                    raw
                ))
            })?;
        }
        if let Some(kind) = get("DEVBOT_PROVIDER") {
            self.provider.kind = kind.parse()?;
        }
        if let Some(url) = get("DEVBOT_PROVIDER_BASE_URL") {
            self.provider.base_url = Some(url);
        }
        if let Some(model) = get("DEVBOT_PROVIDER_MODEL") {
            self.provider.model = Some(model);
        }
        if self.provider.api_key.as_deref().map_or(true, str::is_empty) {
            if let Some(key) = get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")) {
                self.provider.api_key = Some(key);
            }
        }
        if let Some(bind) = get("DEVBOT_BIND") {
            self.server.bind = bind;
        }
        if let Some(raw) = get("PORT") {
            self.server.port = raw
                .trim()
                .parse()
                .map_err(|_| DevbotError::Config(format!("PORT must be a port number, got '{}'", raw)))?;
        }
        Ok(())
    }

    /// Reject values the resolver or server cannot work with.
    pub fn validate(&self) -> Result<()> {
        let r = &self.resolver;
        if !(0.0..=1.0).contains(&r.similarity_threshold) {
            return Err(DevbotError::Config(format!(
                "resolver.similarity_threshold must be within 0.0..=1.0, got {}",
                r.similarity_threshold
            )));
        }
        if !(0.0..=100.0).contains(&r.token_overlap_threshold) {
            return Err(DevbotError::Config(format!(
                "resolver.token_overlap_threshold must be within 0..=100, got {}",
                r.token_overlap_threshold
            )));
        }
        if self.provider.timeout_secs == 0 {
            return Err(DevbotError::Config(
                "provider.timeout_secs must be greater than zero".into(),
            ));
        }
        if self.history.capacity == 0 {
            return Err(DevbotError::Config(
                "history.capacity must be greater than zero".into(),
            ));
        }
        if self.store.path.as_os_str().is_empty() {
            return Err(DevbotError::Config("store.path must not be empty".into()));
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
