//! Process configuration, read once at start-up from the environment.
//!
//! Nothing here is consulted again after `Config::from_env` returns; the
//! resulting values are handed to the store, the AI dispatcher and the
//! router as plain immutable data.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_STATIC_DIR: &str = "frontend";
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown AI mode '{0}' (expected offline, openai or gemini)")]
    UnknownAiMode(String),
    #[error("unknown storage backend '{0}' (expected redis or memory)")]
    UnknownStorage(String),
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Which engine answers AI requests for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiMode {
    #[default]
    Offline,
    OpenAi,
    Gemini,
}

impl AiMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiMode::Offline => "offline",
            AiMode::OpenAi => "openai",
            AiMode::Gemini => "gemini",
        }
    }
}

impl fmt::Display for AiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "offline" | "mock" => Ok(AiMode::Offline),
            "openai" => Ok(AiMode::OpenAi),
            "gemini" => Ok(AiMode::Gemini),
            other => Err(ConfigError::UnknownAiMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Redis,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(StorageBackend::Redis),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::UnknownStorage(other.to_string())),
        }
    }
}

/// Connection details for one hosted provider.
#[derive(Clone, Default)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

// Keeps API keys out of logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<set>" })
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub mode: AiMode,
    pub openai: ProviderConfig,
    pub gemini: ProviderConfig,
    /// `None` leaves provider calls unbounded.
    pub request_timeout: Option<Duration>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            mode: AiMode::Offline,
            openai: ProviderConfig {
                api_key: String::new(),
                base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
                model: DEFAULT_OPENAI_MODEL.to_string(),
            },
            gemini: ProviderConfig {
                api_key: String::new(),
                base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
                model: DEFAULT_GEMINI_MODEL.to_string(),
            },
            request_timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub storage: StorageBackend,
    pub redis_url: String,
    pub static_dir: String,
    pub max_body_bytes: usize,
    pub ai: AiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            storage: StorageBackend::Redis,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            static_dir: DEFAULT_STATIC_DIR.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            ai: AiConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(addr) = var("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(port) = var("PORT") {
            let port: u16 = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value: port.clone(),
            })?;
            let host = config
                .bind_addr
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            config.bind_addr = format!("{host}:{port}");
        }
        if let Some(storage) = var("STORAGE_BACKEND") {
            config.storage = storage.parse()?;
        }
        if let Some(url) = var("REDIS_URL") {
            config.redis_url = url;
        }
        if let Some(dir) = var("STATIC_DIR") {
            config.static_dir = dir;
        }
        if let Some(bytes) = var("MAX_BODY_BYTES") {
            config.max_body_bytes = bytes.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "MAX_BODY_BYTES",
                value: bytes.clone(),
            })?;
        }

        if let Some(mode) = var("AI_MODE") {
            config.ai.mode = match mode.parse() {
                Ok(mode) => mode,
                Err(e) => {
                    warn!("{e}; using offline engine");
                    AiMode::Offline
                }
            };
        }
        if let Some(key) = var("OPENAI_API_KEY") {
            config.ai.openai.api_key = key;
        }
        if let Some(url) = var("OPENAI_BASE_URL") {
            config.ai.openai.base_url = url;
        }
        if let Some(model) = var("OPENAI_MODEL") {
            config.ai.openai.model = model;
        }
        if let Some(key) = var("GEMINI_API_KEY") {
            config.ai.gemini.api_key = key;
        }
        if let Some(url) = var("GEMINI_BASE_URL") {
            config.ai.gemini.base_url = url;
        }
        if let Some(model) = var("GEMINI_MODEL") {
            config.ai.gemini.model = model;
        }
        if let Some(secs) = var("AI_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "AI_REQUEST_TIMEOUT_SECS",
                value: secs.clone(),
            })?;
            config.ai.request_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}
