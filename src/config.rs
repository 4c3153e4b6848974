//! Application configuration loading and validation.
//!
//! Settings come from a TOML file (`spoopaboot.toml`) with environment
//! overrides for the backend contract values, plus a separate [`Secrets`]
//! struct populated only from the environment (the deployment injects
//! these from a Secret). Everything is validated eagerly at load and never
//! mutated afterwards.
//!
//! # Example
//!
//! ```no_run
//! use spoopaboot::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("spoopaboot.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

use crate::backend::{BindAddr, KeepAlive, DEFAULT_BACKEND_PORT};
use crate::error::{ConfigError, Result};
use crate::gate::GateConfig;

/// Template written by `spoopaboot config init`.
pub const CONFIG_TEMPLATE: &str = include_str!("config_template.toml");

/// Main application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Model backend target and environment contract.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Readiness gate timing.
    #[serde(default)]
    pub gate: GateSettings,

    /// Bot process settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The model backend as seen from the bot's side of the deployment.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Service name the gate connects to.
    #[serde(default = "default_backend_host")]
    pub host: String,

    /// Inference port.
    #[serde(default = "default_backend_port")]
    pub port: u16,

    /// Keep-alive duration the backend container should run with.
    /// Overridden by `OLLAMA_KEEP_ALIVE` when set.
    #[serde(default)]
    pub keep_alive: Option<KeepAlive>,

    /// Bind address the backend container should run with.
    /// Overridden by `OLLAMA_HOST` when set.
    #[serde(default)]
    pub bind_addr: Option<BindAddr>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: default_backend_host(),
            port: default_backend_port(),
            keep_alive: None,
            bind_addr: None,
        }
    }
}

fn default_backend_host() -> String {
    "ollama".to_string()
}

fn default_backend_port() -> u16 {
    DEFAULT_BACKEND_PORT
}

/// Readiness gate timing, in whole seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateSettings {
    /// Pause between failed probes.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Overall wait budget. Must be nonzero; the gate always fails loudly
    /// instead of waiting forever.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,

    /// Cutoff for a single connect attempt.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Optional hard cap on probe count.
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            deadline_secs: default_deadline_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_attempts: None,
        }
    }
}

// The original init container polled every 2 seconds.
fn default_interval_secs() -> u64 {
    2
}

fn default_deadline_secs() -> u64 {
    300
}

fn default_connect_timeout_secs() -> u64 {
    5
}

/// Bot process settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Mounted cache volume holding the opaque OAuth token cache.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Bot executable to launch after the gate opens.
    #[serde(default)]
    pub command: Option<String>,

    /// Arguments for the bot executable.
    #[serde(default)]
    pub args: Vec<String>,

    /// Optional URL to GET periodically while the bot runs.
    #[serde(default)]
    pub ping_url: Option<String>,

    /// Ping cadence in seconds.
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            command: None,
            args: Vec::new(),
            ping_url: None,
            ping_interval_secs: default_ping_interval_secs(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("/cache")
}

fn default_ping_interval_secs() -> u64 {
    60
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: "pretty" or "json".
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, apply environment overrides,
    /// and validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from TOML text, apply environment overrides,
    /// and validate.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load defaults when no config file is present, still honoring
    /// environment overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            let mut config = Config::default();
            config.apply_env_overrides()?;
            config.validate()?;
            Ok(config)
        }
    }

    /// Pull the backend env contract values out of the process environment.
    ///
    /// These are the same variables the backend container itself consumes,
    /// so a value that fails to parse here would also break the backend.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(raw) = std::env::var("OLLAMA_KEEP_ALIVE") {
            self.backend.keep_alive = Some(raw.parse::<KeepAlive>()?);
        }
        if let Ok(raw) = std::env::var("OLLAMA_HOST") {
            self.backend.bind_addr = Some(raw.parse::<BindAddr>()?);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.backend.host.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "backend.host",
                reason: "cannot be empty".into(),
            }
            .into());
        }
        if self.backend.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "backend.port",
                reason: "cannot be zero".into(),
            }
            .into());
        }
        if self.gate.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "gate.interval_secs",
                reason: "cannot be zero".into(),
            }
            .into());
        }
        if self.gate.deadline_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "gate.deadline_secs",
                reason: "cannot be zero; the gate never waits unbounded".into(),
            }
            .into());
        }
        if self.gate.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "gate.connect_timeout_secs",
                reason: "cannot be zero".into(),
            }
            .into());
        }
        if self.gate.max_attempts == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "gate.max_attempts",
                reason: "cannot be zero".into(),
            }
            .into());
        }
        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            other => {
                return Err(ConfigError::InvalidValue {
                    field: "logging.format",
                    reason: format!("'{other}' is not one of: pretty, json"),
                }
                .into());
            }
        }
        if let Some(url) = &self.bot.ping_url {
            Url::parse(url).map_err(|e| ConfigError::InvalidValue {
                field: "bot.ping_url",
                reason: e.to_string(),
            })?;
        }
        if self.bot.ping_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "bot.ping_interval_secs",
                reason: "cannot be zero".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Gate parameters derived from this configuration.
    pub fn gate_config(&self) -> GateConfig {
        GateConfig {
            host: self.backend.host.clone(),
            port: self.backend.port,
            interval: Duration::from_secs(self.gate.interval_secs),
            deadline: Duration::from_secs(self.gate.deadline_secs),
            connect_timeout: Duration::from_secs(self.gate.connect_timeout_secs),
            max_attempts: self.gate.max_attempts,
        }
    }

    pub fn init_logging(&self) {
        self.logging.init();
    }
}

/// Required secret environment variables, in the order they are reported.
pub const REQUIRED_SECRETS: [&str; 6] = [
    "DISCORD_TOKEN",
    "SPOTIFY_USERNAME",
    "SPOTIFY_CLIENT_ID",
    "SPOTIFY_CLIENT_SECRET",
    "SPOTIFY_REDIRECT_URI",
    "SPOTIFY_PLAYLIST_ID",
];

/// Credentials injected into the pod environment from the deployment's
/// Secret. Values are opaque to spoopaboot and are never logged.
#[derive(Clone)]
pub struct Secrets {
    pub discord_token: String,
    pub spotify_username: String,
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_redirect_uri: String,
    pub spotify_playlist_id: String,
    /// Optional seed content for the OAuth token cache file.
    pub token_cache: Option<String>,
}

// Manual Debug that never exposes secret values.
impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("spotify_username", &self.spotify_username)
            .field("token_cache", &self.token_cache.is_some())
            .finish_non_exhaustive()
    }
}

impl Secrets {
    /// Read all secrets from the environment, failing on the first
    /// missing required variable.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            discord_token: require_env("DISCORD_TOKEN")?,
            spotify_username: require_env("SPOTIFY_USERNAME")?,
            spotify_client_id: require_env("SPOTIFY_CLIENT_ID")?,
            spotify_client_secret: require_env("SPOTIFY_CLIENT_SECRET")?,
            spotify_redirect_uri: require_env("SPOTIFY_REDIRECT_URI")?,
            spotify_playlist_id: require_env("SPOTIFY_PLAYLIST_ID")?,
            token_cache: std::env::var("TOKEN_CACHE").ok().filter(|v| !v.is_empty()),
        })
    }

    /// Names of required secrets absent from the environment.
    ///
    /// Unlike [`Secrets::from_env`] this collects every missing name, for
    /// diagnostics that should report the full picture at once.
    pub fn missing_from_env() -> Vec<&'static str> {
        REQUIRED_SECRETS
            .iter()
            .copied()
            .filter(|name| match std::env::var(name) {
                Ok(value) => value.is_empty(),
                Err(_) => true,
            })
            .collect()
    }
}

fn require_env(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv { name }.into()),
    }
}
