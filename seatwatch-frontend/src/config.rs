use anyhow::Context;
use seatwatch_backend::obs::ObsEndpoints;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token; `TELEGRAM_TOKEN` overrides it
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Long-poll timeout for getUpdates, in seconds
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout_secs() -> u64 {
    30
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_api_url(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_health_enable")]
    pub enable: bool,

    #[serde(default = "default_host")]
    pub host: String,

    /// `PORT` overrides it
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_health_enable() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enable: default_health_enable(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl HealthConfig {
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Rolled log files older than this are deleted
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u64,

    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub health: HealthConfig,

    #[serde(default)]
    pub obs: ObsEndpoints,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_log_retention_days() -> u64 {
    3
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            log_retention_days: default_log_retention_days(),
            telegram: TelegramConfig::default(),
            health: HealthConfig::default(),
            obs: ObsEndpoints::default(),
        }
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No config file; built-in defaults plus environment
    Defaults,
}

pub static CONFIG: OnceLock<BotConfig> = OnceLock::new();

impl BotConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: BotConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Apply `TELEGRAM_TOKEN` / `PORT` style overrides
    pub fn apply_overrides(&mut self, token: Option<String>, port: Option<String>) -> anyhow::Result<()> {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.telegram.token = Some(token.trim().to_string());
        }
        if let Some(port) = port {
            self.health.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {}", port))?;
        }
        Ok(())
    }

    /// Token that must be present before the bot can start
    pub fn telegram_token(&self) -> anyhow::Result<&str> {
        self.telegram
            .token
            .as_deref()
            .context("No Telegram token: set TELEGRAM_TOKEN or telegram.token in config.toml")
    }
}

/// Load `path` (if it exists) plus environment overrides into [`CONFIG`]
pub fn read_config(path: impl AsRef<Path>) -> anyhow::Result<ConfigSource> {
    let path = path.as_ref();
    let (mut config, source) = if path.exists() {
        (BotConfig::from_file(path)?, ConfigSource::File(path.to_path_buf()))
    } else {
        (BotConfig::default(), ConfigSource::Defaults)
    };

    config.apply_overrides(std::env::var("TELEGRAM_TOKEN").ok(), std::env::var("PORT").ok())?;

    CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("configuration already loaded"))?;
    Ok(source)
}
