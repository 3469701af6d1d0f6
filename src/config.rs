use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const CONFIG_ENV: &str = "CASTBOT_CONFIG";

#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    discord: Option<DiscordConfig>,
    storage: StorageConfig,
    api: Option<ApiConfig>,
    #[serde(default)]
    ingest: IngestConfig,
    #[serde(default)]
    session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct DiscordConfig {
    token: String,
}

#[derive(Debug, Clone, Deserialize)]
struct StorageConfig {
    data_dir: String,
}

/// External role listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_headers")]
    pub headers: BTreeMap<String, String>,
    #[serde(default = "default_params")]
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_city")]
    pub default_city: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SessionConfig {
    #[serde(default = "default_session_ttl_secs")]
    ttl_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            default_city: default_city(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([("Content-Type".to_string(), "application/json".to_string())])
}

fn default_params() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("status".to_string(), "active".to_string()),
        ("limit".to_string(), "100".to_string()),
    ])
}

fn default_interval_secs() -> u64 {
    3600
}

fn default_city() -> String {
    "Moscow".to_string()
}

fn default_session_ttl_secs() -> u64 {
    24 * 60 * 60
}

#[derive(Debug, Clone)]
pub struct Config {
    discord_token: Option<String>,
    api: Option<ApiConfig>,
    pub data_dir: PathBuf,
    pub ingest: IngestConfig,
    pub session_ttl: Duration,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config_file: ConfigFile =
            toml::from_str(content).context("Failed to parse config file")?;
        anyhow::ensure!(
            config_file.ingest.interval_secs > 0,
            "ingest.interval_secs must be greater than zero"
        );
        anyhow::ensure!(
            config_file.session.ttl_secs > 0,
            "session.ttl_secs must be greater than zero"
        );

        Ok(Self {
            discord_token: config_file.discord.map(|d| d.token),
            api: config_file.api,
            data_dir: config_file.storage.data_dir.into(),
            ingest: config_file.ingest,
            session_ttl: Duration::from_secs(config_file.session.ttl_secs),
        })
    }

    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::from_file(&path)
    }

    pub fn discord_token(&self) -> Result<&str> {
        self.discord_token
            .as_deref()
            .context("Missing [discord] section with bot token in config")
    }

    pub fn api(&self) -> Result<&ApiConfig> {
        self.api
            .as_ref()
            .context("Missing [api] section with role listing URL in config")
    }
}
