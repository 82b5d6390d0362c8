use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hangarbot_core::{CycleConfig, CycleConfigError, DrainDirection, LightSymbols};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON5 parse error: {0}")]
    Json5(#[from] json5::Error),
    #[error("Config directory not found")]
    NoDirFound,
    #[error("DISCORD_TOKEN is not set")]
    MissingToken,
    #[error("no status channel configured (set HANGAR_CHANNEL_ID or discord.channel_id)")]
    MissingChannelId,
    #[error("invalid cycle configuration: {0}")]
    InvalidCycle(#[from] CycleConfigError),
    #[error("updater.tick_interval_secs must be at least 1")]
    ZeroTickInterval,
}

/// Discord delivery settings.
///
/// The bot token is deliberately not part of the file format; it is
/// read from the `DISCORD_TOKEN` environment variable only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscordSettings {
    /// Channel that holds the status message. `HANGAR_CHANNEL_ID`
    /// overrides this when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
}

/// Cycle timing parameters as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleSettings {
    /// Instant the very first Closed phase began (RFC 3339).
    #[serde(default = "default_reference_epoch")]
    pub reference_epoch: DateTime<Utc>,
    #[serde(default = "default_closed_minutes")]
    pub closed_minutes: i64,
    #[serde(default = "default_open_minutes")]
    pub open_minutes: i64,
    #[serde(default = "default_restart_minutes")]
    pub restart_minutes: i64,
    /// Number of indicator lights in the row.
    #[serde(default = "default_light_count")]
    pub light_count: usize,
    /// Which end of the row drains first during the Open phase.
    #[serde(default)]
    pub drain: DrainDirection,
}

fn default_reference_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn default_closed_minutes() -> i64 {
    120
}

fn default_open_minutes() -> i64 {
    60
}

fn default_restart_minutes() -> i64 {
    5
}

fn default_light_count() -> usize {
    5
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            reference_epoch: default_reference_epoch(),
            closed_minutes: default_closed_minutes(),
            open_minutes: default_open_minutes(),
            restart_minutes: default_restart_minutes(),
            light_count: default_light_count(),
            drain: DrainDirection::default(),
        }
    }
}

impl CycleSettings {
    /// Convert the raw settings into a validated [`CycleConfig`].
    pub fn cycle_config(&self) -> Result<CycleConfig, ConfigError> {
        Ok(CycleConfig::new(
            self.reference_epoch,
            chrono::Duration::minutes(self.closed_minutes),
            chrono::Duration::minutes(self.open_minutes),
            chrono::Duration::minutes(self.restart_minutes),
            self.light_count,
            self.drain,
        )?)
    }
}

/// Liveness endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on. The `PORT` environment variable overrides.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl ServerConfig {
    /// Effective port after applying the `PORT` environment override.
    pub fn resolved_port(&self) -> u16 {
        resolve_port(self.port, std::env::var("PORT").ok().as_deref())
    }
}

fn resolve_port(configured: u16, env_port: Option<&str>) -> u16 {
    env_port
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(configured)
}

/// Update-loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdaterSettings {
    /// Seconds between status recomputations.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    /// Directory for `cycles.json` and `status.json`. Defaults to the
    /// config directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
}

fn default_tick_interval_secs() -> u64 {
    10
}

impl Default for UpdaterSettings {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            state_dir: None,
        }
    }
}

/// Top-level hangarbot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HangarConfig {
    #[serde(default)]
    pub discord: DiscordSettings,
    #[serde(default)]
    pub cycle: CycleSettings,
    #[serde(default)]
    pub lights: LightSymbols,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub updater: UpdaterSettings,
}

impl HangarConfig {
    /// Validate everything that must be rejected before the loop
    /// starts: cycle arithmetic inputs and the tick interval.
    pub fn validate(&self) -> Result<CycleConfig, ConfigError> {
        if self.updater.tick_interval_secs == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        self.cycle.cycle_config()
    }

    /// Directory holding the persisted cycle history and snapshot.
    pub fn state_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.updater.state_dir {
            Some(dir) => Ok(dir.clone()),
            None => config_dir(),
        }
    }
}

/// Credentials resolved from the environment at startup. Missing
/// values are fatal; the process must exit rather than run with a
/// silent default.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: String,
    pub channel_id: String,
}

impl Credentials {
    /// Read `DISCORD_TOKEN` and `HANGAR_CHANNEL_ID` from the
    /// environment, falling back to the config file for the channel.
    pub fn from_env(config: &HangarConfig) -> Result<Self, ConfigError> {
        resolve_credentials(
            std::env::var("DISCORD_TOKEN").ok(),
            std::env::var("HANGAR_CHANNEL_ID").ok(),
            config.discord.channel_id.clone(),
        )
    }
}

fn resolve_credentials(
    token: Option<String>,
    env_channel: Option<String>,
    file_channel: Option<String>,
) -> Result<Credentials, ConfigError> {
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or(ConfigError::MissingToken)?;
    let channel_id = env_channel
        .filter(|c| !c.is_empty())
        .or(file_channel)
        .filter(|c| !c.is_empty())
        .ok_or(ConfigError::MissingChannelId)?;
    Ok(Credentials { token, channel_id })
}

/// Resolve the hangarbot config directory (~/.hangarbot/).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|h| h.join(".hangarbot"))
        .ok_or(ConfigError::NoDirFound)
}

/// Resolve the config file path (~/.hangarbot/config.json5).
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.json5"))
}

/// Load configuration from the default path, falling back to defaults.
pub fn load_config() -> Result<HangarConfig, ConfigError> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let path = config_file_path()?;
    load_config_from(&path)
}

/// Load configuration from a specific path, falling back to defaults if not found.
pub fn load_config_from(path: &Path) -> Result<HangarConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("Config file not found at {}, using defaults", path.display());
        return Ok(HangarConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: HangarConfig = json5::from_str(&content)?;
    Ok(config)
}

/// Ensure the state directory exists.
pub fn ensure_state_dir(config: &HangarConfig) -> Result<PathBuf, ConfigError> {
    let dir = config.state_dir()?;
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}
