//! ChatRelay configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RelayError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRelayConfig {
    /// Server name used as the source prefix of BATCH control lines.
    #[serde(default = "default_server_name")]
    pub server_name: String,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

fn default_server_name() -> String { "irc.example.org".into() }

impl Default for ChatRelayConfig {
    fn default() -> Self {
        Self {
            server_name: default_server_name(),
            scheduler: SchedulerConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl ChatRelayConfig {
    /// Load config from the default path (~/.chatrelay/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RelayError::Config(format!("Failed to read config: {e}")))?;
        Self::parse(&content)
    }

    /// Parse config from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| RelayError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the daemon cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.server_name.trim().is_empty() {
            return Err(RelayError::Config("server_name must not be empty".into()));
        }
        if self.scheduler.tick_ms == 0 {
            return Err(RelayError::Config("scheduler.tick_ms must be positive".into()));
        }
        if self.history.retention_every_ms < 0 {
            return Err(RelayError::Config(
                "history.retention_every_ms must not be negative".into(),
            ));
        }
        if self.history.hash_buckets == 0 {
            return Err(RelayError::Config("history.hash_buckets must be positive".into()));
        }
        Ok(())
    }

    /// Save config to the given path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| RelayError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the ChatRelay home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".chatrelay")
    }
}

/// Main loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Delay between two loop iterations; each iteration ticks the scheduler once.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_tick_ms() -> u64 { 250 }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { tick_ms: default_tick_ms() }
    }
}

/// History store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_backend")]
    pub backend: String,
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
    /// How often the retention task sweeps every target.
    #[serde(default = "default_retention_every_ms")]
    pub retention_every_ms: i64,
    #[serde(default = "default_hash_buckets")]
    pub hash_buckets: usize,
}

fn default_history_backend() -> String { "mem".into() }
fn default_max_lines() -> usize { 50 }
fn default_max_age_secs() -> u64 { 86_400 }
fn default_retention_every_ms() -> i64 { 60_000 }
fn default_hash_buckets() -> usize { 1019 }

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: default_history_backend(),
            max_lines: default_max_lines(),
            max_age_secs: default_max_age_secs(),
            retention_every_ms: default_retention_every_ms(),
            hash_buckets: default_hash_buckets(),
        }
    }
}
