// src/config.rs

//! Manages server configuration: loading, defaulting, and validation.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// A raw representation of the config file before validation.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default = "default_max_clients")]
    max_clients: usize,
    #[serde(with = "humantime_serde", default = "default_idle_timeout")]
    idle_timeout: Duration,
    #[serde(default)]
    storage: StorageConfig,
    #[serde(default)]
    roster: RosterConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    6969
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_max_clients() -> usize {
    1024
}
fn default_idle_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Settings for the per-device record files.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_dir")]
    pub dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

fn default_storage_dir() -> String {
    "fenceline_data".to_string()
}

/// Settings for the persisted known-client roster.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RosterConfig {
    /// Roster file path. Defaults to `known_clients.json` inside the storage dir.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(with = "humantime_serde", default = "default_roster_save_interval")]
    pub save_interval: Duration,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            path: None,
            save_interval: default_roster_save_interval(),
        }
    }
}

fn default_roster_save_interval() -> Duration {
    Duration::from_secs(60)
}

/// Represents the final, validated server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub max_clients: usize,
    #[serde(with = "humantime_serde")]
    pub idle_timeout: Duration,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub roster: RosterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            max_clients: default_max_clients(),
            idle_timeout: default_idle_timeout(),
            storage: StorageConfig::default(),
            roster: RosterConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance by reading and parsing a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        let raw_config: RawConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML from '{path}'"))?;

        let config = Config {
            host: raw_config.host,
            port: raw_config.port,
            log_level: raw_config.log_level,
            max_clients: raw_config.max_clients,
            idle_timeout: raw_config.idle_timeout,
            storage: raw_config.storage,
            roster: raw_config.roster,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the resolved configuration to ensure logical consistency.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("port cannot be 0"));
        }
        if self.host.trim().is_empty() {
            return Err(anyhow!("host cannot be empty"));
        }
        if self.max_clients == 0 {
            return Err(anyhow!("max_clients cannot be 0"));
        }
        if self.idle_timeout.is_zero() {
            return Err(anyhow!("idle_timeout cannot be 0"));
        }
        if self.storage.dir.trim().is_empty() {
            return Err(anyhow!("storage.dir cannot be empty"));
        }
        if self.roster.save_interval.is_zero() {
            return Err(anyhow!("roster.save_interval cannot be 0"));
        }
        if let Some(path) = &self.roster.path
            && path.trim().is_empty()
        {
            return Err(anyhow!("roster.path cannot be empty when set"));
        }
        Ok(())
    }

    /// The resolved roster file path.
    pub fn roster_path(&self) -> PathBuf {
        match &self.roster.path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(&self.storage.dir).join("known_clients.json"),
        }
    }
}
