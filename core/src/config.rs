//! Reconciler configuration.
//!
//! Stored as JSON at `~/.orphan-reaper/config.json`. Every field is
//! optional; missing fields take their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::WatchList;
use crate::error::{Error, Result};

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Extra command-line patterns to watch, on top of the built-in ones.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extra TCP ports to watch, on top of the built-in ones.
    #[serde(default)]
    pub ports: Vec<u16>,

    /// Wait after the graceful signal, in milliseconds.
    #[serde(default = "default_grace_period_ms", rename = "gracePeriodMs")]
    pub grace_period_ms: u64,

    /// Wait after the forced signal, in milliseconds.
    #[serde(default = "default_forced_grace_period_ms", rename = "forcedGracePeriodMs")]
    pub forced_grace_period_ms: u64,
}

fn default_grace_period_ms() -> u64 {
    500
}

fn default_forced_grace_period_ms() -> u64 {
    200
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            ports: Vec::new(),
            grace_period_ms: default_grace_period_ms(),
            forced_grace_period_ms: default_forced_grace_period_ms(),
        }
    }
}

impl ReconcilerConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    pub fn forced_grace_period(&self) -> Duration {
        Duration::from_millis(self.forced_grace_period_ms)
    }

    /// Register the configured patterns and ports into `watch`.
    pub fn apply(&self, watch: &WatchList) {
        for pattern in &self.patterns {
            watch.register_pattern(pattern);
        }
        for port in &self.ports {
            watch.register_port(*port);
        }
    }
}

/// Configuration store for reading and writing [`ReconcilerConfig`].
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.orphan-reaper/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        Ok(Self {
            config_path: home.join(".orphan-reaper").join("config.json"),
        })
    }

    /// Create a config store with a custom path.
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<ReconcilerConfig> {
        if !fs::try_exists(&self.config_path).await? {
            return Ok(ReconcilerConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist. Written to a temp
    /// file first, then renamed into place.
    pub async fn save(&self, config: &ReconcilerConfig) -> Result<()> {
        if let Some(config_dir) = self.config_path.parent() {
            fs::create_dir_all(config_dir)
                .await
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(config)?;
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }

    /// Persist an extra pattern. Returns `false` if it was already present.
    pub async fn add_pattern(&self, pattern: &str) -> Result<bool> {
        if pattern.trim().is_empty() {
            return Err(Error::Config("Pattern must not be blank".to_string()));
        }

        let mut config = self.load().await?;
        if config.patterns.iter().any(|p| p == pattern) {
            return Ok(false);
        }
        config.patterns.push(pattern.to_string());
        self.save(&config).await?;
        Ok(true)
    }

    /// Persist an extra port. Returns `false` if it was already present.
    pub async fn add_port(&self, port: u16) -> Result<bool> {
        if port == 0 {
            return Err(Error::Config("Port must be non-zero".to_string()));
        }

        let mut config = self.load().await?;
        if config.ports.contains(&port) {
            return Ok(false);
        }
        config.ports.push(port);
        self.save(&config).await?;
        Ok(true)
    }
}
