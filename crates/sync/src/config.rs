// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync engine configuration.
//!
//! Configuration is read from `hearth.toml` in the state directory. Every
//! field has a default, so a missing file or an empty file both yield
//! [`SyncConfig::default`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use hearth_core::DEFAULT_MAX_ATTEMPTS;

use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "hearth.toml";

/// Tunables for the sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Retry budget for operations enqueued without an explicit one (default: 3).
    pub default_max_attempts: u32,
    /// Seconds between periodic flush attempts (default: 30). 0 = disabled.
    pub flush_interval_secs: u64,
    /// Buffered events per subscriber before it starts lagging (default: 256).
    pub event_capacity: usize,
    /// Node id embedded in operation ids (default: 1).
    pub node_id: u32,
    /// Persist after every delivery outcome instead of once per cycle.
    ///
    /// Off by default: a crash mid-cycle then redelivers operations that had
    /// already succeeded, which the remote deduplicates by id.
    pub checkpoint_each_delivery: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            default_max_attempts: DEFAULT_MAX_ATTEMPTS,
            flush_interval_secs: 30,
            event_capacity: 256,
            node_id: 1,
            checkpoint_each_delivery: false,
        }
    }
}

impl SyncConfig {
    /// Loads `hearth.toml` from `dir`, falling back to defaults if absent.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Ok(SyncConfig::default());
        }
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        Self::parse(&content)
    }

    /// Parses and validates a TOML document.
    pub fn parse(content: &str) -> Result<Self> {
        let config: SyncConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to `dir/hearth.toml`.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(dir.join(CONFIG_FILE_NAME), content)
            .map_err(|e| Error::Config(format!("failed to write config: {}", e)))?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.default_max_attempts == 0 {
            return Err(Error::Config(
                "default_max_attempts must be at least 1".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(Error::Config("event_capacity must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Period of the background flush task, or `None` when disabled.
    pub fn flush_interval(&self) -> Option<Duration> {
        (self.flush_interval_secs > 0).then(|| Duration::from_secs(self.flush_interval_secs))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
