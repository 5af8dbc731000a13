// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, time::Duration};

/// Period between two location reports of a tracking session.
pub const DEFAULT_REPORT_PERIOD_MS: u64 = 5000;

/// Period between two polls of the bus locations.
pub const DEFAULT_POLL_PERIOD_MS: u64 = 5000;

/// Runtime configuration of the tracker.
///
/// Every field has a default, so a configuration file only has to contain
/// the values that differ.
///
/// # Example
///
/// ```rust
/// use common::config::TrackerConfig;
///
/// let config = TrackerConfig::from_json(r#"{ "report_period_ms": 1000 }"#).unwrap();
/// assert_eq!(config.report_period_ms, 1000);
/// assert_eq!(config.poll_period_ms, 5000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Base URL of the bus tracking server, e.g. `http://127.0.0.1:8000`.
    pub server_url: String,
    pub report_period_ms: u64,
    pub poll_period_ms: u64,
    /// Address of the gpsd daemon used as geolocation source.
    pub gpsd_address: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            server_url: "http://127.0.0.1:8000".to_string(),
            report_period_ms: DEFAULT_REPORT_PERIOD_MS,
            poll_period_ms: DEFAULT_POLL_PERIOD_MS,
            gpsd_address: "127.0.0.1:2947".to_string(),
        }
    }
}

impl TrackerConfig {
    /// Parses and validates a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: TrackerConfig = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the configuration file at `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json(&json)
    }

    /// Checks the values that can't be expressed through the types.
    ///
    /// Periods must be non zero, a timer can't fire with a zero interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report_period_ms == 0 {
            return Err(ConfigError::InvalidValue("report_period_ms must be > 0"));
        }
        if self.poll_period_ms == 0 {
            return Err(ConfigError::InvalidValue("poll_period_ms must be > 0"));
        }
        if self.server_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue("server_url must not be empty"));
        }
        Ok(())
    }

    pub fn report_period(&self) -> Duration {
        Duration::from_millis(self.report_period_ms)
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.poll_period_ms)
    }
}

/// Errors raised while loading a [`TrackerConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    InvalidValue(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read configuration. Error: {e}"),
            ConfigError::Parse(e) => write!(f, "Failed to parse configuration. Error: {e}"),
            ConfigError::InvalidValue(reason) => write!(f, "Invalid configuration: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::InvalidValue(_) => None,
        }
    }
}
