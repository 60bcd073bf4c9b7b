//! Application configuration.
//!
//! Loaded once from TOML at startup, validated, then passed by value
//! into the component constructors. Nothing reads configuration
//! ambiently after that.

use crate::error::{AppError, AppResult};
use cadence_engine::LegPolicy;
use cadence_exchange::PaperConfig;
use cadence_strategy::StrategyConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for the bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Cycle period in milliseconds; also the trailing execution
    /// window.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Hold duration in milliseconds. Defaults to the cycle interval.
    #[serde(default)]
    pub dwell_ms: Option<u64>,

    /// Collateral gauge period in milliseconds.
    #[serde(default = "default_telemetry_interval_ms")]
    pub telemetry_interval_ms: u64,

    /// Sibling behavior when one leg fails.
    #[serde(default)]
    pub leg_policy: LegPolicy,

    /// Quote calculator parameters.
    #[serde(default)]
    pub strategy: StrategyConfig,

    /// Paper exchange parameters.
    #[serde(default)]
    pub paper: PaperConfig,
}

fn default_interval_ms() -> u64 {
    15_000
}

fn default_telemetry_interval_ms() -> u64 {
    60_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            dwell_ms: None,
            telemetry_interval_ms: default_telemetry_interval_ms(),
            leg_policy: LegPolicy::default(),
            strategy: StrategyConfig::default(),
            paper: PaperConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config {path}: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config {path}: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration: an explicit path must load; the default
    /// path is optional and falls back to built-in defaults.
    pub fn load(explicit: Option<&str>, fallback: &str) -> AppResult<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(fallback).exists() => Self::from_file(fallback),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.interval_ms == 0 {
            return Err(AppError::Config("interval_ms must be positive".to_string()));
        }
        if self.telemetry_interval_ms == 0 {
            return Err(AppError::Config(
                "telemetry_interval_ms must be positive".to_string(),
            ));
        }
        if self.dwell_ms == Some(0) {
            return Err(AppError::Config("dwell_ms must be positive".to_string()));
        }
        self.strategy.validate()?;
        Ok(())
    }

    /// Cycle period.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Hold duration: explicit `dwell_ms` or the cycle interval.
    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms.unwrap_or(self.interval_ms))
    }

    pub fn telemetry_interval(&self) -> Duration {
        Duration::from_millis(self.telemetry_interval_ms)
    }
}
