// Configuration type definitions

use std::time::Duration;

use serde::Deserialize;

use crate::throttle::DEFAULT_THROTTLE_MS;

/// Report format for scenario replays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Throttle configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct ThrottleConfig {
    #[serde(default = "default_throttle_ms")]
    pub default_ms: u64,
}

fn default_throttle_ms() -> u64 {
    DEFAULT_THROTTLE_MS
}

impl ThrottleConfig {
    pub fn default_interval(&self) -> Duration {
        Duration::from_millis(self.default_ms)
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        ThrottleConfig {
            default_ms: DEFAULT_THROTTLE_MS,
        }
    }
}

/// Replay configuration section
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ReplayConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
