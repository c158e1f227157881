//! YAML configuration for the `bacon` tools.
//!
//! Every section and field has a default, so an empty document is a valid config.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::rules::{GameRules, RulesError};

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid rules: {0}")]
    Rules(#[from] RulesError),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub rules: GameRules,
    #[serde(default)]
    pub tournament: TournamentConfig,
    #[serde(default)]
    pub learn: LearnConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
}

/// Round-robin tournament settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TournamentConfig {
    /// Averaged win rate above which a comparison counts as a win (below `1 - margin`, a loss).
    #[serde(default = "default_tournament_margin")]
    pub margin: f64,
    /// Worker threads.
    #[serde(default = "default_tournament_threads")]
    pub threads: u32,
    /// Report progress every N comparisons.
    #[serde(default = "default_tournament_report_interval")]
    pub report_interval: u32,
}

fn default_tournament_margin() -> f64 {
    0.500001
}

fn default_tournament_threads() -> u32 {
    4
}

fn default_tournament_report_interval() -> u32 {
    100
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            margin: default_tournament_margin(),
            threads: default_tournament_threads(),
            report_interval: default_tournament_report_interval(),
        }
    }
}

/// Local-search improver settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LearnConfig {
    /// Focus cells to visit. `None` means one full sweep (`goal * goal`).
    #[serde(default)]
    pub rounds: Option<u64>,
    /// Print a progress line every N rounds.
    #[serde(default = "default_learn_announce_interval")]
    pub announce_interval: u64,
    /// Report the overall win rate (and checkpoint) every N rounds.
    #[serde(default = "default_learn_win_rate_interval")]
    pub win_rate_interval: u64,
}

fn default_learn_announce_interval() -> u64 {
    10
}

fn default_learn_win_rate_interval() -> u64 {
    100
}

impl Default for LearnConfig {
    fn default() -> Self {
        Self {
            rounds: None,
            announce_interval: default_learn_announce_interval(),
            win_rate_interval: default_learn_win_rate_interval(),
        }
    }
}

impl LearnConfig {
    pub fn rounds_for(&self, rules: &GameRules) -> u64 {
        self.rounds.unwrap_or(rules.cells() as u64)
    }
}

/// Monte-Carlo sampling settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SamplingConfig {
    #[serde(default = "default_sampling_samples")]
    pub samples: u64,
    #[serde(default)]
    pub seed: u64,
}

fn default_sampling_samples() -> u64 {
    200_000
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            samples: default_sampling_samples(),
            seed: 0,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to YAML string.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rules.validate()?;
        let m = self.tournament.margin;
        if !(0.5..1.0).contains(&m) {
            return Err(ConfigError::Invalid(format!(
                "tournament.margin must be in [0.5, 1.0) (got {m})"
            )));
        }
        if self.tournament.threads == 0 {
            return Err(ConfigError::Invalid(
                "tournament.threads must be >= 1".to_string(),
            ));
        }
        if self.tournament.report_interval == 0 {
            return Err(ConfigError::Invalid(
                "tournament.report_interval must be >= 1".to_string(),
            ));
        }
        if self.learn.announce_interval == 0 || self.learn.win_rate_interval == 0 {
            return Err(ConfigError::Invalid(
                "learn intervals must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}
