//! Session configuration, read from TOML

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

/// Configuration for a self-play session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfPlayConfig {
    /// Number of games to play
    pub games: u32,
    /// Half-moves after which a game is adjudicated a draw
    pub max_plies: u32,
    /// Whether to alternate colors each game
    pub alternate_colors: bool,
    /// Difficulty of the learning side (1-20)
    pub first_difficulty: u8,
    /// Difficulty of its opponent (1-20)
    pub second_difficulty: u8,
    /// Depth cap on top of what the difficulty allows
    pub max_depth: u8,
    /// Time cap per move in milliseconds, on top of the difficulty budget
    pub move_time_ms: Option<u64>,
    /// Engine config for the learning side; defaults when absent
    pub engine_config: Option<PathBuf>,
    /// Engine config for the opponent; the learning side's config without a
    /// learning store when absent
    pub opponent_config: Option<PathBuf>,
    /// Where the session report is written
    pub report_path: Option<PathBuf>,
    /// Initialization attempts before falling back to random play
    pub init_attempts: u32,
    pub init_backoff_ms: u64,
    /// Seed for the random fallback player
    pub seed: Option<u64>,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            games: 10,
            max_plies: 300,
            alternate_colors: true,
            first_difficulty: 10,
            second_difficulty: 10,
            max_depth: 20,
            move_time_ms: None,
            engine_config: None,
            opponent_config: None,
            report_path: Some(PathBuf::from("selfplay_report.json")),
            init_attempts: 3,
            init_backoff_ms: 100,
            seed: None,
        }
    }
}

impl SelfPlayConfig {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text).context("Failed to parse self-play config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.max_plies > 0, "max_plies must be positive");
        ensure!(self.max_depth > 0, "max_depth must be positive");
        ensure!(
            (1..=20).contains(&self.first_difficulty) && (1..=20).contains(&self.second_difficulty),
            "difficulties must be within 1..=20"
        );
        Ok(())
    }

    pub fn move_time(&self) -> Option<Duration> {
        self.move_time_ms.map(Duration::from_millis)
    }

    pub fn init_backoff(&self) -> Duration {
        Duration::from_millis(self.init_backoff_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
