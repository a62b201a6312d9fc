//! Session results storage and reporting

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Result of a single game, from White's side of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    #[serde(rename = "1-0")]
    WhiteWins,
    #[serde(rename = "0-1")]
    BlackWins,
    #[serde(rename = "1/2-1/2")]
    Draw,
}

/// Why a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Checkmate,
    Stalemate,
    FiftyMoveRule,
    InsufficientMaterial,
    Repetition,
    PlyLimit,
    /// The side to move returned no move, or an illegal one
    Forfeit,
}

/// One finished game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// 1-based game number within the session
    pub game: u32,
    pub white: String,
    pub black: String,
    /// True when the session's first player had White
    pub first_is_white: bool,
    pub result: GameResult,
    pub termination: Termination,
    pub plies: u32,
    /// Moves in coordinate notation
    pub moves: Vec<String>,
}

/// Complete session results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub first: String,
    pub second: String,
    pub first_wins: u32,
    pub second_wins: u32,
    pub draws: u32,
    pub games: Vec<GameRecord>,
}

impl SessionReport {
    pub fn new(first: &str, second: &str) -> Self {
        Self {
            first: first.to_string(),
            second: second.to_string(),
            ..Self::default()
        }
    }

    /// Add a game and update the totals
    pub fn add_game(&mut self, record: GameRecord) {
        match (record.result, record.first_is_white) {
            (GameResult::Draw, _) => self.draws += 1,
            (GameResult::WhiteWins, true) | (GameResult::BlackWins, false) => self.first_wins += 1,
            _ => self.second_wins += 1,
        }
        self.games.push(record);
    }

    pub fn total_games(&self) -> u32 {
        self.games.len() as u32
    }

    /// Score from the first player's side (1 per win, 0.5 per draw)
    pub fn first_score(&self) -> f64 {
        let total = self.total_games();
        if total == 0 {
            return 0.5;
        }
        (self.first_wins as f64 + 0.5 * self.draws as f64) / total as f64
    }

    /// Save results to a JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Load results from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Generate a text report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();
        report.push_str(&format!("=== Self-play: {} vs {} ===\n\n", self.first, self.second));
        report.push_str(&format!(
            "{:>4} {:<12} {:<12} {:>8} {:<22} {:>6}\n",
            "Game", "White", "Black", "Result", "Termination", "Plies"
        ));
        report.push_str(&"-".repeat(70));
        report.push('\n');

        for game in &self.games {
            let result = match game.result {
                GameResult::WhiteWins => "1-0",
                GameResult::BlackWins => "0-1",
                GameResult::Draw => "1/2-1/2",
            };
            report.push_str(&format!(
                "{:>4} {:<12} {:<12} {:>8} {:<22} {:>6}\n",
                game.game,
                game.white,
                game.black,
                result,
                format!("{:?}", game.termination),
                game.plies
            ));
        }

        report.push_str(&format!(
            "\n{}: {} wins, {} losses, {} draws ({:.1}%)\n",
            self.first,
            self.first_wins,
            self.second_wins,
            self.draws,
            self.first_score() * 100.0
        ));
        report
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod report_tests;
