//! Adaptive learning from finished games.
//!
//! During a game the engine records the keys of positions it had to move in
//! and the opening positions its own moves produced. When the result is
//! known, `learn` moves each recorded position's score toward a target
//! derived from the result, nudges the style weight of every opening
//! position reached, and updates per-position repertoire statistics.
//!
//! Scores are expected results for the side to move in the range (0, 1),
//! starting at 0.5 for a position never seen before.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use chess_core::GameOutcome;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::LearningConfig;
use crate::error::{EngineError, EngineResult, EngineWarning};
use crate::style::OpeningStyle;

const STORE_VERSION: u32 = 1;

/// What the store knows about one position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearnedRecord {
    /// Expected score for the side to move, in (0, 1).
    pub score: f64,
    pub visits: u32,
}

impl Default for LearnedRecord {
    fn default() -> Self {
        Self {
            score: 0.5,
            visits: 0,
        }
    }
}

/// Results of the games that passed through one opening position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepertoireStats {
    pub games: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl RepertoireStats {
    pub fn record(&mut self, outcome: GameOutcome) {
        self.games += 1;
        match outcome {
            GameOutcome::Win => self.wins += 1,
            GameOutcome::Draw => self.draws += 1,
            GameOutcome::Loss => self.losses += 1,
        }
    }

    /// Points per game, draws counting half.
    pub fn success_rate(&self) -> f64 {
        if self.games == 0 {
            return 0.5;
        }
        (self.wins as f64 + 0.5 * self.draws as f64) / self.games as f64
    }

    /// Book weight factor: 0.5 (always lost) to 2.0 (always won), faded in
    /// over the first ten games.
    pub fn weight_factor(&self) -> f64 {
        let confidence = (self.games as f64 / 10.0).min(1.0);
        let raw = 0.5 + 1.5 * self.success_rate();
        1.0 + (raw - 1.0) * confidence
    }
}

/// Persisted form of everything learned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct LearningStore {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    positions: HashMap<u64, LearnedRecord>,
    /// style name -> opening position (hex key) -> weight
    #[serde(default)]
    styles: BTreeMap<String, BTreeMap<String, f64>>,
    /// opening position (hex key) -> results
    #[serde(default)]
    repertoire: BTreeMap<String, RepertoireStats>,
    #[serde(default)]
    games_learned: u64,
}

/// Summary of one learning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearningSummary {
    pub outcome: Option<GameOutcome>,
    pub positions_updated: usize,
    pub lines_updated: usize,
}

pub fn line_id(key: u64) -> String {
    format!("{key:016x}")
}

pub struct AdaptiveLearner {
    config: LearningConfig,
    store: LearningStore,
    game_positions: Vec<u64>,
    game_lines: Vec<u64>,
    seen: HashSet<u64>,
    pending: Option<GameOutcome>,
    style: OpeningStyle,
}

impl AdaptiveLearner {
    pub fn new(config: LearningConfig) -> Self {
        Self {
            config,
            store: LearningStore {
                version: STORE_VERSION,
                ..LearningStore::default()
            },
            game_positions: Vec::new(),
            game_lines: Vec::new(),
            seen: HashSet::new(),
            pending: None,
            style: OpeningStyle::default(),
        }
    }

    /// Load the configured store. A missing file starts empty; an unreadable
    /// or corrupt one starts empty and comes back as a warning.
    pub fn load(config: LearningConfig) -> (Self, Option<EngineWarning>) {
        let mut learner = Self::new(config);
        let Some(path) = learner.config.store_path.clone() else {
            return (learner, None);
        };
        if !path.exists() {
            info!(path = %path.display(), "No learning store yet, starting empty");
            return (learner, None);
        }
        match read_store(&path) {
            Ok(store) => {
                info!(
                    path = %path.display(),
                    positions = store.positions.len(),
                    games = store.games_learned,
                    "Learning store loaded"
                );
                learner.store = store;
                (learner, None)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Learning store unusable, starting empty");
                let warning = EngineWarning::LearningReset {
                    path,
                    reason: e.to_string(),
                };
                (learner, Some(warning))
            }
        }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    pub fn store_path(&self) -> Option<&Path> {
        self.config.store_path.as_deref()
    }

    /// Style in effect for the game being recorded.
    pub fn set_style(&mut self, style: OpeningStyle) {
        self.style = style;
    }

    /// Remember a position the engine had to move in. Repeats within one
    /// game are counted once.
    pub fn record_position(&mut self, key: u64) {
        if self.seen.insert(key) {
            self.game_positions.push(key);
        }
    }

    /// Remember an opening position reached by the engine's own move.
    pub fn record_line(&mut self, key: u64) {
        if !self.game_lines.contains(&key) {
            self.game_lines.push(key);
        }
    }

    /// Result of the current game from the engine's side.
    pub fn record_result(&mut self, outcome: GameOutcome) {
        self.pending = Some(outcome);
    }

    pub fn pending_result(&self) -> Option<GameOutcome> {
        self.pending
    }

    pub fn recorded_positions(&self) -> &[u64] {
        &self.game_positions
    }

    /// Drop everything recorded for the current game.
    pub fn reset_game(&mut self) {
        self.game_positions.clear();
        self.game_lines.clear();
        self.seen.clear();
        self.pending = None;
    }

    /// Logistic map from a result in [0, 1] to a target strictly inside (0, 1).
    pub fn sigmoid_target(&self, result: f64) -> f64 {
        1.0 / (1.0 + (-self.config.result_sharpness * (result - 0.5)).exp())
    }

    /// Apply the recorded result to every recorded position and line, then
    /// clear the game buffers. Without a result nothing changes.
    pub fn learn(&mut self) -> LearningSummary {
        let Some(outcome) = self.pending else {
            self.reset_game();
            return LearningSummary {
                outcome: None,
                positions_updated: 0,
                lines_updated: 0,
            };
        };

        let target = self.sigmoid_target(outcome.score());
        let alpha = self.config.learning_rate;
        for key in &self.game_positions {
            let record = self.store.positions.entry(*key).or_default();
            record.score += alpha * (target - record.score);
            record.visits = record.visits.saturating_add(1);
        }

        let step = match outcome {
            GameOutcome::Win => self.config.style_step,
            GameOutcome::Loss => -self.config.style_step,
            GameOutcome::Draw => 0.0,
        };
        let (lo, hi) = (self.config.style_min, self.config.style_max);
        let weights = self
            .store
            .styles
            .entry(self.style.as_str().to_string())
            .or_default();
        for key in &self.game_lines {
            let weight = weights.entry(line_id(*key)).or_insert(1.0);
            *weight = (*weight + step).clamp(lo, hi);
            self.store
                .repertoire
                .entry(line_id(*key))
                .or_default()
                .record(outcome);
        }
        self.store.games_learned += 1;

        let summary = LearningSummary {
            outcome: Some(outcome),
            positions_updated: self.game_positions.len(),
            lines_updated: self.game_lines.len(),
        };
        info!(
            outcome = ?outcome,
            positions = summary.positions_updated,
            lines = summary.lines_updated,
            "Learned from game"
        );
        self.reset_game();
        summary
    }

    pub fn learned(&self, key: u64) -> Option<LearnedRecord> {
        self.store.positions.get(&key).copied()
    }

    /// Weight of an opening position under a style; 1.0 when never adjusted.
    pub fn style_weight(&self, style: OpeningStyle, key: u64) -> f64 {
        self.store
            .styles
            .get(style.as_str())
            .and_then(|lines| lines.get(&line_id(key)))
            .copied()
            .unwrap_or(1.0)
    }

    pub fn repertoire(&self, key: u64) -> RepertoireStats {
        self.store
            .repertoire
            .get(&line_id(key))
            .copied()
            .unwrap_or_default()
    }

    pub fn position_count(&self) -> usize {
        self.store.positions.len()
    }

    pub fn games_learned(&self) -> u64 {
        self.store.games_learned
    }

    /// Trim to the most visited records and write the store atomically.
    /// No-op without a configured path.
    pub fn save(&mut self) -> EngineResult<()> {
        let Some(path) = self.config.store_path.clone() else {
            return Ok(());
        };
        self.trim();
        self.store.version = STORE_VERSION;
        let json = serde_json::to_string(&self.store)?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| EngineError::io(dir, e))?;
        }
        let tmp = temp_path(&path);
        std::fs::write(&tmp, json).map_err(|e| EngineError::io(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| EngineError::io(&path, e))?;
        info!(path = %path.display(), positions = self.store.positions.len(), "Learning store saved");
        Ok(())
    }

    fn trim(&mut self) {
        let max = self.config.max_positions;
        if self.store.positions.len() <= max {
            return;
        }
        let mut records: Vec<(u64, LearnedRecord)> = self.store.positions.drain().collect();
        records.sort_by(|a, b| b.1.visits.cmp(&a.1.visits).then(a.0.cmp(&b.0)));
        records.truncate(max);
        self.store.positions = records.into_iter().collect();
    }
}

fn read_store(path: &Path) -> EngineResult<LearningStore> {
    let text = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
    let store: LearningStore =
        serde_json::from_str(&text).map_err(|e| EngineError::MalformedLearningStore {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let bad = store
        .positions
        .values()
        .any(|r| !(r.score.is_finite() && (0.0..=1.0).contains(&r.score)));
    if bad {
        return Err(EngineError::MalformedLearningStore {
            path: path.to_path_buf(),
            reason: "score outside [0, 1]".into(),
        });
    }
    Ok(store)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "learning_tests.rs"]
mod learning_tests;
