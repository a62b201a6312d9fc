//! Engine configuration, loadable from TOML.
//!
//! Every section is optional in the file; missing keys take the defaults
//! below. The feature toggles are copied into each search call, so changing
//! them between moves never affects a search in progress.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::style::OpeningStyle;

/// User-facing feature switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Consult the opening book before searching.
    pub book: bool,
    /// Use the transposition table.
    pub cache: bool,
    /// Alpha-beta window cutoffs; off means plain minimax.
    pub search: bool,
    /// Quiescence search at the horizon.
    pub tactical: bool,
    /// Null-move pruning.
    pub pruning: bool,
    /// Positional evaluation terms beyond material.
    pub positional: bool,
    /// Blend learned scores into the evaluation.
    pub learning: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            book: true,
            cache: true,
            search: true,
            tactical: true,
            pruning: true,
            positional: true,
            learning: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    pub path: Option<PathBuf>,
    /// Book is not consulted at or past this many half-moves.
    pub max_ply: u32,
    /// Entries below this weight are ignored.
    pub min_weight: u16,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_ply: 30,
            min_weight: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    pub store_path: Option<PathBuf>,
    /// Step size of the score update.
    pub learning_rate: f64,
    /// Steepness of the result-to-target logistic.
    pub result_sharpness: f64,
    /// Largest share a learned score may take in the blended evaluation.
    pub blend_weight: f64,
    /// Visits after which a record carries the full `blend_weight`.
    pub blend_visits: u32,
    pub style_step: f64,
    pub style_min: f64,
    pub style_max: f64,
    /// Records kept when the store is written.
    pub max_positions: usize,
    /// Plies of a game that count as its opening line.
    pub line_plies: usize,
    /// Save after every learning pass.
    pub autosave: bool,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            learning_rate: 0.1,
            result_sharpness: 6.0,
            blend_weight: 0.5,
            blend_visits: 20,
            style_step: 0.1,
            style_min: 0.5,
            style_max: 2.0,
            max_positions: 10_000,
            line_plies: 8,
            autosave: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Transposition table size in entries.
    pub tt_capacity: usize,
    /// Null-move depth reduction R.
    pub null_move_reduction: u8,
    /// Hard cap on quiescence plies.
    pub quiescence_depth: u8,
    /// Quiescence plies in which quiet checking moves are also tried.
    pub quiescence_check_plies: u8,
    /// Nodes between clock reads.
    pub check_interval: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tt_capacity: 1 << 18,
            null_move_reduction: 2,
            quiescence_depth: 8,
            quiescence_check_plies: 2,
            check_interval: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default strength, 1 (weakest) to 20.
    pub difficulty: u8,
    pub style: OpeningStyle,
    /// Fixed RNG seed for reproducible book and weakening choices.
    pub seed: Option<u64>,
    pub features: Features,
    pub book: BookConfig,
    pub learning: LearningConfig,
    pub search: SearchConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            difficulty: 10,
            style: OpeningStyle::Balanced,
            seed: None,
            features: Features::default(),
            book: BookConfig::default(),
            learning: LearningConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |msg: String| Err(EngineError::InvalidConfig(msg));
        if !(1..=20).contains(&self.difficulty) {
            return invalid(format!("difficulty {} outside 1..=20", self.difficulty));
        }
        if self.search.tt_capacity == 0 {
            return invalid("search.tt_capacity must be positive".into());
        }
        let l = &self.learning;
        if !(l.learning_rate > 0.0 && l.learning_rate <= 1.0) {
            return invalid(format!("learning_rate {} outside (0, 1]", l.learning_rate));
        }
        if !(l.result_sharpness > 0.0) {
            return invalid("learning.result_sharpness must be positive".into());
        }
        if !(0.0..=1.0).contains(&l.blend_weight) {
            return invalid(format!("blend_weight {} outside [0, 1]", l.blend_weight));
        }
        if l.blend_visits == 0 {
            return invalid("learning.blend_visits must be positive".into());
        }
        if !(l.style_min > 0.0 && l.style_min <= l.style_max) {
            return invalid(format!(
                "style bounds [{}, {}] are not a positive range",
                l.style_min, l.style_max
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
