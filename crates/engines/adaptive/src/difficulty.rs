//! Difficulty levels and what they mean for search.
//!
//! One number (1 to 20, or 1 to 9 on the coarse scale) decides search depth,
//! time budget, which search features run and how often the engine
//! deliberately plays a weaker move. Weakening is a single seedable step
//! over the scored root moves, see [`weaken`].

use std::time::Duration;

use chess_core::{is_mate_score, Move, MATE_BOUND};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 20;
    pub const COARSE_MAX: u8 = 9;

    /// Level on the 1..=20 scale, clamped.
    pub fn new(level: u8) -> Self {
        Difficulty(level.clamp(Self::MIN, Self::MAX))
    }

    /// Level on the 1..=9 scale, spread linearly over 1..=20.
    pub fn from_coarse(level: u8) -> Self {
        let c = level.clamp(1, Self::COARSE_MAX) as u32;
        let fine = 1 + ((c - 1) * 19 + 4) / 8;
        Difficulty(fine as u8)
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn profile(self) -> DifficultyProfile {
        let level = self.0 as u32;
        let below_max = (Self::MAX as u32 - level) as f64;
        DifficultyProfile {
            level: self.0,
            max_depth: (1 + (level - 1) / 3) as u8,
            move_time: Duration::from_millis(150 * level as u64),
            quiescence: level >= 4,
            null_move: level >= 6,
            weakening: Weakening {
                probability: 0.05 * below_max / 2.0,
                top_k: 1 + (Self::MAX as usize - level as usize) / 5,
                max_loss_cp: 300,
            },
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty(10)
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Difficulty(level))
        } else {
            Err(format!("difficulty {level} outside 1..=20"))
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> u8 {
        d.0
    }
}

/// Search parameters derived from a difficulty level.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyProfile {
    pub level: u8,
    pub max_depth: u8,
    pub move_time: Duration,
    /// Level allows quiescence (still AND-ed with the user toggle).
    pub quiescence: bool,
    /// Level allows null-move pruning (still AND-ed with the user toggle).
    pub null_move: bool,
    pub weakening: Weakening,
}

/// Bounded random weakening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weakening {
    /// Chance of not playing the best move.
    pub probability: f64,
    /// How many of the best root moves are eligible.
    pub top_k: usize,
    /// Largest tolerated drop from the best score, in centipawns.
    pub max_loss_cp: i32,
}

impl Weakening {
    pub const OFF: Weakening = Weakening {
        probability: 0.0,
        top_k: 1,
        max_loss_cp: 0,
    };
}

/// Pick the move to play from root moves sorted best first.
///
/// Returns the best move unless the weakening roll succeeds. A weaker move
/// is only eligible if it is among the top `top_k`, loses at most
/// `max_loss_cp` against the best, and does not walk into a forced mate.
/// When the best move mates, it is always played.
pub fn weaken<R: Rng + ?Sized>(scored: &[(Move, i32)], weakening: &Weakening, rng: &mut R) -> Option<(Move, i32)> {
    let best = *scored.first()?;
    if best.1 >= MATE_BOUND || weakening.probability <= 0.0 || weakening.top_k <= 1 {
        return Some(best);
    }
    if !rng.gen_bool(weakening.probability.clamp(0.0, 1.0)) {
        return Some(best);
    }
    let eligible: Vec<(Move, i32)> = scored
        .iter()
        .skip(1)
        .take(weakening.top_k - 1)
        .filter(|(_, score)| !is_mate_score(*score) && best.1 - *score <= weakening.max_loss_cp)
        .copied()
        .collect();
    Some(eligible.choose(rng).copied().unwrap_or(best))
}

#[cfg(test)]
#[path = "difficulty_tests.rs"]
mod difficulty_tests;
