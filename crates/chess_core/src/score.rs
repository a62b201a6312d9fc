//! Scores on one scale: centipawns for ordinary positions, mate distances
//! for forced mates.
//!
//! Internally the search works with plain `i32` scores where mates sit near
//! `±MATE_SCORE`. [`Evaluation`] is the typed view handed to callers.

use std::cmp::Ordering;
use std::fmt;

/// Score of delivering mate on the current move.
pub const MATE_SCORE: i32 = 100_000;
/// Any score at or beyond this magnitude encodes a forced mate.
pub const MATE_BOUND: i32 = MATE_SCORE - 1_000;
/// Score of a drawn position.
pub const DRAW_SCORE: i32 = 0;

/// Score for the side to move having mated the opponent `ply` plies from the root.
#[inline]
pub const fn mate_in(ply: u32) -> i32 {
    MATE_SCORE - ply as i32
}

/// Score for the side to move being mated `ply` plies from the root.
#[inline]
pub const fn mated_in(ply: u32) -> i32 {
    -MATE_SCORE + ply as i32
}

#[inline]
pub const fn is_mate_score(score: i32) -> bool {
    score >= MATE_BOUND || score <= -MATE_BOUND
}

/// Evaluation from the perspective of the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Evaluation {
    Centipawns(i32),
    /// Side to move mates in this many plies.
    MateIn(u32),
    /// Side to move is mated in this many plies (0 = already mated).
    MatedIn(u32),
}

impl Evaluation {
    pub fn from_score(score: i32) -> Self {
        if score >= MATE_BOUND {
            Evaluation::MateIn((MATE_SCORE - score).max(0) as u32)
        } else if score <= -MATE_BOUND {
            Evaluation::MatedIn((MATE_SCORE + score).max(0) as u32)
        } else {
            Evaluation::Centipawns(score)
        }
    }

    /// Map back onto the search scale. Mates dominate every centipawn value,
    /// shorter wins rank above longer ones and longer losses above shorter.
    pub fn to_score(self) -> i32 {
        match self {
            Evaluation::Centipawns(cp) => cp.clamp(-MATE_BOUND + 1, MATE_BOUND - 1),
            Evaluation::MateIn(ply) => mate_in(ply.min(999)),
            Evaluation::MatedIn(ply) => mated_in(ply.min(999)),
        }
    }

    pub fn is_mate(self) -> bool {
        !matches!(self, Evaluation::Centipawns(_))
    }

    /// Same evaluation seen from the opponent's side.
    pub fn negate(self) -> Self {
        match self {
            Evaluation::Centipawns(cp) => Evaluation::Centipawns(-cp),
            Evaluation::MateIn(ply) => Evaluation::MatedIn(ply),
            Evaluation::MatedIn(ply) => Evaluation::MateIn(ply),
        }
    }
}

impl PartialOrd for Evaluation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Evaluation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_score().cmp(&other.to_score())
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Evaluation::Centipawns(cp) => write!(f, "{:+.2}", cp as f64 / 100.0),
            Evaluation::MateIn(ply) => write!(f, "#{}", ply.div_ceil(2)),
            Evaluation::MatedIn(ply) => write!(f, "#-{}", ply.div_ceil(2)),
        }
    }
}

#[cfg(test)]
#[path = "score_tests.rs"]
mod score_tests;
