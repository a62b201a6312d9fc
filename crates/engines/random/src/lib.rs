//! Random Move Chess Engine
//!
//! Picks uniformly among the legal moves. The self-play harness falls back to
//! it when the adaptive engine cannot be initialized, and tests use it as an
//! opponent that never needs a search.

use chess_core::{Engine, Position, SearchLimits, SearchResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[cfg(test)]
mod lib_tests;

/// A chess engine that plays random legal moves.
#[derive(Debug, Clone)]
pub struct RandomEngine {
    rng: StdRng,
    nodes: u64,
}

impl RandomEngine {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            nodes: 0,
        }
    }

    /// Same seed, same sequence of choices.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            nodes: 0,
        }
    }
}

impl Default for RandomEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for RandomEngine {
    fn search(&mut self, pos: &Position, _limits: SearchLimits) -> SearchResult {
        let moves = pos.legal_moves();
        self.nodes = 1;

        SearchResult {
            best_move: moves.choose(&mut self.rng).copied(),
            score: 0,
            depth: 1,
            nodes: self.nodes,
            stopped: false,
        }
    }

    fn name(&self) -> &str {
        "Random"
    }

    fn new_game(&mut self) {
        self.nodes = 0;
    }
}
