//! Players for a session: the adaptive engine, or random play when it
//! cannot be started.

use adaptive_engine::{AdaptiveEngine, Difficulty, EngineConfig, RetryPolicy};
use chess_core::Engine;
use random_engine::RandomEngine;
use tracing::{error, info, warn};

pub enum Player {
    Adaptive(Box<AdaptiveEngine>),
    Fallback(RandomEngine),
}

impl Player {
    /// Start an adaptive engine with retries. When every attempt fails the
    /// session carries on with a random-move player.
    pub fn initialize(
        config: EngineConfig,
        difficulty: Difficulty,
        policy: RetryPolicy,
        fallback_seed: Option<u64>,
    ) -> Self {
        match AdaptiveEngine::initialize_with_retry(config, policy) {
            Ok(mut engine) => {
                engine.set_difficulty(difficulty);
                for warning in engine.warnings() {
                    warn!(?warning, "Engine started with a recovered fault");
                }
                Player::Adaptive(Box::new(engine))
            }
            Err(e) => {
                error!(error = %e, "Falling back to random play");
                let fallback = match fallback_seed {
                    Some(seed) => RandomEngine::with_seed(seed),
                    None => RandomEngine::new(),
                };
                Player::Fallback(fallback)
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Player::Fallback(_))
    }

    pub fn engine(&mut self) -> &mut dyn Engine {
        match self {
            Player::Adaptive(engine) => engine.as_mut(),
            Player::Fallback(engine) => engine,
        }
    }

    /// Write whatever the player has learned. Random play learns nothing.
    pub fn save_learning(&mut self) {
        let Player::Adaptive(engine) = self else {
            return;
        };
        match engine.save_learning() {
            Ok(()) => info!(games = engine.learner().games_learned(), "Learning saved"),
            Err(e) => warn!(error = %e, "Could not save learning"),
        }
    }
}

#[cfg(test)]
#[path = "player_tests.rs"]
mod player_tests;
