pub mod attacks;
pub mod bitboard;
pub mod error;
pub mod position;
pub mod score;
pub mod time_control;
pub mod types;
pub mod uci;
pub mod zobrist;

pub use attacks::*;
pub use bitboard::*;
pub use error::*;
pub use position::*;
pub use score::*;
pub use time_control::*;
pub use types::*;
pub use uci::*;
pub use zobrist::ZOBRIST;

// =============================================================================
// Engine trait: implemented by the adaptive engine and its random fallback
// =============================================================================

/// Result of a search operation
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The best move found (None if no legal moves)
    pub best_move: Option<Move>,
    /// Score in centipawns from the side to move's perspective
    pub score: i32,
    /// Deepest fully completed iteration
    pub depth: u8,
    /// Number of nodes searched
    pub nodes: u64,
    /// Whether search was stopped early due to time limit
    pub stopped: bool,
}

/// Result of a finished game from one player's perspective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    Win,
    Draw,
    Loss,
}

impl GameOutcome {
    /// 1.0 for a win, 0.5 for a draw, 0.0 for a loss.
    pub fn score(self) -> f64 {
        match self {
            GameOutcome::Win => 1.0,
            GameOutcome::Draw => 0.5,
            GameOutcome::Loss => 0.0,
        }
    }

    /// The same game seen by the other player.
    pub fn flip(self) -> GameOutcome {
        match self {
            GameOutcome::Win => GameOutcome::Loss,
            GameOutcome::Draw => GameOutcome::Draw,
            GameOutcome::Loss => GameOutcome::Win,
        }
    }
}

/// Trait that all players implement, so harnesses can swap the adaptive
/// engine and its fallback without caring which one they hold.
pub trait Engine: Send {
    /// Search the position with the given search limits.
    fn search(&mut self, pos: &Position, limits: SearchLimits) -> SearchResult;

    /// Returns the engine's name
    fn name(&self) -> &str;

    fn author(&self) -> &str {
        "adaptive-chess"
    }

    /// Reset internal state for a new game (clear hash tables, history, etc.)
    fn new_game(&mut self) {}

    /// Set a named option. Returns true if the option was recognized.
    fn set_option(&mut self, _name: &str, _value: &str) -> bool {
        false
    }

    /// Called once per finished game with the result from this engine's side.
    fn game_finished(&mut self, _outcome: GameOutcome) {}
}
