//! Adaptive Chess Engine
//!
//! Iterative-deepening alpha-beta search over a hand-tuned evaluation, with:
//! - A transposition table of 4-way buckets with generation ageing
//! - Quiescence search and null-move pruning
//! - A weighted opening book whose choices follow an opening style
//! - Learning from finished games, persisted as JSON
//! - Difficulty levels that limit depth, time and features, and occasionally
//!   play a slightly weaker move
//!
//! [`AdaptiveEngine`] ties these together and also implements
//! [`chess_core::Engine`].

pub mod book;
pub mod config;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod eval;
pub mod learning;
pub mod ordering;
mod pst;
pub mod search;
pub mod style;
pub mod tt;

pub use book::{BookBuilder, BookCandidate, OpeningBook};
pub use config::{BookConfig, EngineConfig, Features, LearningConfig, SearchConfig};
pub use difficulty::{Difficulty, DifficultyProfile, Weakening};
pub use engine::{AdaptiveEngine, ChosenMove, MoveDecision, MoveReport, MoveSource, RetryPolicy};
pub use error::{EngineError, EngineResult, EngineWarning};
pub use eval::{evaluate, EvalSettings};
pub use learning::{AdaptiveLearner, LearnedRecord, LearningSummary, RepertoireStats};
pub use search::{SearchOutcome, SearchParams, SearchStats};
pub use style::{CandidateKind, OpeningStyle};
pub use tt::{Bound, TranspositionTable, TtEntry, TtStats};
