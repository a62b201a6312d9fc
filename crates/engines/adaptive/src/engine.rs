//! The engine facade: one object that owns the book, the transposition
//! table and the learner, and answers the caller's questions about a
//! position.

use std::time::Duration;

use chess_core::{
    Engine, Evaluation, GameOutcome, GameStatus, Move, Position, SearchLimits, SearchResult,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::book::OpeningBook;
use crate::config::{EngineConfig, Features};
use crate::difficulty::{weaken, Difficulty, Weakening};
use crate::error::{EngineError, EngineResult, EngineWarning};
use crate::eval::{evaluate, EvalSettings};
use crate::learning::{AdaptiveLearner, LearningSummary};
use crate::search::{search, SearchParams, SearchStats};
use crate::style::OpeningStyle;
use crate::tt::{TranspositionTable, TtStats};

/// How often and how patiently to retry engine construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    /// Wait before retry n is `backoff * n`.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    Book,
    /// Search result, with the deepest completed depth.
    Search { depth: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChosenMove {
    pub mv: Move,
    /// None for book moves.
    pub evaluation: Option<Evaluation>,
    pub source: MoveSource,
}

/// Answer to "which move?". A position without legal moves is an outcome,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDecision {
    Play(ChosenMove),
    NoLegalMoves(GameStatus),
}

impl MoveDecision {
    pub fn mv(&self) -> Option<Move> {
        match self {
            MoveDecision::Play(chosen) => Some(chosen.mv),
            MoveDecision::NoLegalMoves(_) => None,
        }
    }
}

/// What happened on the last `choose_move` call.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveReport {
    pub source: MoveSource,
    pub mv: Move,
    pub evaluation: Option<Evaluation>,
    pub stats: SearchStats,
    /// Number of book candidates considered (0 for searched moves).
    pub book_candidates: usize,
    /// A lower-ranked move was played on purpose.
    pub weakened: bool,
    /// The clock interrupted the search.
    pub stopped: bool,
}

pub struct AdaptiveEngine {
    config: EngineConfig,
    features: Features,
    style: OpeningStyle,
    difficulty: Difficulty,
    book: OpeningBook,
    tt: TranspositionTable,
    learner: AdaptiveLearner,
    rng: StdRng,
    warnings: Vec<EngineWarning>,
    game_keys: Vec<u64>,
    after_last_move: Option<Position>,
    last_report: Option<MoveReport>,
}

impl AdaptiveEngine {
    /// Build an engine from a config. Book and learning files that cannot be
    /// used are recorded as warnings; only an invalid config or a failed
    /// table allocation is an error.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate().map_err(|e| EngineError::Initialization {
            attempts: 1,
            reason: e.to_string(),
        })?;

        let tt = TranspositionTable::new(config.search.tt_capacity)?;
        let mut warnings = Vec::new();
        let (book, book_warning) = OpeningBook::open(&config.book);
        warnings.extend(book_warning);
        let (mut learner, learning_warning) = AdaptiveLearner::load(config.learning.clone());
        warnings.extend(learning_warning);
        learner.set_style(config.style);

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            difficulty = config.difficulty,
            style = %config.style,
            book_entries = book.len(),
            learned_positions = learner.position_count(),
            tt_entries = tt.capacity(),
            "Adaptive engine initialized"
        );

        Ok(Self {
            features: config.features,
            style: config.style,
            difficulty: Difficulty::new(config.difficulty),
            book,
            tt,
            learner,
            rng,
            warnings,
            game_keys: Vec::new(),
            after_last_move: None,
            last_report: None,
            config,
        })
    }

    /// [`AdaptiveEngine::new`] with retries and linear backoff.
    pub fn initialize_with_retry(config: EngineConfig, policy: RetryPolicy) -> EngineResult<Self> {
        let attempts = policy.attempts.max(1);
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            match Self::new(config.clone()) {
                Ok(engine) => return Ok(engine),
                Err(e) => {
                    warn!(attempt, attempts, error = %e, "Engine initialization failed");
                    last_error = e.to_string();
                }
            }
            if attempt < attempts {
                std::thread::sleep(policy.backoff * attempt);
            }
        }
        Err(EngineError::Initialization {
            attempts,
            reason: last_error,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Pick a move at the given difficulty.
    pub fn choose_move(&mut self, pos: &Position, difficulty: Difficulty) -> MoveDecision {
        self.choose_move_within(pos, difficulty, None, None)
    }

    /// [`AdaptiveEngine::choose_move`] with optional extra caps on depth and
    /// time, on top of what the difficulty allows.
    pub fn choose_move_within(
        &mut self,
        pos: &Position,
        difficulty: Difficulty,
        max_depth: Option<u8>,
        max_time: Option<Duration>,
    ) -> MoveDecision {
        if !pos.has_legal_moves() {
            return MoveDecision::NoLegalMoves(pos.status());
        }
        if self.follow_game(pos) {
            self.learner.record_position(pos.key());
        }

        let chosen = match self.book_move(pos) {
            Some(chosen) => chosen,
            None => self.search_move(pos, difficulty, max_depth, max_time),
        };

        let child = pos.play_unchecked(chosen.mv);
        if (pos.ply() as usize) < self.learner.config().line_plies {
            self.learner.record_line(child.key());
        }
        self.after_last_move = Some(child);
        MoveDecision::Play(chosen)
    }

    /// Extend the game record with `pos` when it continues the game: the
    /// position after our last move, or one reply later. Any other position
    /// starts a fresh record. Returns false when `pos` is the position
    /// already at the end of the record (a repeated query).
    fn follow_game(&mut self, pos: &Position) -> bool {
        let key = pos.key();
        if self.game_keys.last() == Some(&key) {
            return false;
        }
        match self.after_last_move.take() {
            Some(after) if after.key() == key => self.game_keys.push(key),
            Some(after)
                if after
                    .legal_moves()
                    .into_iter()
                    .any(|mv| after.play_unchecked(mv).key() == key) =>
            {
                self.game_keys.push(after.key());
                self.game_keys.push(key);
            }
            _ => {
                self.game_keys.clear();
                self.game_keys.push(key);
            }
        }
        true
    }


    fn book_move(&mut self, pos: &Position) -> Option<ChosenMove> {
        if !self.features.book {
            return None;
        }
        let learner = self.features.learning.then_some(&self.learner);
        let candidates = self.book.candidates(pos, self.style, learner).len();
        let pick = self.book.choose(pos, self.style, learner, &mut self.rng)?;
        debug!(mv = %pick.mv, weight = pick.weight, adjusted = pick.adjusted, "Book move");

        let chosen = ChosenMove {
            mv: pick.mv,
            evaluation: None,
            source: MoveSource::Book,
        };
        self.last_report = Some(MoveReport {
            source: MoveSource::Book,
            mv: pick.mv,
            evaluation: None,
            stats: SearchStats::default(),
            book_candidates: candidates,
            weakened: false,
            stopped: false,
        });
        Some(chosen)
    }

    fn search_move(
        &mut self,
        pos: &Position,
        difficulty: Difficulty,
        max_depth: Option<u8>,
        max_time: Option<Duration>,
    ) -> ChosenMove {
        let profile = difficulty.profile();
        let weakening = if profile.weakening.probability > 0.0 {
            profile.weakening
        } else {
            Weakening::OFF
        };
        let mut params = self.search_params(difficulty, weakening.top_k > 1);
        if let Some(depth) = max_depth {
            params.max_depth = params.max_depth.min(depth.max(1));
        }
        if let Some(time) = max_time {
            params.time_limit = Some(params.time_limit.map_or(time, |t| t.min(time)));
        }

        let history = history_before(&self.game_keys, pos.key());
        let learner = self.features.learning.then_some(&self.learner);
        let outcome = search(pos, history, &params, &mut self.tt, learner);

        let (mv, score, weakened) = match weaken(&outcome.root_scores, &weakening, &mut self.rng) {
            Some((mv, score)) => (mv, score, Some(mv) != outcome.best_move),
            None => match outcome.best_move {
                Some(mv) => (mv, outcome.score, false),
                // has_legal_moves was checked by the caller
                None => (pos.legal_moves()[0], 0, false),
            },
        };
        let evaluation = Evaluation::from_score(score);
        if weakened {
            debug!(best = ?outcome.best_move.map(|m| m.to_string()), played = %mv, "Weakened move");
        }

        self.last_report = Some(MoveReport {
            source: MoveSource::Search {
                depth: outcome.stats.depth,
            },
            mv,
            evaluation: Some(evaluation),
            stats: outcome.stats,
            book_candidates: 0,
            weakened,
            stopped: outcome.stopped,
        });
        ChosenMove {
            mv,
            evaluation: Some(evaluation),
            source: MoveSource::Search {
                depth: outcome.stats.depth,
            },
        }
    }

    /// Feature toggles AND-ed with what the difficulty level allows.
    fn search_params(&self, difficulty: Difficulty, scored_root: bool) -> SearchParams {
        let profile = difficulty.profile();
        let f = self.features;
        let s = &self.config.search;
        SearchParams {
            max_depth: profile.max_depth,
            time_limit: Some(profile.move_time),
            use_tt: f.cache,
            alpha_beta: f.search,
            quiescence: f.tactical && profile.quiescence,
            null_move: f.pruning && profile.null_move,
            scored_root,
            eval: self.eval_settings(),
            null_move_reduction: s.null_move_reduction,
            quiescence_depth: s.quiescence_depth,
            quiescence_check_plies: s.quiescence_check_plies,
            check_interval: s.check_interval,
        }
    }

    fn eval_settings(&self) -> EvalSettings {
        EvalSettings {
            positional: self.features.positional,
            learning: self.features.learning,
            blend_weight: self.config.learning.blend_weight,
            blend_visits: self.config.learning.blend_visits,
        }
    }

    /// Static estimate of `pos` for the side to move. Terminal positions get
    /// their rules value.
    pub fn evaluate(&self, pos: &Position) -> Evaluation {
        match pos.status() {
            GameStatus::Checkmate => Evaluation::MatedIn(0),
            GameStatus::Draw(_) => Evaluation::Centipawns(0),
            GameStatus::Ongoing => {
                let learner = self.features.learning.then_some(&self.learner);
                Evaluation::Centipawns(evaluate(pos, &self.eval_settings(), learner))
            }
        }
    }

    /// The `n` best moves with exact scores at the engine's own difficulty.
    pub fn top_moves(&mut self, pos: &Position, n: usize) -> Vec<(Move, Evaluation)> {
        if n == 0 || !pos.has_legal_moves() {
            return Vec::new();
        }
        let params = self.search_params(self.difficulty, true);
        let learner = self.features.learning.then_some(&self.learner);
        let history = history_before(&self.game_keys, pos.key());
        let outcome = search(pos, history, &params, &mut self.tt, learner);
        let mut ranked: Vec<(Move, Evaluation)> = outcome
            .root_scores
            .iter()
            .take(n)
            .map(|&(mv, score)| (mv, Evaluation::from_score(score)))
            .collect();
        if ranked.is_empty() {
            if let Some(mv) = outcome.best_move {
                ranked.push((mv, Evaluation::from_score(outcome.score)));
            }
        }
        ranked
    }

    pub fn features(&self) -> Features {
        self.features
    }

    pub fn set_features(&mut self, features: Features) {
        self.features = features;
    }

    pub fn set_book(&mut self, on: bool) {
        self.features.book = on;
    }

    pub fn set_cache(&mut self, on: bool) {
        self.features.cache = on;
    }

    pub fn set_search(&mut self, on: bool) {
        self.features.search = on;
    }

    pub fn set_tactical(&mut self, on: bool) {
        self.features.tactical = on;
    }

    pub fn set_pruning(&mut self, on: bool) {
        self.features.pruning = on;
    }

    pub fn set_positional(&mut self, on: bool) {
        self.features.positional = on;
    }

    pub fn set_learning(&mut self, on: bool) {
        self.features.learning = on;
    }

    pub fn style(&self) -> OpeningStyle {
        self.style
    }

    pub fn set_style(&mut self, style: OpeningStyle) {
        self.style = style;
        self.learner.set_style(style);
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Default level for [`Engine::search`] and [`AdaptiveEngine::top_moves`].
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// Result of the current game from the engine's side.
    pub fn record_result(&mut self, outcome: GameOutcome) {
        self.learner.record_result(outcome);
    }

    /// Apply the recorded result to everything recorded this game, saving
    /// the store when autosave is on. A failed save becomes a warning.
    pub fn learn_from_game(&mut self) -> LearningSummary {
        let summary = self.learner.learn();
        self.game_keys.clear();
        self.after_last_move = None;
        if summary.outcome.is_some() && self.learner.config().autosave {
            if let Err(e) = self.learner.save() {
                warn!(error = %e, "Could not save learning store");
                if let Some(path) = self.learner.store_path() {
                    self.warnings.push(EngineWarning::PersistenceFailed {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        summary
    }

    pub fn save_learning(&mut self) -> EngineResult<()> {
        self.learner.save()
    }

    /// Forget the current game: recorded positions, repetition history and
    /// cached search results.
    pub fn new_game(&mut self) {
        self.learner.reset_game();
        self.game_keys.clear();
        self.after_last_move = None;
        self.tt.clear();
        self.last_report = None;
    }

    pub fn warnings(&self) -> &[EngineWarning] {
        &self.warnings
    }

    pub fn last_report(&self) -> Option<&MoveReport> {
        self.last_report.as_ref()
    }

    pub fn book(&self) -> &OpeningBook {
        &self.book
    }

    pub fn learner(&self) -> &AdaptiveLearner {
        &self.learner
    }

    pub fn tt_stats(&self) -> TtStats {
        self.tt.stats()
    }
}

/// Game positions before `key`, when `key` ends the game record.
fn history_before(game_keys: &[u64], key: u64) -> &[u64] {
    match game_keys.split_last() {
        Some((&last, earlier)) if last == key => earlier,
        _ => &[],
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" => Some(true),
        "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl Engine for AdaptiveEngine {
    fn search(&mut self, pos: &Position, limits: SearchLimits) -> SearchResult {
        let decision = self.choose_move_within(pos, self.difficulty, Some(limits.depth), limits.move_time);
        let (score, depth, nodes, stopped) = match (&decision, &self.last_report) {
            (MoveDecision::Play(chosen), Some(report)) => (
                chosen.evaluation.map_or(0, Evaluation::to_score),
                report.stats.depth,
                report.stats.nodes,
                report.stopped,
            ),
            _ => (0, 0, 0, false),
        };
        SearchResult {
            best_move: decision.mv(),
            score,
            depth,
            nodes,
            stopped,
        }
    }

    fn name(&self) -> &str {
        "Adaptive"
    }

    fn new_game(&mut self) {
        AdaptiveEngine::new_game(self);
    }

    fn set_option(&mut self, name: &str, value: &str) -> bool {
        let flag = parse_bool(value);
        match (name.to_ascii_lowercase().as_str(), flag) {
            ("difficulty", _) => match value.trim().parse::<u8>() {
                Ok(level) => {
                    self.difficulty = Difficulty::new(level);
                    true
                }
                Err(_) => false,
            },
            ("style", _) => match value.parse::<OpeningStyle>() {
                Ok(style) => {
                    self.set_style(style);
                    true
                }
                Err(_) => false,
            },
            ("book", Some(on)) => {
                self.set_book(on);
                true
            }
            ("cache", Some(on)) => {
                self.set_cache(on);
                true
            }
            ("search", Some(on)) => {
                self.set_search(on);
                true
            }
            ("tactical", Some(on)) => {
                self.set_tactical(on);
                true
            }
            ("pruning", Some(on)) => {
                self.set_pruning(on);
                true
            }
            ("positional", Some(on)) => {
                self.set_positional(on);
                true
            }
            ("learning", Some(on)) => {
                self.set_learning(on);
                true
            }
            _ => false,
        }
    }

    fn game_finished(&mut self, outcome: GameOutcome) {
        self.record_result(outcome);
        self.learn_from_game();
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
