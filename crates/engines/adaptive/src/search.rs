//! Iterative-deepening negamax with alpha-beta, transposition table,
//! null-move pruning and quiescence search.
//!
//! Only fully completed depths are committed. A depth interrupted by the
//! clock is thrown away and the result of the previous depth stands; if not
//! even depth 1 finished, the first move in ordering order is returned.

use std::time::Duration;

use chess_core::{
    is_mate_score, mated_in, Move, Position, TimeControl, DRAW_SCORE, MATE_SCORE,
};
use tracing::debug;

use crate::eval::{evaluate, EvalSettings};
use crate::learning::AdaptiveLearner;
use crate::ordering::order_moves;
use crate::tt::{Bound, TranspositionTable};

const INFINITY: i32 = MATE_SCORE + 1;

/// Per-call search settings: user feature toggles already AND-ed with the
/// difficulty profile.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub max_depth: u8,
    pub time_limit: Option<Duration>,
    /// Transposition table lookups and stores.
    pub use_tt: bool,
    /// Window cutoffs. Off means plain minimax over the same tree.
    pub alpha_beta: bool,
    pub quiescence: bool,
    pub null_move: bool,
    /// Search every root move with a full window so each gets an exact score.
    pub scored_root: bool,
    pub eval: EvalSettings,
    pub null_move_reduction: u8,
    pub quiescence_depth: u8,
    pub quiescence_check_plies: u8,
    pub check_interval: u64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            max_depth: 4,
            time_limit: None,
            use_tt: true,
            alpha_beta: true,
            quiescence: true,
            null_move: true,
            scored_root: false,
            eval: EvalSettings::default(),
            null_move_reduction: 2,
            quiescence_depth: 8,
            quiescence_check_plies: 2,
            check_interval: 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub qnodes: u64,
    pub tt_hits: u64,
    pub tt_cutoffs: u64,
    pub null_tries: u64,
    pub null_cutoffs: u64,
    /// Deepest fully completed iteration.
    pub depth: u8,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// None only when the root has no legal moves.
    pub best_move: Option<Move>,
    /// Score of `best_move` for the side to move.
    pub score: i32,
    /// Root moves of the last completed depth, best first. Scores are exact
    /// in scored-root mode; otherwise only the first one is.
    pub root_scores: Vec<(Move, i32)>,
    pub stopped: bool,
    pub stats: SearchStats,
}

/// Whether null-move pruning may be tried at this node. Never in check,
/// never twice in a row, never at the root, never without pieces besides
/// pawns, and only with enough depth left for the reduction.
pub fn null_move_allowed(
    pos: &Position,
    depth: u8,
    ply: u32,
    after_null: bool,
    params: &SearchParams,
) -> bool {
    params.null_move
        && params.alpha_beta
        && !after_null
        && ply > 0
        && depth > params.null_move_reduction
        && !pos.in_check()
        && pos.has_non_pawn_material(pos.side_to_move())
}

/// Run a full iterative-deepening search of `pos`. `history` holds keys of
/// positions earlier in the game, for repetition detection.
pub fn search(
    pos: &Position,
    history: &[u64],
    params: &SearchParams,
    tt: &mut TranspositionTable,
    learner: Option<&AdaptiveLearner>,
) -> SearchOutcome {
    Searcher::new(params, tt, learner, history).run(pos)
}

struct Searcher<'a> {
    params: &'a SearchParams,
    tt: &'a mut TranspositionTable,
    learner: Option<&'a AdaptiveLearner>,
    tc: TimeControl,
    stats: SearchStats,
    path: Vec<u64>,
}

impl<'a> Searcher<'a> {
    fn new(
        params: &'a SearchParams,
        tt: &'a mut TranspositionTable,
        learner: Option<&'a AdaptiveLearner>,
        history: &[u64],
    ) -> Self {
        Self {
            params,
            tt,
            learner,
            tc: TimeControl::new(params.time_limit).with_check_interval(params.check_interval),
            stats: SearchStats::default(),
            path: history.to_vec(),
        }
    }

    fn run(mut self, pos: &Position) -> SearchOutcome {
        self.tc.start();
        if self.params.use_tt {
            self.tt.new_search();
        }

        let mut moves = pos.legal_moves();
        if moves.is_empty() {
            let score = if pos.in_check() { mated_in(0) } else { DRAW_SCORE };
            return self.finish(None, score, Vec::new(), false);
        }

        let tt_move = if self.params.use_tt {
            self.tt.best_move(pos.key())
        } else {
            None
        };
        order_moves(pos, &mut moves, tt_move);

        let mut best_move = moves[0];
        let mut best_score = self.static_eval(pos);
        let mut root_scores = Vec::new();
        let mut stopped = false;
        let history_len = self.path.len();

        for depth in 1..=self.params.max_depth.max(1) {
            if depth > 1 && self.tc.used_fraction_exceeds(0.5) {
                break;
            }

            self.path.truncate(history_len);
            self.path.push(pos.key());
            let Some(scores) = self.search_root(pos, &moves, depth) else {
                stopped = true;
                break;
            };

            (best_move, best_score) = scores[0];
            self.stats.depth = depth;
            debug!(
                depth,
                score = best_score,
                best = %best_move,
                nodes = self.stats.nodes,
                elapsed_ms = self.tc.elapsed().as_millis() as u64,
                "Depth completed"
            );

            // Next iteration starts from this one's ranking
            moves = scores.iter().map(|&(mv, _)| mv).collect();
            root_scores = scores;

            let mate_found = is_mate_score(best_score)
                && (MATE_SCORE - best_score.abs()) <= depth as i32;
            if mate_found {
                break;
            }
        }

        self.finish(Some(best_move), best_score, root_scores, stopped)
    }

    fn finish(
        mut self,
        best_move: Option<Move>,
        score: i32,
        root_scores: Vec<(Move, i32)>,
        stopped: bool,
    ) -> SearchOutcome {
        self.stats.elapsed = self.tc.elapsed();
        SearchOutcome {
            best_move,
            score,
            root_scores,
            stopped,
            stats: self.stats,
        }
    }

    /// One root iteration. Returns every root move with its score, best
    /// first, or None when the clock ran out.
    fn search_root(&mut self, pos: &Position, moves: &[Move], depth: u8) -> Option<Vec<(Move, i32)>> {
        let full_window = self.params.scored_root || !self.params.alpha_beta;
        let mut alpha = -INFINITY;
        let mut scores = Vec::with_capacity(moves.len());

        for &mv in moves {
            let child = pos.play_unchecked(mv);
            self.path.push(child.key());
            let window_alpha = if full_window { -INFINITY } else { alpha };
            let result = self.negamax(&child, depth - 1, -INFINITY, -window_alpha, 1, false);
            self.path.pop();
            let score = -result?;

            if score > alpha {
                alpha = score;
            }
            scores.push((mv, score));
        }

        // Stable: equal scores keep ordering order
        scores.sort_by(|a, b| b.1.cmp(&a.1));
        if self.params.use_tt {
            let (best, score) = scores[0];
            self.tt.store(pos.key(), Some(best), score, depth, Bound::Exact, 0);
        }
        Some(scores)
    }

    fn out_of_time(&self) -> bool {
        self.tc.is_stopped() || (self.tc.should_check_time(self.stats.nodes) && self.tc.check_time())
    }

    fn static_eval(&self, pos: &Position) -> i32 {
        evaluate(pos, &self.params.eval, self.learner)
    }

    /// Draw by rule or by repeating a position already on the path.
    fn is_draw(&self, pos: &Position) -> bool {
        if pos.halfmove_clock() >= 100 {
            // Mate on the hundredth half-move stands over the fifty-move claim
            return pos.has_legal_moves() || !pos.in_check();
        }
        if pos.is_insufficient_material() {
            return true;
        }
        let earlier = &self.path[..self.path.len().saturating_sub(1)];
        earlier.contains(&pos.key())
    }

    fn negamax(
        &mut self,
        pos: &Position,
        depth: u8,
        mut alpha: i32,
        beta: i32,
        ply: u32,
        after_null: bool,
    ) -> Option<i32> {
        self.stats.nodes += 1;
        if self.out_of_time() {
            return None;
        }
        if self.is_draw(pos) {
            return Some(DRAW_SCORE);
        }

        if depth == 0 {
            return if self.params.quiescence {
                self.quiescence(pos, alpha, beta, ply, 0)
            } else {
                Some(self.leaf(pos, ply))
            };
        }

        let key = pos.key();
        let mut tt_move = None;
        if self.params.use_tt {
            tt_move = self.tt.best_move(key);
            if let Some(entry) = self.tt.probe(key, depth, ply) {
                self.stats.tt_hits += 1;
                if entry.cuts(alpha, beta) {
                    self.stats.tt_cutoffs += 1;
                    return Some(entry.score);
                }
            }
        }

        if null_move_allowed(pos, depth, ply, after_null, self.params) {
            if let Some(passed) = pos.null_move() {
                self.stats.null_tries += 1;
                let reduced = depth - 1 - self.params.null_move_reduction;
                self.path.push(passed.key());
                let result = self.negamax(&passed, reduced, -beta, -beta + 1, ply + 1, true);
                self.path.pop();
                let score = -result?;
                if score >= beta {
                    self.stats.null_cutoffs += 1;
                    // Unproven mates from a null search are not returned
                    return Some(if is_mate_score(score) { beta } else { score });
                }
            }
        }

        let mut moves = pos.legal_moves();
        if moves.is_empty() {
            return Some(if pos.in_check() { mated_in(ply) } else { DRAW_SCORE });
        }
        order_moves(pos, &mut moves, tt_move);

        let original_alpha = alpha;
        let mut best = -INFINITY;
        let mut best_move = None;
        for mv in moves {
            let child = pos.play_unchecked(mv);
            self.path.push(child.key());
            let result = self.negamax(&child, depth - 1, -beta, -alpha, ply + 1, false);
            self.path.pop();
            let score = -result?;

            if score > best {
                best = score;
                best_move = Some(mv);
            }
            if self.params.alpha_beta {
                if score > alpha {
                    alpha = score;
                }
                if alpha >= beta {
                    break;
                }
            }
        }

        if self.params.use_tt {
            let bound = if !self.params.alpha_beta {
                Bound::Exact
            } else if best <= original_alpha {
                Bound::Upper
            } else if best >= beta {
                Bound::Lower
            } else {
                Bound::Exact
            };
            self.tt.store(key, best_move, best, depth, bound, ply);
        }
        Some(best)
    }

    /// Horizon node without quiescence: terminal check, then static score.
    fn leaf(&self, pos: &Position, ply: u32) -> i32 {
        if pos.has_legal_moves() {
            self.static_eval(pos)
        } else if pos.in_check() {
            mated_in(ply)
        } else {
            DRAW_SCORE
        }
    }

    /// Resolve captures, promotions and (for the first few plies) checks
    /// until the position is quiet. In check, every evasion is searched.
    fn quiescence(&mut self, pos: &Position, mut alpha: i32, beta: i32, ply: u32, qply: u8) -> Option<i32> {
        self.stats.nodes += 1;
        self.stats.qnodes += 1;
        if self.out_of_time() {
            return None;
        }

        let legal = pos.legal_moves();
        let in_check = pos.in_check();
        if legal.is_empty() {
            return Some(if in_check { mated_in(ply) } else { DRAW_SCORE });
        }
        if qply >= self.params.quiescence_depth {
            return Some(self.static_eval(pos));
        }

        let mut best = -INFINITY;
        let mut moves = if in_check {
            legal
        } else {
            let stand_pat = self.static_eval(pos);
            if stand_pat >= beta && self.params.alpha_beta {
                return Some(stand_pat);
            }
            best = stand_pat;
            if self.params.alpha_beta && stand_pat > alpha {
                alpha = stand_pat;
            }
            let with_checks = qply < self.params.quiescence_check_plies;
            legal
                .into_iter()
                .filter(|&mv| mv.is_tactical() || (with_checks && pos.gives_check(mv)))
                .collect()
        };
        order_moves(pos, &mut moves, None);

        for mv in moves {
            let child = pos.play_unchecked(mv);
            let score = -self.quiescence(&child, -beta, -alpha, ply + 1, qply + 1)?;
            if score > best {
                best = score;
            }
            if self.params.alpha_beta {
                if score > alpha {
                    alpha = score;
                }
                if alpha >= beta {
                    break;
                }
            }
        }
        Some(best)
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod search_tests;
