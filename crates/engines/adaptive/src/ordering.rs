//! Move ordering for alpha-beta pruning.
//!
//! Order: the transposition-table move, captures by MVV-LVA (most valuable
//! victim, least valuable attacker), promotions, checking moves, then the
//! remaining quiet moves in generation order.

use std::cmp::Reverse;

use chess_core::{Move, PieceKind, Position};

use crate::eval::piece_value;

pub const TT_MOVE_SCORE: i32 = 1_000_000;
const CAPTURE_BASE: i32 = 100_000;
const PROMOTION_BASE: i32 = 90_000;
const CHECK_SCORE: i32 = 80_000;

/// Ordering key of a single move; higher is tried first.
pub fn move_score(pos: &Position, mv: Move, tt_move: Option<Move>) -> i32 {
    if tt_move.is_some_and(|t| t.same_squares(&mv)) {
        return TT_MOVE_SCORE;
    }

    if mv.is_capture {
        let victim = if mv.is_en_passant {
            PieceKind::Pawn
        } else {
            pos.piece_at(mv.to).map_or(PieceKind::Pawn, |p| p.kind)
        };
        let attacker = pos.piece_at(mv.from).map_or(PieceKind::Pawn, |p| p.kind);
        let promo = mv.promo.map_or(0, piece_value);
        // Kings have no material value; rank them as the least willing attacker
        let attacker_value = match attacker {
            PieceKind::King => piece_value(PieceKind::Queen) + 100,
            kind => piece_value(kind),
        };
        return CAPTURE_BASE + piece_value(victim) * 10 - attacker_value + promo;
    }

    if let Some(promo) = mv.promo {
        return PROMOTION_BASE + piece_value(promo);
    }

    if pos.gives_check(mv) {
        return CHECK_SCORE;
    }
    0
}

/// Sort `moves` best first. Ties keep their generation order.
pub fn order_moves(pos: &Position, moves: &mut [Move], tt_move: Option<Move>) {
    moves.sort_by_cached_key(|&mv| Reverse(move_score(pos, mv, tt_move)));
}

#[cfg(test)]
#[path = "ordering_tests.rs"]
mod ordering_tests;
