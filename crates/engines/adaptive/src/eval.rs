//! Static evaluation.
//!
//! Material is always counted. The positional terms (piece-square tables,
//! pawn structure, king safety, mobility, piece coordination) and the learned
//! blend can be switched off through [`EvalSettings`]. All terms are summed
//! from White's point of view and the total is returned for the side to move.

use chess_core::{
    bishop_attacks, file_of, knight_attacks, king_attacks, queen_attacks, relative_rank,
    rook_attacks, Bitboard, Color, PieceKind, Position,
};

use crate::learning::{AdaptiveLearner, LearnedRecord};
use crate::pst::pst_value;

/// Material values in centipawns, indexed by PieceKind::idx().
/// Order: Pawn, Knight, Bishop, Rook, Queen, King
/// Minor pieces sit on the 3-pawn scale with a small edge for the bishop.
pub const PIECE_VALUES: [i32; 6] = [100, 320, 330, 500, 900, 0];

const DOUBLED_PAWN: i32 = 10;
const ISOLATED_PAWN: i32 = 20;
const BACKWARD_PAWN: i32 = 8;
const PASSED_PAWN: [i32; 8] = [0, 10, 20, 40, 60, 90, 120, 0];
const PAWN_SHIELD: i32 = 10;
const KING_ATTACK_UNIT: i32 = 5;
const BISHOP_PAIR: i32 = 30;
const ROOK_OPEN_FILE: i32 = 20;
const ROOK_SEMI_OPEN_FILE: i32 = 10;
const KNIGHT_OUTPOST: i32 = 15;

/// Evaluation switches, copied into every search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalSettings {
    pub positional: bool,
    pub learning: bool,
    /// Largest share of the learned score in the blend.
    pub blend_weight: f64,
    /// Visits needed before a record reaches `blend_weight`.
    pub blend_visits: u32,
}

impl Default for EvalSettings {
    fn default() -> Self {
        Self {
            positional: true,
            learning: true,
            blend_weight: 0.5,
            blend_visits: 20,
        }
    }
}

#[inline]
pub fn piece_value(kind: PieceKind) -> i32 {
    PIECE_VALUES[kind.idx()]
}

/// Score of `pos` for the side to move, in centipawns.
pub fn evaluate(pos: &Position, settings: &EvalSettings, learner: Option<&AdaptiveLearner>) -> i32 {
    let mut score = material(pos);
    if settings.positional {
        score += positional(pos);
    }
    let score = score * pos.side_to_move().sign();

    if settings.learning {
        if let Some(record) = learner.and_then(|l| l.learned(pos.key())) {
            return blend(score, record, settings);
        }
    }
    score
}

/// White material minus Black material.
pub fn material(pos: &Position) -> i32 {
    PieceKind::ALL
        .iter()
        .map(|&kind| {
            let white = pos.pieces(Color::White, kind).popcount() as i32;
            let black = pos.pieces(Color::Black, kind).popcount() as i32;
            piece_value(kind) * (white - black)
        })
        .sum()
}

/// Convert an expected score in (0, 1) to centipawns on the usual logistic scale.
pub fn expected_score_to_cp(p: f64) -> i32 {
    let p = p.clamp(0.01, 0.99);
    (400.0 * (p / (1.0 - p)).log10()).round() as i32
}

/// Mix a static score with a learned record. The learned share grows with
/// visits and never exceeds `blend_weight`.
pub fn blend(static_score: i32, record: LearnedRecord, settings: &EvalSettings) -> i32 {
    let confidence = (record.visits as f64 / settings.blend_visits.max(1) as f64).min(1.0);
    let weight = settings.blend_weight.clamp(0.0, 1.0) * confidence;
    let learned = expected_score_to_cp(record.score) as f64;
    ((1.0 - weight) * static_score as f64 + weight * learned).round() as i32
}

/// Both sides have at most three pieces besides pawns and king, or one side
/// is down to a lone queen.
pub fn is_endgame(pos: &Position) -> bool {
    let count = |color: Color| {
        [PieceKind::Knight, PieceKind::Bishop, PieceKind::Rook, PieceKind::Queen]
            .iter()
            .map(|&k| pos.pieces(color, k).popcount())
            .sum::<u32>()
    };
    let white = count(Color::White);
    let black = count(Color::Black);
    let lone_queen = |color: Color, n: u32| n == 1 && pos.pieces(color, PieceKind::Queen).popcount() == 1;
    (white <= 3 && black <= 3) || lone_queen(Color::White, white) || lone_queen(Color::Black, black)
}

fn positional(pos: &Position) -> i32 {
    let endgame = is_endgame(pos);
    let mut score = 0;
    for color in Color::ALL {
        let side = piece_squares(pos, color, endgame)
            + pawn_structure(pos, color)
            + mobility(pos, color)
            + coordination(pos, color)
            + if endgame { 0 } else { king_safety(pos, color) };
        score += side * color.sign();
    }
    score
}

fn piece_squares(pos: &Position, color: Color, endgame: bool) -> i32 {
    let mut score = 0;
    for kind in PieceKind::ALL {
        for sq in pos.pieces(color, kind) {
            score += pst_value(kind, color, sq, endgame);
        }
    }
    score
}

fn pawn_structure(pos: &Position, color: Color) -> i32 {
    let ours = pos.pieces(color, PieceKind::Pawn);
    let theirs = pos.pieces(color.other(), PieceKind::Pawn);
    let their_attacks = theirs.pawn_attacks(color.other());
    let mut score = 0;

    for file in 0..8u8 {
        let count = (ours & Bitboard::file(file)).popcount() as i32;
        if count > 1 {
            score -= DOUBLED_PAWN * (count - 1);
        }
    }

    for sq in ours {
        let file = file_of(sq) as u8;
        let neighbours = ours & Bitboard::adjacent_files(file);

        if neighbours.is_empty() {
            score -= ISOLATED_PAWN;
        } else if is_backward(color, sq, neighbours, their_attacks) {
            score -= BACKWARD_PAWN;
        }

        if (Bitboard::front_span(color, sq) & theirs).is_empty() {
            score += PASSED_PAWN[relative_rank(color, sq) as usize];
        }
    }
    score
}

/// No friendly pawn on an adjacent file level with or behind it, and the
/// square in front is covered by an enemy pawn.
fn is_backward(color: Color, sq: u8, mut neighbours: Bitboard, their_attacks: Bitboard) -> bool {
    let rank = relative_rank(color, sq);
    let supported = neighbours.any(|n| relative_rank(color, n) <= rank);
    if supported {
        return false;
    }
    let stop = match color {
        Color::White => sq.checked_add(8).filter(|s| *s < 64),
        Color::Black => sq.checked_sub(8),
    };
    stop.map(|s| their_attacks.contains(s)).unwrap_or(false)
}

fn king_safety(pos: &Position, color: Color) -> i32 {
    let king = pos.king_square(color);
    let mut score = 0;

    if relative_rank(color, king) == 0 {
        let files = Bitboard::file(file_of(king) as u8) | Bitboard::adjacent_files(file_of(king) as u8);
        let shield_ranks = match color {
            Color::White => Bitboard::rank(1) | Bitboard::rank(2),
            Color::Black => Bitboard::rank(6) | Bitboard::rank(5),
        };
        let shield = pos.pieces(color, PieceKind::Pawn) & files & shield_ranks;
        score += PAWN_SHIELD * shield.popcount() as i32;
    }

    let zone = king_attacks(king) | Bitboard::from_square(king);
    let occupied = pos.occupied();
    let enemy = color.other();
    let mut pressure = 0;
    for (kind, weight) in [
        (PieceKind::Knight, 2),
        (PieceKind::Bishop, 2),
        (PieceKind::Rook, 3),
        (PieceKind::Queen, 5),
    ] {
        for sq in pos.pieces(enemy, kind) {
            let attacks = match kind {
                PieceKind::Knight => knight_attacks(sq),
                PieceKind::Bishop => bishop_attacks(sq, occupied),
                PieceKind::Rook => rook_attacks(sq, occupied),
                _ => queen_attacks(sq, occupied),
            };
            if !(attacks & zone).is_empty() {
                pressure += weight;
            }
        }
    }
    score - pressure * KING_ATTACK_UNIT
}

/// Reachable squares not occupied by own pieces, per piece type.
fn mobility(pos: &Position, color: Color) -> i32 {
    let occupied = pos.occupied();
    let own = pos.color_occupied(color);
    let mut score = 0;
    for sq in pos.pieces(color, PieceKind::Knight) {
        score += 4 * (knight_attacks(sq) & !own).popcount() as i32;
    }
    for sq in pos.pieces(color, PieceKind::Bishop) {
        score += 3 * (bishop_attacks(sq, occupied) & !own).popcount() as i32;
    }
    for sq in pos.pieces(color, PieceKind::Rook) {
        score += 2 * (rook_attacks(sq, occupied) & !own).popcount() as i32;
    }
    for sq in pos.pieces(color, PieceKind::Queen) {
        score += (queen_attacks(sq, occupied) & !own).popcount() as i32;
    }
    score
}

fn coordination(pos: &Position, color: Color) -> i32 {
    let mut score = 0;
    if pos.pieces(color, PieceKind::Bishop).popcount() >= 2 {
        score += BISHOP_PAIR;
    }

    let our_pawns = pos.pieces(color, PieceKind::Pawn);
    let their_pawns = pos.pieces(color.other(), PieceKind::Pawn);
    for sq in pos.pieces(color, PieceKind::Rook) {
        let file = Bitboard::file(file_of(sq) as u8);
        if (file & our_pawns).is_empty() {
            score += if (file & their_pawns).is_empty() {
                ROOK_OPEN_FILE
            } else {
                ROOK_SEMI_OPEN_FILE
            };
        }
    }

    let pawn_cover = our_pawns.pawn_attacks(color);
    for sq in pos.pieces(color, PieceKind::Knight) {
        let rank = relative_rank(color, sq);
        if !(3..=5).contains(&rank) || !pawn_cover.contains(sq) {
            continue;
        }
        let challengers = Bitboard::front_span(color, sq) & Bitboard::adjacent_files(file_of(sq) as u8);
        if (challengers & their_pawns).is_empty() {
            score += KNIGHT_OUTPOST;
        }
    }
    score
}

#[cfg(test)]
#[path = "eval_tests.rs"]
mod eval_tests;
