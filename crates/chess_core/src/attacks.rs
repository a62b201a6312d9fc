//! Attack sets for single pieces, backed by the rules library's lookup tables.
//!
//! Evaluation needs attack sets independent of move legality (mobility, king
//! zone pressure, outposts). These functions expose them in this crate's
//! square and set types.

use cozy_chess::{get_bishop_moves, get_king_moves, get_knight_moves, get_rook_moves, BitBoard};

use crate::bitboard::Bitboard;
use crate::position::to_cozy_square;
use crate::types::Color;

#[inline]
fn from_cozy(bb: BitBoard) -> Bitboard {
    Bitboard(bb.0)
}

#[inline]
pub fn knight_attacks(sq: u8) -> Bitboard {
    from_cozy(get_knight_moves(to_cozy_square(sq)))
}

#[inline]
pub fn king_attacks(sq: u8) -> Bitboard {
    from_cozy(get_king_moves(to_cozy_square(sq)))
}

#[inline]
pub fn bishop_attacks(sq: u8, occupied: Bitboard) -> Bitboard {
    from_cozy(get_bishop_moves(to_cozy_square(sq), BitBoard(occupied.0)))
}

#[inline]
pub fn rook_attacks(sq: u8, occupied: Bitboard) -> Bitboard {
    from_cozy(get_rook_moves(to_cozy_square(sq), BitBoard(occupied.0)))
}

#[inline]
pub fn queen_attacks(sq: u8, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

#[inline]
pub fn pawn_attacks(sq: u8, color: Color) -> Bitboard {
    Bitboard::from_square(sq).pawn_attacks(color)
}

#[cfg(test)]
#[path = "attacks_tests.rs"]
mod attacks_tests;
