//! Square sets for evaluation.
//!
//! Bit 0 = a1, bit 1 = b1, ..., bit 63 = h8. The rules backend has its own set
//! type; positions hand out this one so evaluation code never depends on it.

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, Not};

use crate::types::{file_of, rank_of, Color};

/// A bitboard representing a set of squares on the chess board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bitboard(pub u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);

    pub const FILE_A: Bitboard = Bitboard(0x0101010101010101);
    pub const FILE_H: Bitboard = Bitboard(0x8080808080808080);
    pub const RANK_1: Bitboard = Bitboard(0x00000000000000FF);

    pub const NOT_FILE_A: Bitboard = Bitboard(!0x0101010101010101);
    pub const NOT_FILE_H: Bitboard = Bitboard(!0x8080808080808080);

    #[inline(always)]
    pub const fn from_square(sq: u8) -> Self {
        Bitboard(1u64 << sq)
    }

    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub const fn contains(self, sq: u8) -> bool {
        (self.0 & (1u64 << sq)) != 0
    }

    #[inline(always)]
    pub const fn popcount(self) -> u32 {
        self.0.count_ones()
    }

    #[inline(always)]
    pub fn pop_lsb(&mut self) -> Option<u8> {
        if self.0 == 0 {
            None
        } else {
            let sq = self.0.trailing_zeros() as u8;
            self.0 &= self.0 - 1;
            Some(sq)
        }
    }

    /// All squares of one file (0 = a).
    #[inline(always)]
    pub const fn file(file: u8) -> Bitboard {
        Bitboard(Self::FILE_A.0 << file)
    }

    /// All squares of one rank (0 = rank 1).
    #[inline(always)]
    pub const fn rank(rank: u8) -> Bitboard {
        Bitboard(Self::RANK_1.0 << (rank * 8))
    }

    /// The files directly left and right of `file`.
    pub fn adjacent_files(file: u8) -> Bitboard {
        let mut bb = Bitboard::EMPTY;
        if file > 0 {
            bb |= Bitboard::file(file - 1);
        }
        if file < 7 {
            bb |= Bitboard::file(file + 1);
        }
        bb
    }

    /// Squares strictly in front of `sq` from `color`'s point of view, on the
    /// same file and both adjacent files. A pawn with no enemy pawns in this
    /// span is passed.
    pub fn front_span(color: Color, sq: u8) -> Bitboard {
        let files = Bitboard::file(file_of(sq) as u8) | Bitboard::adjacent_files(file_of(sq) as u8);
        files & Bitboard::ranks_ahead(color, rank_of(sq) as u8)
    }

    /// Ranks strictly ahead of `rank` for `color`.
    pub fn ranks_ahead(color: Color, rank: u8) -> Bitboard {
        match color {
            Color::White if rank >= 7 => Bitboard::EMPTY,
            Color::White => Bitboard(!0u64 << ((rank + 1) * 8)),
            Color::Black if rank == 0 => Bitboard::EMPTY,
            Color::Black => Bitboard(!0u64 >> ((8 - rank) * 8)),
        }
    }

    /// Squares attacked by a set of pawns of `color`.
    pub fn pawn_attacks(self, color: Color) -> Bitboard {
        match color {
            Color::White => Bitboard(
                ((self.0 << 9) & Self::NOT_FILE_A.0) | ((self.0 << 7) & Self::NOT_FILE_H.0),
            ),
            Color::Black => Bitboard(
                ((self.0 >> 7) & Self::NOT_FILE_A.0) | ((self.0 >> 9) & Self::NOT_FILE_H.0),
            ),
        }
    }
}

impl BitAnd for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 & rhs.0)
    }
}

impl BitAndAssign for Bitboard {
    #[inline(always)]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl BitOr for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 | rhs.0)
    }
}

impl BitOrAssign for Bitboard {
    #[inline(always)]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitXor for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 ^ rhs.0)
    }
}

impl Not for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self::Output {
        Bitboard(!self.0)
    }
}

/// Iterator over set squares, lowest first.
impl Iterator for Bitboard {
    type Item = u8;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        self.pop_lsb()
    }
}

#[cfg(test)]
#[path = "bitboard_tests.rs"]
mod bitboard_tests;
