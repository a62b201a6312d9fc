//! Zobrist hashing for chess positions.
//!
//! Position identity for the transposition table, the opening book and the
//! learning store. Keys must be stable across runs and builds because the
//! book and the learning store persist them, so the table is generated at
//! compile time from a fixed seed rather than taken from the rules backend.
//!
//! The hash is computed by XOR-ing together random values for:
//! - Each piece on each square (12 pieces × 64 squares = 768 values)
//! - Side to move (1 value)
//! - Castling rights (4 values)
//! - En passant file (8 values), only when an en-passant capture is available

use crate::types::{Color, Piece};

/// Pre-computed random values for Zobrist hashing.
pub struct ZobristKeys {
    /// Indexed by [color][piece_kind][square]
    pub pieces: [[[u64; 64]; 6]; 2],
    /// XOR-ed in when Black is to move
    pub side_to_move: u64,
    /// [white short, white long, black short, black long]
    pub castling: [u64; 4],
    pub en_passant: [u64; 8],
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl ZobristKeys {
    /// Generate keys with xorshift64 from a fixed seed.
    pub const fn new() -> Self {
        const fn xorshift64(mut state: u64) -> u64 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        }

        let mut state = 0x123456789ABCDEF0u64;

        let mut pieces = [[[0u64; 64]; 6]; 2];
        let mut color = 0;
        while color < 2 {
            let mut piece = 0;
            while piece < 6 {
                let mut sq = 0;
                while sq < 64 {
                    state = xorshift64(state);
                    pieces[color][piece][sq] = state;
                    sq += 1;
                }
                piece += 1;
            }
            color += 1;
        }

        state = xorshift64(state);
        let side_to_move = state;

        let mut castling = [0u64; 4];
        let mut i = 0;
        while i < 4 {
            state = xorshift64(state);
            castling[i] = state;
            i += 1;
        }

        let mut en_passant = [0u64; 8];
        let mut i = 0;
        while i < 8 {
            state = xorshift64(state);
            en_passant[i] = state;
            i += 1;
        }

        ZobristKeys {
            pieces,
            side_to_move,
            castling,
            en_passant,
        }
    }

    #[inline(always)]
    pub fn piece_key(&self, piece: Piece, sq: u8) -> u64 {
        self.pieces[piece.color.idx()][piece.kind.idx()][sq as usize]
    }

    /// Castling right index: 0 = white short, 1 = white long, 2 = black short, 3 = black long.
    #[inline(always)]
    pub fn castling_key(&self, index: usize) -> u64 {
        self.castling[index]
    }

    #[inline(always)]
    pub fn ep_key(&self, file: u8) -> u64 {
        self.en_passant[file as usize]
    }

    /// Full key from the components of a position.
    pub fn hash(
        &self,
        pieces: impl IntoIterator<Item = (Piece, u8)>,
        side_to_move: Color,
        castling: [bool; 4],
        ep_file: Option<u8>,
    ) -> u64 {
        let mut key = 0u64;
        for (piece, sq) in pieces {
            key ^= self.piece_key(piece, sq);
        }
        if side_to_move == Color::Black {
            key ^= self.side_to_move;
        }
        for (i, has) in castling.iter().enumerate() {
            if *has {
                key ^= self.castling_key(i);
            }
        }
        if let Some(file) = ep_file {
            key ^= self.ep_key(file);
        }
        key
    }
}

/// Global static Zobrist keys, computed at compile time.
pub static ZOBRIST: ZobristKeys = ZobristKeys::new();

#[cfg(test)]
#[path = "zobrist_tests.rs"]
mod zobrist_tests;
