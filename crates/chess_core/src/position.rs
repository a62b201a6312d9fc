//! Immutable position adapter over the `cozy-chess` rules backend.
//!
//! Everything else in the workspace sees chess rules only through
//! [`Position`]: legal move generation, move application, check and
//! terminal-state detection, piece queries and the Zobrist key. Applying a
//! move returns a new position; the receiver is never modified, so search
//! recursion and caller-owned positions cannot interfere.

use std::fmt;

use cozy_chess::{Board, File, Rank, Square};

use crate::attacks::pawn_attacks;
use crate::bitboard::Bitboard;
use crate::error::{CoreError, CoreResult};
use crate::types::*;
use crate::zobrist::ZOBRIST;

pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    board: Board,
    key: u64,
}

#[inline]
pub(crate) fn to_cozy_square(sq: u8) -> Square {
    Square::index(sq as usize)
}

#[inline]
fn to_cozy_color(color: Color) -> cozy_chess::Color {
    match color {
        Color::White => cozy_chess::Color::White,
        Color::Black => cozy_chess::Color::Black,
    }
}

#[inline]
fn from_cozy_color(color: cozy_chess::Color) -> Color {
    match color {
        cozy_chess::Color::White => Color::White,
        cozy_chess::Color::Black => Color::Black,
    }
}

#[inline]
fn to_cozy_piece(kind: PieceKind) -> cozy_chess::Piece {
    match kind {
        PieceKind::Pawn => cozy_chess::Piece::Pawn,
        PieceKind::Knight => cozy_chess::Piece::Knight,
        PieceKind::Bishop => cozy_chess::Piece::Bishop,
        PieceKind::Rook => cozy_chess::Piece::Rook,
        PieceKind::Queen => cozy_chess::Piece::Queen,
        PieceKind::King => cozy_chess::Piece::King,
    }
}

#[inline]
fn from_cozy_piece(piece: cozy_chess::Piece) -> PieceKind {
    match piece {
        cozy_chess::Piece::Pawn => PieceKind::Pawn,
        cozy_chess::Piece::Knight => PieceKind::Knight,
        cozy_chess::Piece::Bishop => PieceKind::Bishop,
        cozy_chess::Piece::Rook => PieceKind::Rook,
        cozy_chess::Piece::Queen => PieceKind::Queen,
        cozy_chess::Piece::King => PieceKind::King,
    }
}

impl Position {
    pub fn startpos() -> Self {
        Self::from_board(Board::default())
    }

    pub fn from_fen(fen: &str) -> CoreResult<Self> {
        let board = Board::from_fen(fen.trim(), false).map_err(|e| CoreError::InvalidFen {
            fen: fen.to_string(),
            reason: format!("{e:?}"),
        })?;
        Ok(Self::from_board(board))
    }

    fn from_board(board: Board) -> Self {
        let mut pos = Position { board, key: 0 };
        pos.key = pos.compute_key();
        pos
    }

    fn compute_key(&self) -> u64 {
        let pieces = self.occupied().filter_map(|sq| self.piece_at(sq).map(|p| (p, sq)));
        ZOBRIST.hash(
            pieces,
            self.side_to_move(),
            self.castling(),
            self.capturable_en_passant_file(),
        )
    }

    /// Zobrist key; identical positions (board, side, castling, capturable
    /// en passant) share a key regardless of move counters.
    #[inline]
    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn fen(&self) -> String {
        self.board.to_string()
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        from_cozy_color(self.board.side_to_move())
    }

    pub fn piece_at(&self, sq: u8) -> Option<Piece> {
        let cozy_sq = to_cozy_square(sq);
        let kind = self.board.piece_on(cozy_sq)?;
        let color = self.board.color_on(cozy_sq)?;
        Some(Piece {
            color: from_cozy_color(color),
            kind: from_cozy_piece(kind),
        })
    }

    #[inline]
    pub fn pieces(&self, color: Color, kind: PieceKind) -> Bitboard {
        Bitboard(
            self.board
                .colored_pieces(to_cozy_color(color), to_cozy_piece(kind))
                .0,
        )
    }

    /// Both colors' pieces of one kind.
    #[inline]
    pub fn pieces_of_kind(&self, kind: PieceKind) -> Bitboard {
        Bitboard(self.board.pieces(to_cozy_piece(kind)).0)
    }

    #[inline]
    pub fn color_occupied(&self, color: Color) -> Bitboard {
        Bitboard(self.board.colors(to_cozy_color(color)).0)
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        Bitboard(self.board.occupied().0)
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> u8 {
        self.board.king(to_cozy_color(color)) as u8
    }

    /// [white short, white long, black short, black long]
    pub fn castling(&self) -> [bool; 4] {
        let white = self.board.castle_rights(cozy_chess::Color::White);
        let black = self.board.castle_rights(cozy_chess::Color::Black);
        [
            white.short.is_some(),
            white.long.is_some(),
            black.short.is_some(),
            black.long.is_some(),
        ]
    }

    /// File of the en-passant target square, if the last move was a double push.
    pub fn en_passant_file(&self) -> Option<u8> {
        self.board.en_passant().map(|f| f as u8)
    }

    /// En-passant file only when a pawn of the side to move can actually capture.
    fn capturable_en_passant_file(&self) -> Option<u8> {
        let file = self.en_passant_file()?;
        let us = self.side_to_move();
        let target_rank = match us {
            Color::White => 5,
            Color::Black => 2,
        };
        let target = sq(file as i8, target_rank)?;
        let attackers = pawn_attacks(target, us.other()) & self.pieces(us, PieceKind::Pawn);
        if attackers.is_empty() {
            None
        } else {
            Some(file)
        }
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.board.halfmove_clock() as u32
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.board.fullmove_number() as u32
    }

    /// Half-moves played since the standard starting position, from the
    /// fullmove counter.
    pub fn ply(&self) -> u32 {
        let base = self.fullmove_number().saturating_sub(1) * 2;
        match self.side_to_move() {
            Color::White => base,
            Color::Black => base + 1,
        }
    }

    #[inline]
    pub fn in_check(&self) -> bool {
        !self.board.checkers().is_empty()
    }

    /// Whether `color` has anything besides pawns and king.
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        let pawns_and_kings =
            self.pieces(color, PieceKind::Pawn) | self.pieces(color, PieceKind::King);
        !(self.color_occupied(color) & !pawns_and_kings).is_empty()
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        self.board.generate_moves(|piece_moves| {
            let kind = from_cozy_piece(piece_moves.piece);
            for mv in piece_moves {
                moves.push(self.from_cozy_move(kind, mv));
            }
            false
        });
        moves
    }

    pub fn has_legal_moves(&self) -> bool {
        self.board.generate_moves(|_| true)
    }

    fn from_cozy_move(&self, kind: PieceKind, mv: cozy_chess::Move) -> Move {
        let stm = self.board.side_to_move();
        let them = to_cozy_color(from_cozy_color(stm).other());
        let from = mv.from as u8;
        let mut to = mv.to as u8;
        let mut is_castle = false;
        let mut is_en_passant = false;
        let mut is_capture = self.board.color_on(mv.to) == Some(them);

        if kind == PieceKind::King && self.board.color_on(mv.to) == Some(stm) {
            // Backend encodes castling as king-takes-rook.
            is_castle = true;
            is_capture = false;
            let dest_file = if (mv.to.file() as u8) > (mv.from.file() as u8) { 6 } else { 2 };
            to = rank_of(from) as u8 * 8 + dest_file;
        } else if kind == PieceKind::Pawn
            && mv.from.file() != mv.to.file()
            && self.board.piece_on(mv.to).is_none()
        {
            is_en_passant = true;
            is_capture = true;
        }

        Move {
            from,
            to,
            promo: mv.promotion.map(from_cozy_piece),
            is_capture,
            is_en_passant,
            is_castle,
        }
    }

    fn to_cozy_move(&self, mv: Move) -> cozy_chess::Move {
        let from = to_cozy_square(mv.from);
        let mut to = to_cozy_square(mv.to);
        let is_king = self.board.piece_on(from) == Some(cozy_chess::Piece::King);
        if is_king && (file_of(mv.from) - file_of(mv.to)).abs() == 2 {
            let rights = self.board.castle_rights(self.board.side_to_move());
            let rook_file = if file_of(mv.to) > file_of(mv.from) {
                rights.short
            } else {
                rights.long
            };
            if let Some(file) = rook_file {
                to = Square::new(file, from.rank());
            }
        }
        cozy_chess::Move {
            from,
            to,
            promotion: mv.promo.map(to_cozy_piece),
        }
    }

    pub fn is_legal(&self, mv: Move) -> bool {
        self.board.is_legal(self.to_cozy_move(mv))
    }

    /// Apply a move, returning the successor position.
    pub fn play(&self, mv: Move) -> CoreResult<Position> {
        let cozy_mv = self.to_cozy_move(mv);
        if !self.board.is_legal(cozy_mv) {
            return Err(CoreError::IllegalMove {
                mv: mv.to_string(),
                fen: self.fen(),
            });
        }
        let mut board = self.board.clone();
        board.play_unchecked(cozy_mv);
        Ok(Self::from_board(board))
    }

    /// Apply a move taken from [`Position::legal_moves`] of this position
    /// without re-checking legality. Search loops use this.
    pub fn play_unchecked(&self, mv: Move) -> Position {
        let mut board = self.board.clone();
        board.play_unchecked(self.to_cozy_move(mv));
        Self::from_board(board)
    }

    /// Pass the turn. `None` when the side to move is in check.
    pub fn null_move(&self) -> Option<Position> {
        self.board.null_move().map(Self::from_board)
    }

    /// Whether a legal move leaves the opponent in check.
    pub fn gives_check(&self, mv: Move) -> bool {
        self.play(mv).map(|next| next.in_check()).unwrap_or(false)
    }

    /// Neither side can possibly mate: bare kings, a single minor piece, or
    /// bishops that all stand on one square color.
    pub fn is_insufficient_material(&self) -> bool {
        let heavy_or_pawns = self.pieces_of_kind(PieceKind::Pawn)
            | self.pieces_of_kind(PieceKind::Rook)
            | self.pieces_of_kind(PieceKind::Queen);
        if !heavy_or_pawns.is_empty() {
            return false;
        }
        let knights = self.pieces_of_kind(PieceKind::Knight);
        let bishops = self.pieces_of_kind(PieceKind::Bishop);
        let minors = knights.popcount() + bishops.popcount();
        if minors <= 1 {
            return true;
        }
        if !knights.is_empty() {
            return false;
        }
        const DARK_SQUARES: u64 = 0xAA55_AA55_AA55_AA55;
        let on_dark = bishops.0 & DARK_SQUARES;
        on_dark == 0 || on_dark == bishops.0
    }

    /// Rules status of this position alone. Repetition needs game history and
    /// is judged by callers from [`Position::key`].
    pub fn status(&self) -> GameStatus {
        if !self.has_legal_moves() {
            return if self.in_check() {
                GameStatus::Checkmate
            } else {
                GameStatus::Draw(DrawReason::Stalemate)
            };
        }
        if self.halfmove_clock() >= 100 {
            return GameStatus::Draw(DrawReason::FiftyMove);
        }
        if self.is_insufficient_material() {
            return GameStatus::Draw(DrawReason::InsufficientMaterial);
        }
        GameStatus::Ongoing
    }

    /// Resolve coordinate text (e2e4, e7e8q, e1g1) against the legal moves.
    pub fn parse_move(&self, text: &str) -> CoreResult<Move> {
        let txt = text.trim();
        if txt.len() < 4 || txt.len() > 5 || !txt.is_ascii() {
            return Err(CoreError::InvalidMoveText(text.to_string()));
        }
        let from =
            coord_to_sq(&txt[0..2]).ok_or_else(|| CoreError::InvalidMoveText(text.to_string()))?;
        let to =
            coord_to_sq(&txt[2..4]).ok_or_else(|| CoreError::InvalidMoveText(text.to_string()))?;
        let promo = match txt.chars().nth(4) {
            Some(c) => Some(
                PieceKind::from_promotion_char(c)
                    .ok_or_else(|| CoreError::InvalidMoveText(text.to_string()))?,
            ),
            None => None,
        };
        let wanted = Move {
            promo,
            ..Move::new(from, to)
        };
        self.legal_moves()
            .into_iter()
            .find(|m| m.same_squares(&wanted))
            .ok_or_else(|| CoreError::IllegalMove {
                mv: text.to_string(),
                fen: self.fen(),
            })
    }

    /// Resolve a flag-less move (from book data or persisted text) to the
    /// matching legal move, if any.
    pub fn resolve(&self, mv: Move) -> Option<Move> {
        self.legal_moves().into_iter().find(|m| m.same_squares(&mv))
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            for file in 0..8 {
                let square = Square::new(File::index(file), Rank::index(rank));
                let c = match self.piece_at(square as u8) {
                    Some(p) => {
                        let ch = p.kind.to_char();
                        if p.color == Color::White {
                            ch.to_ascii_uppercase()
                        } else {
                            ch
                        }
                    }
                    None => '.',
                };
                write!(f, "{c}")?;
                if file < 7 {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "{}", self.fen())
    }
}

#[cfg(test)]
#[path = "position_tests.rs"]
mod position_tests;
