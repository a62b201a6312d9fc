//! Opening book.
//!
//! A book file is a sequence of 16-byte big-endian records sorted by key:
//!
//! | bytes | field  |
//! |-------|--------|
//! | 0-7   | position key (this engine's Zobrist key) |
//! | 8-9   | move: bits 0-5 to, 6-11 from, 12-14 promotion (1 N, 2 B, 3 R, 4 Q) |
//! | 10-11 | weight |
//! | 12-15 | learn counter, carried but unused |
//!
//! Castling is stored as king-takes-rook (e1h1) and turned back into the
//! king's two-square step when read. A file that cannot be used disables the
//! book with a warning; it never stops the engine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chess_core::{file_of, play_uci_line, rank_of, CoreResult, Move, PieceKind, Position};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::{info, warn};

use crate::config::BookConfig;
use crate::error::{EngineError, EngineResult, EngineWarning};
use crate::learning::AdaptiveLearner;
use crate::style::{trap_moves, CandidateKind, OpeningStyle};

pub const RECORD_SIZE: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BookEntry {
    pub key: u64,
    pub raw_move: u16,
    pub weight: u16,
    pub learn: u32,
}

impl BookEntry {
    fn from_bytes(b: &[u8]) -> Self {
        let mut key = [0u8; 8];
        key.copy_from_slice(&b[0..8]);
        let mut learn = [0u8; 4];
        learn.copy_from_slice(&b[12..16]);
        Self {
            key: u64::from_be_bytes(key),
            raw_move: u16::from_be_bytes([b[8], b[9]]),
            weight: u16::from_be_bytes([b[10], b[11]]),
            learn: u32::from_be_bytes(learn),
        }
    }

    fn to_bytes(self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        out[0..8].copy_from_slice(&self.key.to_be_bytes());
        out[8..10].copy_from_slice(&self.raw_move.to_be_bytes());
        out[10..12].copy_from_slice(&self.weight.to_be_bytes());
        out[12..16].copy_from_slice(&self.learn.to_be_bytes());
        out
    }
}

/// Encode a legal move. Castling moves must carry their flag so they can be
/// written king-to-rook.
pub fn encode_move(mv: Move) -> u16 {
    let to = if mv.is_castle {
        let rook_file = if file_of(mv.to) > file_of(mv.from) { 7 } else { 0 };
        rank_of(mv.from) as u8 * 8 + rook_file
    } else {
        mv.to
    };
    let promo: u16 = match mv.promo {
        Some(PieceKind::Knight) => 1,
        Some(PieceKind::Bishop) => 2,
        Some(PieceKind::Rook) => 3,
        Some(PieceKind::Queen) => 4,
        _ => 0,
    };
    (to as u16) | ((mv.from as u16) << 6) | (promo << 12)
}

/// Decode a stored move against the position it belongs to. None if the
/// move is not legal there.
pub fn decode_move(raw: u16, pos: &Position) -> Option<Move> {
    let from = ((raw >> 6) & 0x3f) as u8;
    let mut to = (raw & 0x3f) as u8;
    let promo = match (raw >> 12) & 0x7 {
        1 => Some(PieceKind::Knight),
        2 => Some(PieceKind::Bishop),
        3 => Some(PieceKind::Rook),
        4 => Some(PieceKind::Queen),
        _ => None,
    };

    let king_moves = pos.piece_at(from).is_some_and(|p| p.kind == PieceKind::King);
    if king_moves && rank_of(from) == rank_of(to) && (file_of(to) - file_of(from)).abs() > 2 {
        let dest_file = if file_of(to) > file_of(from) { 6 } else { 2 };
        to = rank_of(from) as u8 * 8 + dest_file;
    }

    let mv = match promo {
        Some(kind) => Move::with_promo(from, to, kind),
        None => Move::new(from, to),
    };
    pos.resolve(mv)
}

/// Check size and ordering and parse every record.
pub fn parse_book(data: &[u8]) -> Result<Vec<BookEntry>, String> {
    if data.len() % RECORD_SIZE != 0 {
        return Err(format!(
            "size {} is not a multiple of {RECORD_SIZE} bytes",
            data.len()
        ));
    }
    let entries: Vec<BookEntry> = data.chunks_exact(RECORD_SIZE).map(BookEntry::from_bytes).collect();
    if let Some(i) = entries.windows(2).position(|w| w[0].key > w[1].key) {
        return Err(format!("keys not sorted at record {}", i + 1));
    }
    Ok(entries)
}

/// A legal book move for one position, with its style-adjusted weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BookCandidate {
    pub mv: Move,
    pub weight: u16,
    pub kind: CandidateKind,
    pub adjusted: f64,
}

#[derive(Debug, Clone, Default)]
pub struct OpeningBook {
    entries: Vec<BookEntry>,
    max_ply: u32,
    min_weight: u16,
    path: Option<PathBuf>,
}

impl OpeningBook {
    pub fn empty(config: &BookConfig) -> Self {
        Self::from_entries(Vec::new(), config)
    }

    /// Book over already sorted entries.
    pub fn from_entries(entries: Vec<BookEntry>, config: &BookConfig) -> Self {
        Self {
            entries,
            max_ply: config.max_ply,
            min_weight: config.min_weight,
            path: config.path.clone(),
        }
    }

    /// Load the book a config points at. Missing, unreadable or malformed
    /// files give an empty book and a warning instead of an error.
    pub fn open(config: &BookConfig) -> (Self, Option<EngineWarning>) {
        let Some(path) = config.path.as_deref() else {
            return (Self::empty(config), None);
        };
        match Self::load(path, config) {
            Ok(book) => (book, None),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Opening book disabled");
                let warning = EngineWarning::BookDisabled {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                };
                (Self::empty(config), Some(warning))
            }
        }
    }

    /// Strict load: any problem with the file is an error.
    pub fn load(path: &Path, config: &BookConfig) -> EngineResult<Self> {
        let data = std::fs::read(path).map_err(|e| EngineError::io(path, e))?;
        let entries = parse_book(&data).map_err(|reason| EngineError::MalformedBook {
            path: path.to_path_buf(),
            reason,
        })?;
        info!(path = %path.display(), entries = entries.len(), "Opening book loaded");
        let mut book = Self::from_entries(entries, config);
        book.path = Some(path.to_path_buf());
        Ok(book)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn max_ply(&self) -> u32 {
        self.max_ply
    }

    /// Raw records stored for a key.
    pub fn lookup(&self, key: u64) -> &[BookEntry] {
        let start = self.entries.partition_point(|e| e.key < key);
        let end = start + self.entries[start..].partition_point(|e| e.key == key);
        &self.entries[start..end]
    }

    /// Legal candidates for `pos` with weights scaled by style, learned
    /// style weight and repertoire results. Empty past `max_ply`.
    pub fn candidates(
        &self,
        pos: &Position,
        style: OpeningStyle,
        learner: Option<&AdaptiveLearner>,
    ) -> Vec<BookCandidate> {
        if self.entries.is_empty() || pos.ply() >= self.max_ply {
            return Vec::new();
        }

        let mut found: Vec<(Move, u16)> = Vec::new();
        for entry in self.lookup(pos.key()) {
            if entry.weight < self.min_weight {
                continue;
            }
            let Some(mv) = decode_move(entry.raw_move, pos) else {
                continue;
            };
            match found.iter_mut().find(|(m, _)| *m == mv) {
                Some((_, w)) => *w = w.saturating_add(entry.weight),
                None => found.push((mv, entry.weight)),
            }
        }

        let traps = if style == OpeningStyle::Tricky {
            trap_moves(pos)
        } else {
            Vec::new()
        };
        let base = found.iter().map(|(_, w)| *w).max().unwrap_or(1).max(self.min_weight);
        for trap in &traps {
            if !found.iter().any(|(m, _)| m == trap) {
                found.push((*trap, base));
            }
        }

        found
            .into_iter()
            .map(|(mv, weight)| {
                let kind = CandidateKind::classify(pos, mv, traps.contains(&mv));
                let mut adjusted = weight as f64 * style.multiplier(kind);
                if let Some(learner) = learner {
                    let child = pos.play_unchecked(mv).key();
                    adjusted *= learner.style_weight(style, child) * learner.repertoire(child).weight_factor();
                }
                BookCandidate {
                    mv,
                    weight,
                    kind,
                    adjusted,
                }
            })
            .collect()
    }

    /// Weighted random pick among the candidates for `pos`.
    pub fn choose<R: Rng + ?Sized>(
        &self,
        pos: &Position,
        style: OpeningStyle,
        learner: Option<&AdaptiveLearner>,
        rng: &mut R,
    ) -> Option<BookCandidate> {
        let candidates = self.candidates(pos, style, learner);
        let dist = WeightedIndex::new(candidates.iter().map(|c| c.adjusted)).ok()?;
        candidates.get(dist.sample(rng)).copied()
    }
}

/// Collects weighted moves and writes a sorted book file.
#[derive(Debug, Clone, Default)]
pub struct BookBuilder {
    weights: BTreeMap<(u64, u16), u32>,
}

impl BookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `weight` to a move in the position with key `key`. Repeated
    /// additions of the same move are summed.
    pub fn add_entry(&mut self, key: u64, mv: Move, weight: u16) {
        *self.weights.entry((key, encode_move(mv))).or_default() += weight as u32;
    }

    /// Add every move of a line of coordinate moves played from the
    /// standard start. Returns the number of moves added.
    pub fn add_line(&mut self, line: &str, weight: u16) -> CoreResult<usize> {
        let (positions, moves) = play_uci_line(&Position::startpos(), line)?;
        for (pos, mv) in positions.iter().zip(&moves) {
            self.add_entry(pos.key(), *mv, weight);
        }
        Ok(moves.len())
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Records sorted by key, heaviest move first within a key.
    pub fn entries(&self) -> Vec<BookEntry> {
        let mut entries: Vec<BookEntry> = self
            .weights
            .iter()
            .map(|(&(key, raw_move), &weight)| BookEntry {
                key,
                raw_move,
                weight: weight.min(u16::MAX as u32) as u16,
                learn: 0,
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key).then(b.weight.cmp(&a.weight)));
        entries
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.entries().into_iter().flat_map(BookEntry::to_bytes).collect()
    }

    pub fn write(&self, path: &Path) -> EngineResult<()> {
        std::fs::write(path, self.to_bytes()).map_err(|e| EngineError::io(path, e))?;
        info!(path = %path.display(), entries = self.len(), "Opening book written");
        Ok(())
    }

    pub fn build(&self, config: &BookConfig) -> OpeningBook {
        OpeningBook::from_entries(self.entries(), config)
    }
}

#[cfg(test)]
#[path = "book_tests.rs"]
mod book_tests;
