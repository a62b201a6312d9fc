//! Transposition table: 4-way set-associative buckets keyed by Zobrist key.
//!
//! Each top-level search starts a new generation. Entries written under an
//! older generation are invisible to probes and are the first to be
//! overwritten.

use chess_core::{Move, MATE_BOUND};

use crate::error::{EngineError, EngineResult};

const WAYS: usize = 4;

/// How the stored score relates to the true value of the position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    /// The score is exact.
    Exact,
    /// Fail-high: the true score is at least this.
    Lower,
    /// Fail-low: the true score is at most this.
    Upper,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TtEntry {
    pub key: u64,
    pub best_move: Option<Move>,
    /// Score re-based to the probing node when returned from [`TranspositionTable::probe`].
    pub score: i32,
    /// Remaining depth the entry was searched to.
    pub depth: u8,
    pub bound: Bound,
    generation: u16,
}

impl TtEntry {
    /// Whether the stored score settles a node searched with window (alpha, beta).
    pub fn cuts(&self, alpha: i32, beta: i32) -> bool {
        match self.bound {
            Bound::Exact => true,
            Bound::Lower => self.score >= beta,
            Bound::Upper => self.score <= alpha,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TtStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
    pub rejected: u64,
}

pub struct TranspositionTable {
    bucket_mask: usize,
    slots: Vec<Option<TtEntry>>,
    generation: u16,
    stats: TtStats,
}

impl TranspositionTable {
    /// Table holding roughly `capacity` entries, rounded down to whole
    /// power-of-two buckets.
    pub fn new(capacity: usize) -> EngineResult<Self> {
        let wanted = (capacity / WAYS).max(1);
        let buckets = if wanted.is_power_of_two() {
            wanted
        } else {
            wanted.next_power_of_two() >> 1
        };
        let len = buckets * WAYS;

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(len)
            .map_err(|e| EngineError::Initialization {
                attempts: 1,
                reason: format!("transposition table of {len} entries: {e}"),
            })?;
        slots.resize(len, None);

        Ok(Self {
            bucket_mask: buckets - 1,
            slots,
            generation: 0,
            stats: TtStats::default(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn generation(&self) -> u16 {
        self.generation
    }

    /// Start a new top-level search. Everything stored so far becomes stale.
    pub fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn stats(&self) -> TtStats {
        self.stats
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.stats = TtStats::default();
    }

    /// Current-generation entries.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|e| e.generation == self.generation)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn bucket(&self, key: u64) -> std::ops::Range<usize> {
        let start = (key as usize & self.bucket_mask) * WAYS;
        start..start + WAYS
    }

    fn find(&self, key: u64) -> Option<&TtEntry> {
        self.slots[self.bucket(key)]
            .iter()
            .flatten()
            .find(|e| e.key == key && e.generation == self.generation)
    }

    /// Entry for `key` searched at least `depth` deep, with its score re-based
    /// to a node `ply` plies from the root. Shallower entries are a miss.
    pub fn probe(&mut self, key: u64, depth: u8, ply: u32) -> Option<TtEntry> {
        self.stats.probes += 1;
        let mut entry = *self.find(key).filter(|e| e.depth >= depth)?;
        self.stats.hits += 1;
        entry.score = score_from_tt(entry.score, ply);
        Some(entry)
    }

    /// Stored move for `key` at any depth, for move ordering.
    pub fn best_move(&self, key: u64) -> Option<Move> {
        self.find(key).and_then(|e| e.best_move)
    }

    /// Store a search result. Returns false when the replacement rules keep
    /// the existing data instead.
    pub fn store(
        &mut self,
        key: u64,
        best_move: Option<Move>,
        score: i32,
        depth: u8,
        bound: Bound,
        ply: u32,
    ) -> bool {
        let generation = self.generation;
        let new = TtEntry {
            key,
            best_move,
            score: score_to_tt(score, ply),
            depth,
            bound,
            generation,
        };
        let range = self.bucket(key);

        let same_key = range
            .clone()
            .find(|&i| self.slots[i].is_some_and(|e| e.key == key));
        if let Some(i) = same_key {
            let Some(old) = self.slots[i] else {
                return false;
            };
            let keep_old = old.generation == generation
                && depth < old.depth
                && (old.bound == Bound::Exact || bound != Bound::Exact);
            if keep_old {
                if old.best_move.is_none() && best_move.is_some() {
                    self.slots[i] = Some(TtEntry { best_move, ..old });
                }
                self.stats.rejected += 1;
                return false;
            }
            self.slots[i] = Some(new);
            self.stats.stores += 1;
            return true;
        }

        let free = range
            .clone()
            .find(|&i| self.slots[i].map_or(true, |e| e.generation != generation));
        if let Some(i) = free {
            self.slots[i] = Some(new);
            self.stats.stores += 1;
            return true;
        }

        let victim = range.min_by_key(|&i| self.slots[i].map_or(0, |e| e.depth));
        match victim {
            Some(i) if self.slots[i].map_or(true, |e| depth >= e.depth) => {
                self.slots[i] = Some(new);
                self.stats.stores += 1;
                true
            }
            _ => {
                self.stats.rejected += 1;
                false
            }
        }
    }
}

/// Mate scores are stored relative to the node so they stay valid when the
/// position is reached at another distance from the root.
#[inline]
pub fn score_to_tt(score: i32, ply: u32) -> i32 {
    if score >= MATE_BOUND {
        score + ply as i32
    } else if score <= -MATE_BOUND {
        score - ply as i32
    } else {
        score
    }
}

#[inline]
pub fn score_from_tt(score: i32, ply: u32) -> i32 {
    if score >= MATE_BOUND {
        score - ply as i32
    } else if score <= -MATE_BOUND {
        score + ply as i32
    } else {
        score
    }
}

#[cfg(test)]
#[path = "tt_tests.rs"]
mod tt_tests;
