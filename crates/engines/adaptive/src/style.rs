//! Opening style profiles and the built-in trap lines.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chess_core::{Move, Position};
use serde::{Deserialize, Serialize};

/// How the book picks among its candidate moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpeningStyle {
    /// Prefers quiet developing moves.
    Solid,
    /// Prefers captures and checks.
    Aggressive,
    /// Steers toward known traps.
    Tricky,
    #[default]
    Balanced,
}

impl OpeningStyle {
    pub const ALL: [OpeningStyle; 4] = [
        OpeningStyle::Solid,
        OpeningStyle::Aggressive,
        OpeningStyle::Tricky,
        OpeningStyle::Balanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OpeningStyle::Solid => "solid",
            OpeningStyle::Aggressive => "aggressive",
            OpeningStyle::Tricky => "tricky",
            OpeningStyle::Balanced => "balanced",
        }
    }

    /// Multiplier applied to a book candidate's weight.
    pub fn multiplier(self, kind: CandidateKind) -> f64 {
        match (self, kind) {
            (OpeningStyle::Solid, CandidateKind::Quiet) => 1.3,
            (OpeningStyle::Aggressive, CandidateKind::Forcing) => 1.5,
            (OpeningStyle::Tricky, CandidateKind::Trap) => 3.0,
            _ => 1.0,
        }
    }
}

impl fmt::Display for OpeningStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpeningStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solid" => Ok(OpeningStyle::Solid),
            "aggressive" => Ok(OpeningStyle::Aggressive),
            "tricky" => Ok(OpeningStyle::Tricky),
            "balanced" => Ok(OpeningStyle::Balanced),
            other => Err(format!("unknown opening style '{other}'")),
        }
    }
}

/// Classification of a book candidate for style scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// Neither capture nor check.
    Quiet,
    /// Capture or check.
    Forcing,
    /// Continuation of a known trap line.
    Trap,
}

impl CandidateKind {
    pub fn classify(pos: &Position, mv: Move, is_trap: bool) -> Self {
        if is_trap {
            CandidateKind::Trap
        } else if mv.is_capture || pos.gives_check(mv) {
            CandidateKind::Forcing
        } else {
            CandidateKind::Quiet
        }
    }
}

/// (position, move that springs or exploits the trap)
const TRAP_LINES: &[(&str, &str)] = &[
    // Fried Liver: Nxf7 after 5...Nxd5
    (
        "r1bqkb1r/ppp2ppp/2n5/3np1N1/2B5/8/PPPP1PPP/RNBQK2R w KQkq - 0 6",
        "g5f7",
    ),
    // Early queen sortie punished by 3...Nf6??
    (
        "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
        "h5f7",
    ),
    // Blackburne Shilling: 4...Qg5 after Nxe5
    (
        "r1bqkbnr/pppp1ppp/8/4N3/2BnP3/8/PPPP1PPP/RNBQK2R b KQkq - 0 4",
        "d8g5",
    ),
];

fn trap_table() -> &'static [(u64, &'static str)] {
    static TABLE: OnceLock<Vec<(u64, &'static str)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        TRAP_LINES
            .iter()
            .filter_map(|(fen, mv)| Position::from_fen(fen).ok().map(|p| (p.key(), *mv)))
            .collect()
    })
}

/// Trap moves known for this position, resolved to legal moves.
pub fn trap_moves(pos: &Position) -> Vec<Move> {
    let key = pos.key();
    trap_table()
        .iter()
        .filter(|(k, _)| *k == key)
        .filter_map(|(_, txt)| pos.parse_move(txt).ok())
        .collect()
}

#[cfg(test)]
#[path = "style_tests.rs"]
mod style_tests;
