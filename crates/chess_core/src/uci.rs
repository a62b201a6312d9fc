//! Coordinate move notation (e2e4, e7e8q) helpers.

use crate::error::CoreResult;
use crate::position::Position;
use crate::types::Move;

/// Play a whitespace-separated move list from `start`, returning every
/// position visited (including `start`) and the resolved moves.
pub fn play_uci_line(start: &Position, line: &str) -> CoreResult<(Vec<Position>, Vec<Move>)> {
    let mut positions = vec![start.clone()];
    let mut moves = Vec::new();
    let mut pos = start.clone();
    for txt in line.split_whitespace() {
        let mv = pos.parse_move(txt)?;
        pos = pos.play(mv)?;
        moves.push(mv);
        positions.push(pos.clone());
    }
    Ok((positions, moves))
}
