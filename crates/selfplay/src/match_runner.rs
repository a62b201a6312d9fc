//! Match runner for playing games between engines

use std::time::Duration;

use chess_core::{Color, DrawReason, Engine, GameOutcome, GameStatus, Position, SearchLimits};
use tracing::{debug, info, warn};

use crate::report::{GameRecord, GameResult, SessionReport, Termination};

/// Configuration for a match
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Number of games to play
    pub num_games: u32,
    /// Depth cap per move
    pub depth: u8,
    /// Maximum time per move (None = the engine's own budget)
    pub time_per_move: Option<Duration>,
    /// Half-moves before the game is adjudicated a draw
    pub max_plies: u32,
    /// Whether to alternate colors each game
    pub alternate_colors: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            num_games: 10,
            depth: 20,
            time_per_move: None,
            max_plies: 300,
            alternate_colors: true,
        }
    }
}

impl MatchConfig {
    /// Fresh search limits for one move
    fn search_limits(&self) -> SearchLimits {
        match self.time_per_move {
            Some(time) => SearchLimits::depth_and_time(self.depth, time),
            None => SearchLimits::depth(self.depth),
        }
    }
}

/// A game as it left the board, before it is added to a report
#[derive(Debug, Clone, PartialEq)]
pub struct PlayedGame {
    pub result: GameResult,
    pub termination: Termination,
    pub plies: u32,
    pub moves: Vec<String>,
}

/// Runs matches between two engines
pub struct MatchRunner {
    config: MatchConfig,
}

impl MatchRunner {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    /// Run a match between two engines. Both hear the result of every game
    /// through [`Engine::game_finished`].
    pub fn run_match(&self, first: &mut dyn Engine, second: &mut dyn Engine) -> SessionReport {
        let first_name = first.name().to_string();
        let second_name = second.name().to_string();
        let mut report = SessionReport::new(&first_name, &second_name);

        for game_num in 0..self.config.num_games {
            let first_is_white = !self.config.alternate_colors || game_num % 2 == 0;
            let played = if first_is_white {
                self.play_game(first, second)
            } else {
                self.play_game(second, first)
            };

            let (white, black) = if first_is_white {
                (first_name.clone(), second_name.clone())
            } else {
                (second_name.clone(), first_name.clone())
            };
            info!(
                game = game_num + 1,
                games = self.config.num_games,
                white = %white,
                black = %black,
                result = ?played.result,
                termination = ?played.termination,
                plies = played.plies,
                "Game finished"
            );

            report.add_game(GameRecord {
                game: game_num + 1,
                white,
                black,
                first_is_white,
                result: played.result,
                termination: played.termination,
                plies: played.plies,
                moves: played.moves,
            });
        }

        info!(
            first_wins = report.first_wins,
            second_wins = report.second_wins,
            draws = report.draws,
            "Match finished"
        );
        report
    }

    /// Play a single game and tell both engines how it went.
    pub fn play_game(&self, white: &mut dyn Engine, black: &mut dyn Engine) -> PlayedGame {
        white.new_game();
        black.new_game();

        let played = self.play_moves(white, black);
        let white_outcome = match played.result {
            GameResult::WhiteWins => GameOutcome::Win,
            GameResult::BlackWins => GameOutcome::Loss,
            GameResult::Draw => GameOutcome::Draw,
        };
        white.game_finished(white_outcome);
        black.game_finished(white_outcome.flip());
        played
    }

    fn play_moves(&self, white: &mut dyn Engine, black: &mut dyn Engine) -> PlayedGame {
        let mut pos = Position::startpos();
        let mut keys = vec![pos.key()];
        let mut moves = Vec::new();

        let (result, termination) = loop {
            if let Some(end) = adjudicate(&pos, &keys) {
                break end;
            }
            if moves.len() as u32 >= self.config.max_plies {
                break (GameResult::Draw, Termination::PlyLimit);
            }

            let mover = pos.side_to_move();
            let engine: &mut dyn Engine = match mover {
                Color::White => &mut *white,
                Color::Black => &mut *black,
            };
            let search = engine.search(&pos, self.config.search_limits());
            let next = search.best_move.map(|mv| (mv, pos.play(mv)));
            match next {
                Some((mv, Ok(child))) => {
                    debug!(ply = moves.len() + 1, mv = %mv, score = search.score, "Move played");
                    moves.push(mv.to_string());
                    pos = child;
                    keys.push(pos.key());
                }
                Some((mv, Err(e))) => {
                    warn!(engine = engine.name(), mv = %mv, error = %e, "Illegal move, forfeiting");
                    break (loss_for(mover), Termination::Forfeit);
                }
                None => {
                    warn!(engine = engine.name(), fen = %pos.fen(), "No move returned, forfeiting");
                    break (loss_for(mover), Termination::Forfeit);
                }
            }
        };

        PlayedGame {
            result,
            termination,
            plies: moves.len() as u32,
            moves,
        }
    }
}

fn loss_for(color: Color) -> GameResult {
    match color {
        Color::White => GameResult::BlackWins,
        Color::Black => GameResult::WhiteWins,
    }
}

/// Whether the game is over in `pos`, given every key seen so far
/// (including `pos` itself).
pub fn adjudicate(pos: &Position, keys: &[u64]) -> Option<(GameResult, Termination)> {
    match pos.status() {
        GameStatus::Checkmate => return Some((loss_for(pos.side_to_move()), Termination::Checkmate)),
        GameStatus::Draw(reason) => {
            let termination = match reason {
                DrawReason::Stalemate => Termination::Stalemate,
                DrawReason::FiftyMove => Termination::FiftyMoveRule,
                DrawReason::InsufficientMaterial => Termination::InsufficientMaterial,
                DrawReason::Repetition => Termination::Repetition,
            };
            return Some((GameResult::Draw, termination));
        }
        GameStatus::Ongoing => {}
    }
    let key = pos.key();
    if keys.iter().filter(|&&k| k == key).count() >= 3 {
        return Some((GameResult::Draw, Termination::Repetition));
    }
    None
}

#[cfg(test)]
#[path = "match_runner_tests.rs"]
mod match_runner_tests;
