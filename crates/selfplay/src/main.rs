//! Self-play CLI
//!
//! Plays the adaptive engine against a second instance, lets both learn from
//! the results and writes a session report.

use std::path::PathBuf;

use adaptive_engine::{Difficulty, EngineConfig, RetryPolicy};
use anyhow::Context;
use selfplay::{MatchConfig, MatchRunner, Player, SelfPlayConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    println!("Adaptive engine self-play");
    println!();
    println!("Usage:");
    println!("  selfplay [config.toml]");
    println!();
    println!("Without a config file the defaults are used. Set RUST_LOG to change log output.");
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }
    let config = match args.first() {
        Some(path) => SelfPlayConfig::load(&PathBuf::from(path))?,
        None => SelfPlayConfig::default(),
    };

    let engine_config = match &config.engine_config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let opponent_config = match &config.opponent_config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load opponent config {}", path.display()))?,
        None => {
            // Two engines writing one store would overwrite each other
            let mut opponent = engine_config.clone();
            opponent.learning.store_path = None;
            opponent
        }
    };

    let policy = RetryPolicy {
        attempts: config.init_attempts,
        backoff: config.init_backoff(),
    };
    let mut first = Player::initialize(
        engine_config,
        Difficulty::new(config.first_difficulty),
        policy,
        config.seed,
    );
    let mut second = Player::initialize(
        opponent_config,
        Difficulty::new(config.second_difficulty),
        policy,
        config.seed.map(|s| s.wrapping_add(1)),
    );

    info!(
        games = config.games,
        first_difficulty = config.first_difficulty,
        second_difficulty = config.second_difficulty,
        first_fallback = first.is_fallback(),
        second_fallback = second.is_fallback(),
        "Starting self-play session"
    );

    let runner = MatchRunner::new(MatchConfig {
        num_games: config.games,
        depth: config.max_depth,
        time_per_move: config.move_time(),
        max_plies: config.max_plies,
        alternate_colors: config.alternate_colors,
    });
    let report = runner.run_match(first.engine(), second.engine());

    first.save_learning();
    second.save_learning();

    println!("{}", report.generate_report());
    if let Some(path) = &config.report_path {
        report.save(path)?;
        info!(path = %path.display(), "Report written");
    }
    Ok(())
}
