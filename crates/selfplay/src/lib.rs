//! Self-play harness for the adaptive engine
//!
//! This crate provides:
//! - A match runner that plays engine-vs-engine games and tells both sides
//!   how each game ended, which is what drives adaptive learning
//! - A JSON session report with per-game results and totals
//! - Player setup with retried initialization and a random-move fallback
//!
//! # Usage
//!
//! ```bash
//! cargo run --release -p selfplay -- selfplay.toml
//! ```

mod config;
mod match_runner;
mod player;
mod report;

pub use config::*;
pub use match_runner::*;
pub use player::*;
pub use report::*;
