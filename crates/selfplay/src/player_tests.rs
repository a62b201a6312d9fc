use super::*;
use std::time::Duration;

fn policy() -> RetryPolicy {
    RetryPolicy {
        attempts: 2,
        backoff: Duration::from_millis(1),
    }
}

#[test]
fn test_valid_config_gives_adaptive_player() {
    let config = EngineConfig {
        seed: Some(1),
        ..EngineConfig::default()
    };
    let mut player = Player::initialize(config, Difficulty::new(3), policy(), Some(1));
    assert!(!player.is_fallback());
    assert_eq!(player.engine().name(), "Adaptive");
    player.save_learning();
}

#[test]
fn test_failed_initialization_falls_back() {
    let mut config = EngineConfig::default();
    config.search.tt_capacity = 0;
    let mut player = Player::initialize(config, Difficulty::new(3), policy(), Some(1));
    assert!(player.is_fallback());
    assert_eq!(player.engine().name(), "Random");
}
