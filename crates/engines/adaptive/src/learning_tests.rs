use super::*;

fn temp_store(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "adaptive_engine_{name}_{}.json",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

fn learner_with_store(path: &Path) -> AdaptiveLearner {
    AdaptiveLearner::new(LearningConfig {
        store_path: Some(path.to_path_buf()),
        ..LearningConfig::default()
    })
}

#[test]
fn test_sigmoid_target_bounds() {
    let learner = AdaptiveLearner::new(LearningConfig::default());
    let win = learner.sigmoid_target(1.0);
    let draw = learner.sigmoid_target(0.5);
    let loss = learner.sigmoid_target(0.0);

    assert!(win > 0.95 && win < 1.0);
    assert!((draw - 0.5).abs() < 1e-12);
    assert!(loss > 0.0 && loss < 0.05);
    assert!((win + loss - 1.0).abs() < 1e-12);
}

#[test]
fn test_repeated_wins_increase_monotonically_toward_target() {
    let mut learner = AdaptiveLearner::new(LearningConfig::default());
    let target = learner.sigmoid_target(1.0);
    let key = 0xDEAD_BEEF;

    let mut last = LearnedRecord::default().score;
    for game in 1..=60 {
        learner.record_position(key);
        learner.record_result(GameOutcome::Win);
        learner.learn();

        let record = learner.learned(key).unwrap();
        assert!(record.score > last, "score must strictly increase");
        assert!(record.score < target, "score must stay below the target");
        assert_eq!(record.visits, game);
        last = record.score;
    }
}

#[test]
fn test_update_rule() {
    let mut learner = AdaptiveLearner::new(LearningConfig::default());
    learner.record_position(1);
    learner.record_result(GameOutcome::Loss);
    learner.learn();

    let target = learner.sigmoid_target(0.0);
    let expected = 0.5 + 0.1 * (target - 0.5);
    assert!((learner.learned(1).unwrap().score - expected).abs() < 1e-12);
}

#[test]
fn test_positions_counted_once_per_game() {
    let mut learner = AdaptiveLearner::new(LearningConfig::default());
    learner.record_position(5);
    learner.record_position(5);
    learner.record_position(6);
    assert_eq!(learner.recorded_positions(), &[5, 6]);

    learner.record_result(GameOutcome::Draw);
    let summary = learner.learn();
    assert_eq!(summary.positions_updated, 2);
    assert_eq!(learner.learned(5).unwrap().visits, 1);
    assert!(learner.recorded_positions().is_empty());
}

#[test]
fn test_learn_without_result_changes_nothing() {
    let mut learner = AdaptiveLearner::new(LearningConfig::default());
    learner.record_position(9);
    let summary = learner.learn();
    assert_eq!(summary.outcome, None);
    assert!(learner.learned(9).is_none());
    assert_eq!(learner.games_learned(), 0);
}

#[test]
fn test_style_weights_nudged_and_bounded() {
    let mut learner = AdaptiveLearner::new(LearningConfig::default());
    learner.set_style(OpeningStyle::Aggressive);
    let line = 77;

    learner.record_line(line);
    learner.record_result(GameOutcome::Win);
    learner.learn();
    assert!((learner.style_weight(OpeningStyle::Aggressive, line) - 1.1).abs() < 1e-9);
    assert_eq!(learner.style_weight(OpeningStyle::Solid, line), 1.0);

    learner.record_line(line);
    learner.record_result(GameOutcome::Draw);
    learner.learn();
    assert!((learner.style_weight(OpeningStyle::Aggressive, line) - 1.1).abs() < 1e-9);

    for _ in 0..40 {
        learner.record_line(line);
        learner.record_result(GameOutcome::Loss);
        learner.learn();
    }
    assert_eq!(learner.style_weight(OpeningStyle::Aggressive, line), 0.5);

    for _ in 0..40 {
        learner.record_line(line);
        learner.record_result(GameOutcome::Win);
        learner.learn();
    }
    assert_eq!(learner.style_weight(OpeningStyle::Aggressive, line), 2.0);
}

#[test]
fn test_repertoire_factor() {
    let mut stats = RepertoireStats::default();
    assert_eq!(stats.weight_factor(), 1.0);

    for _ in 0..10 {
        stats.record(GameOutcome::Win);
    }
    assert!((stats.weight_factor() - 2.0).abs() < 1e-9);

    let mut losing = RepertoireStats::default();
    for _ in 0..20 {
        losing.record(GameOutcome::Loss);
    }
    assert!((losing.weight_factor() - 0.5).abs() < 1e-9);
}

#[test]
fn test_save_and_reload() {
    let path = temp_store("roundtrip");
    let mut learner = learner_with_store(&path);
    learner.record_position(42);
    learner.record_line(43);
    learner.record_result(GameOutcome::Win);
    learner.learn();
    learner.save().unwrap();

    let (reloaded, warning) = AdaptiveLearner::load(learner.config().clone());
    assert!(warning.is_none());
    assert_eq!(reloaded.learned(42), learner.learned(42));
    assert_eq!(reloaded.repertoire(43).wins, 1);
    assert_eq!(reloaded.games_learned(), 1);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_missing_store_starts_empty_without_warning() {
    let path = temp_store("missing");
    let (learner, warning) = AdaptiveLearner::load(learner_with_store(&path).config().clone());
    assert!(warning.is_none());
    assert_eq!(learner.position_count(), 0);
}

#[test]
fn test_corrupt_store_starts_empty_with_warning() {
    let path = temp_store("corrupt");
    std::fs::write(&path, b"{ this is not json").unwrap();

    let (learner, warning) = AdaptiveLearner::load(learner_with_store(&path).config().clone());
    assert!(matches!(warning, Some(EngineWarning::LearningReset { .. })));
    assert_eq!(learner.position_count(), 0);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_out_of_range_scores_rejected() {
    let path = temp_store("range");
    std::fs::write(&path, r#"{"positions": {"7": {"score": 3.5, "visits": 1}}}"#).unwrap();

    let (learner, warning) = AdaptiveLearner::load(learner_with_store(&path).config().clone());
    assert!(warning.is_some());
    assert!(learner.learned(7).is_none());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_save_trims_least_visited() {
    let path = temp_store("trim");
    let mut learner = AdaptiveLearner::new(LearningConfig {
        store_path: Some(path.clone()),
        max_positions: 2,
        ..LearningConfig::default()
    });
    // key 1 visited three times, key 2 twice, key 3 once
    for round in 0..3u64 {
        for key in 1..=(3 - round) {
            learner.record_position(key);
        }
        learner.record_result(GameOutcome::Draw);
        learner.learn();
    }
    learner.save().unwrap();

    assert_eq!(learner.position_count(), 2);
    assert!(learner.learned(3).is_none());
    assert_eq!(learner.learned(1).unwrap().visits, 3);
    let _ = std::fs::remove_file(&path);
}
