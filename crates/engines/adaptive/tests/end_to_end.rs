//! Whole-engine scenarios through the public API.

use std::path::PathBuf;
use std::time::Duration;

use adaptive_engine::{
    AdaptiveEngine, AdaptiveLearner, BookBuilder, BookConfig, Difficulty, EngineConfig,
    EngineWarning, LearningConfig, MoveDecision, MoveSource, OpeningStyle,
};
use chess_core::{Engine, Evaluation, GameOutcome, Position, SearchLimits};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("adaptive_e2e_{name}_{}", std::process::id()))
}

fn engine_without_book(seed: u64) -> AdaptiveEngine {
    let mut engine = AdaptiveEngine::new(EngineConfig {
        seed: Some(seed),
        ..EngineConfig::default()
    })
    .unwrap();
    engine.set_book(false);
    engine
}

#[test]
fn test_every_level_returns_a_legal_move() {
    let pos = Position::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3")
        .unwrap();
    let legal = pos.legal_moves();
    let mut engine = engine_without_book(11);
    for level in [1, 5, 10] {
        let mv = engine
            .choose_move_within(&pos, Difficulty::new(level), Some(2), Some(Duration::from_secs(2)))
            .mv()
            .unwrap();
        assert!(legal.contains(&mv), "level {level} played {mv}");
    }
}

#[test]
fn test_evaluation_is_deterministic() {
    let engine = engine_without_book(1);
    let pos = Position::from_fen("r2q1rk1/ppp2ppp/2np1n2/2b1p1B1/2B1P1b1/2NP1N2/PPP2PPP/R2Q1RK1 w - - 0 8")
        .unwrap();
    let first = engine.evaluate(&pos);
    for _ in 0..5 {
        assert_eq!(engine.evaluate(&pos), first);
    }
    assert_eq!(engine.evaluate(&Position::startpos()), Evaluation::Centipawns(0));
}

#[test]
fn test_strongest_level_opens_sensibly() {
    let mut engine = engine_without_book(5);
    let decision = engine.choose_move_within(
        &Position::startpos(),
        Difficulty::new(20),
        Some(4),
        Some(Duration::from_secs(10)),
    );
    let reasonable = [
        "e2e4", "d2d4", "g1f3", "b1c3", "c2c4", "e2e3", "d2d3", "c2c3", "g2g3", "b2b3",
    ];
    let mv = decision.mv().unwrap().to_string();
    assert!(reasonable.contains(&mv.as_str()), "opened with {mv}");
}

#[test]
fn test_finds_mate_in_one() {
    let pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/4R1K1 w - - 0 1").unwrap();
    let mut engine = engine_without_book(2);
    match engine.choose_move(&pos, Difficulty::new(20)) {
        MoveDecision::Play(chosen) => {
            assert_eq!(chosen.mv.to_string(), "e1e8");
            assert_eq!(chosen.evaluation, Some(Evaluation::MateIn(1)));
        }
        other => panic!("expected a move, got {other:?}"),
    }
}

#[test]
fn test_engine_trait_search() {
    let mut engine = engine_without_book(4);
    let result = engine.search(
        &Position::startpos(),
        SearchLimits::depth_and_time(2, Duration::from_secs(5)),
    );
    assert!(result.best_move.is_some());
    assert!(result.depth >= 1 && result.depth <= 2);
    assert_eq!(engine.name(), "Adaptive");
}

#[test]
fn test_unusable_book_does_not_stop_the_engine() {
    let corrupt = temp_path("corrupt.bin");
    std::fs::write(&corrupt, [7u8; 21]).unwrap();

    for path in [corrupt.clone(), temp_path("missing.bin")] {
        let mut engine = AdaptiveEngine::new(EngineConfig {
            seed: Some(9),
            book: BookConfig {
                path: Some(path),
                ..BookConfig::default()
            },
            ..EngineConfig::default()
        })
        .unwrap();
        assert!(engine.book().is_empty());
        assert!(matches!(
            engine.warnings(),
            [EngineWarning::BookDisabled { .. }]
        ));
        let start = Position::startpos();
        assert!(engine.book().lookup(start.key()).is_empty());
        match engine.choose_move(&start, Difficulty::new(2)) {
            MoveDecision::Play(chosen) => assert!(matches!(chosen.source, MoveSource::Search { .. })),
            other => panic!("expected a move, got {other:?}"),
        }
    }
    let _ = std::fs::remove_file(&corrupt);
}

#[test]
fn test_book_split_follows_weights() {
    let path = temp_path("split.bin");
    let mut builder = BookBuilder::new();
    builder.add_line("e2e4", 3).unwrap();
    builder.add_line("d2d4", 1).unwrap();
    builder.write(&path).unwrap();

    let mut engine = AdaptiveEngine::new(EngineConfig {
        seed: Some(21),
        book: BookConfig {
            path: Some(path.clone()),
            ..BookConfig::default()
        },
        ..EngineConfig::default()
    })
    .unwrap();
    engine.set_learning(false);

    let start = Position::startpos();
    let rounds = 2_000;
    let mut e4 = 0;
    for _ in 0..rounds {
        if engine.choose_move(&start, Difficulty::new(10)).mv().unwrap().to_string() == "e2e4" {
            e4 += 1;
        }
    }
    let share = e4 as f64 / rounds as f64;
    assert!((share - 0.75).abs() < 0.05, "e4 share {share}");
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_learned_score_moves_toward_bound() {
    let mut learner = AdaptiveLearner::new(LearningConfig::default());
    let key = Position::startpos().key();
    let upper = learner.sigmoid_target(1.0);

    let mut previous = 0.5;
    for _ in 0..30 {
        learner.record_position(key);
        learner.record_result(GameOutcome::Win);
        learner.learn();
        let score = learner.learned(key).unwrap().score;
        assert!(score > previous, "{score} did not rise above {previous}");
        assert!(score < upper);
        previous = score;
    }
    assert_eq!(learner.learned(key).unwrap().visits, 30);
}

#[test]
fn test_learning_persists_between_engines() {
    let store = temp_path("store").join("learning.json");
    let config = EngineConfig {
        seed: Some(8),
        style: OpeningStyle::Aggressive,
        learning: LearningConfig {
            store_path: Some(store.clone()),
            ..LearningConfig::default()
        },
        ..EngineConfig::default()
    };
    let start = Position::startpos();

    let mut first = AdaptiveEngine::new(config.clone()).unwrap();
    first.set_book(false);
    first.choose_move(&start, Difficulty::new(2));
    first.game_finished(GameOutcome::Win);
    let learned = first.learner().learned(start.key()).unwrap();
    assert!(store.exists());

    let second = AdaptiveEngine::new(config).unwrap();
    assert!(second.warnings().is_empty());
    let reloaded = second.learner().learned(start.key()).unwrap();
    assert_eq!(reloaded.visits, learned.visits);
    assert!((reloaded.score - learned.score).abs() < 1e-12);
    assert_eq!(second.learner().games_learned(), 1);

    if let Some(dir) = store.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[test]
fn test_corrupt_learning_store_resets_with_warning() {
    let store = temp_path("bad_store.json");
    std::fs::write(&store, "{ not json").unwrap();
    let engine = AdaptiveEngine::new(EngineConfig {
        seed: Some(1),
        learning: LearningConfig {
            store_path: Some(store.clone()),
            ..LearningConfig::default()
        },
        ..EngineConfig::default()
    })
    .unwrap();
    assert!(matches!(
        engine.warnings(),
        [EngineWarning::LearningReset { .. }]
    ));
    assert_eq!(engine.learner().position_count(), 0);
    let _ = std::fs::remove_file(&store);
}
