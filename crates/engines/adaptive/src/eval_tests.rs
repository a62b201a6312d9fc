use super::*;
use crate::config::LearningConfig;
use chess_core::GameOutcome;

fn fen(text: &str) -> Position {
    Position::from_fen(text).unwrap()
}

fn material_only() -> EvalSettings {
    EvalSettings {
        positional: false,
        learning: false,
        ..EvalSettings::default()
    }
}

#[test]
fn test_startpos_is_balanced() {
    let pos = Position::startpos();
    assert_eq!(evaluate(&pos, &EvalSettings::default(), None), 0);
    assert_eq!(evaluate(&pos, &material_only(), None), 0);
}

#[test]
fn test_score_is_for_side_to_move() {
    // White has an extra queen
    let white_to_move = fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1");
    let black_to_move = fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1");
    let settings = material_only();

    assert_eq!(evaluate(&white_to_move, &settings, None), 900);
    assert_eq!(evaluate(&black_to_move, &settings, None), -900);
}

#[test]
fn test_mirrored_positions_score_the_same() {
    let white = fen("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4");
    let black = fen("rnbqk2r/pppp1ppp/5n2/2b1p3/4P3/2N2N2/PPPP1PPP/R1BQKB1R b KQkq - 4 4");
    let settings = EvalSettings::default();
    assert_eq!(evaluate(&white, &settings, None), evaluate(&black, &settings, None));
}

#[test]
fn test_evaluation_is_deterministic() {
    let pos = fen("r2q1rk1/ppp2ppp/2np1n2/2b1p1B1/2B1P1b1/2NP1N2/PPP2PPP/R2Q1RK1 w - - 0 8");
    let settings = EvalSettings::default();
    let first = evaluate(&pos, &settings, None);
    for _ in 0..10 {
        assert_eq!(evaluate(&pos, &settings, None), first);
    }
}

#[test]
fn test_passed_pawn_rewarded() {
    // Same material; the d-pawn is passed in the first position only
    let passed = fen("4k3/8/8/3P4/8/8/8/4K3 w - - 0 1");
    let blocked = fen("4k3/3p4/8/3P4/8/8/8/4K3 w - - 0 1");
    let settings = EvalSettings::default();
    let passed_score = evaluate(&passed, &settings, None) - material(&passed);
    let blocked_score = evaluate(&blocked, &settings, None) - material(&blocked);
    assert!(passed_score > blocked_score);
}

#[test]
fn test_doubled_and_isolated_pawns_penalised() {
    let healthy = fen("4k3/8/8/8/8/8/3PP3/4K3 w - - 0 1");
    let doubled = fen("4k3/8/8/8/8/4P3/4P3/4K3 w - - 0 1");
    assert!(pawn_structure(&healthy, Color::White) > pawn_structure(&doubled, Color::White));
}

#[test]
fn test_bishop_pair_and_open_file() {
    let pair = fen("4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1");
    let single = fen("4k3/8/8/8/8/8/8/2N1KB2 w - - 0 1");
    assert_eq!(coordination(&pair, Color::White) - coordination(&single, Color::White), BISHOP_PAIR);

    let open = fen("4k3/pp6/8/8/8/8/PP6/3RK3 w - - 0 1");
    assert_eq!(coordination(&open, Color::White), ROOK_OPEN_FILE);
}

#[test]
fn test_king_attackers_cost() {
    let quiet = fen("6k1/5ppp/8/8/8/8/5PPP/3Q2K1 b - - 0 1");
    let attacked = fen("6k1/5ppp/8/6Q1/8/8/5PPP/6K1 b - - 0 1");
    assert!(king_safety(&attacked, Color::Black) < king_safety(&quiet, Color::Black));
}

#[test]
fn test_endgame_detection() {
    assert!(!is_endgame(&Position::startpos()));
    assert!(is_endgame(&fen("4k3/pppp4/8/8/8/8/PPPP4/R3K2N w - - 0 1")));
    assert!(is_endgame(&fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1")));
}

#[test]
fn test_learned_blend_is_capped() {
    let settings = EvalSettings::default();
    let strong = LearnedRecord {
        score: 0.99,
        visits: 1_000,
    };
    let learned_cp = expected_score_to_cp(0.99);
    assert_eq!(blend(0, strong, &settings), (learned_cp as f64 * 0.5).round() as i32);

    let light = LearnedRecord {
        score: 0.99,
        visits: 2,
    };
    assert!(blend(0, light, &settings).abs() < blend(0, strong, &settings).abs());
    assert_eq!(blend(120, LearnedRecord::default(), &settings), 120);
}

#[test]
fn test_learning_toggle_uses_learner() {
    let pos = Position::startpos();
    let mut learner = AdaptiveLearner::new(LearningConfig::default());
    for _ in 0..20 {
        learner.record_position(pos.key());
        learner.record_result(GameOutcome::Win);
        learner.learn();
    }

    let on = EvalSettings::default();
    let off = EvalSettings {
        learning: false,
        ..on
    };
    assert!(evaluate(&pos, &on, Some(&learner)) > 0);
    assert_eq!(evaluate(&pos, &off, Some(&learner)), 0);
}

#[test]
fn test_piece_values_follow_pawn_scale() {
    assert_eq!(piece_value(PieceKind::Pawn), 100);
    for minor in [PieceKind::Knight, PieceKind::Bishop] {
        assert!((300..=350).contains(&piece_value(minor)));
    }
    assert!(piece_value(PieceKind::Bishop) >= piece_value(PieceKind::Knight));
    assert_eq!(piece_value(PieceKind::Rook), 500);
    assert_eq!(piece_value(PieceKind::Queen), 900);
}
