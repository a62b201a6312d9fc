use super::*;

#[test]
fn random_engine_returns_legal_move() {
    let mut engine = RandomEngine::new();
    let pos = Position::startpos();

    let result = engine.search(&pos, SearchLimits::depth(1));

    let mv = result.best_move.unwrap();
    assert!(pos.legal_moves().contains(&mv));
}

#[test]
fn random_engine_is_repeatable_with_seed() {
    let pos = Position::startpos();
    let mut a = RandomEngine::with_seed(42);
    let mut b = RandomEngine::with_seed(42);
    for _ in 0..10 {
        assert_eq!(
            a.search(&pos, SearchLimits::depth(1)).best_move,
            b.search(&pos, SearchLimits::depth(1)).best_move
        );
    }
}

#[test]
fn random_engine_handles_checkmate() {
    let mut engine = RandomEngine::with_seed(1);
    let pos =
        Position::from_fen("r1bqkbnr/pppp1Qpp/2n5/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 1")
            .unwrap();

    let result = engine.search(&pos, SearchLimits::depth(1));

    assert!(result.best_move.is_none());
}

#[test]
fn random_engine_handles_stalemate() {
    let mut engine = RandomEngine::with_seed(1);
    let pos = Position::from_fen("k7/8/1Q6/8/8/8/8/1K6 b - - 0 1").unwrap();

    let result = engine.search(&pos, SearchLimits::depth(1));

    assert!(result.best_move.is_none());
}
