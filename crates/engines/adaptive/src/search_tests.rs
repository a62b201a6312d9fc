use super::*;
use chess_core::{mate_in, Position};

fn pos(fen: &str) -> Position {
    Position::from_fen(fen).unwrap()
}

fn table() -> TranspositionTable {
    TranspositionTable::new(1 << 14).unwrap()
}

fn run(p: &Position, params: &SearchParams) -> SearchOutcome {
    search(p, &[], params, &mut table(), None)
}

fn depth(max_depth: u8) -> SearchParams {
    SearchParams {
        max_depth,
        ..SearchParams::default()
    }
}

#[test]
fn test_start_position_returns_legal_move() {
    let p = Position::startpos();
    let outcome = run(&p, &depth(3));
    let mv = outcome.best_move.unwrap();
    assert!(p.is_legal(mv));
    assert_eq!(outcome.stats.depth, 3);
    assert!(outcome.stats.nodes > 0);
    assert!(!outcome.stopped);
}

#[test]
fn test_finds_mate_in_one_at_every_depth() {
    // Re8# along the back rank
    let p = pos("6k1/5ppp/8/8/8/8/5PPP/4R1K1 w - - 0 1");
    for max_depth in 1..=4 {
        for quiescence in [true, false] {
            let params = SearchParams {
                max_depth,
                quiescence,
                ..SearchParams::default()
            };
            let outcome = run(&p, &params);
            assert_eq!(outcome.best_move.unwrap().to_string(), "e1e8", "depth {max_depth}");
            assert_eq!(outcome.score, mate_in(1));
        }
    }
}

#[test]
fn test_naive_mode_finds_mate_in_one() {
    let p = pos("6k1/5ppp/8/8/8/8/5PPP/4R1K1 w - - 0 1");
    let params = SearchParams {
        alpha_beta: false,
        use_tt: false,
        ..depth(2)
    };
    assert_eq!(run(&p, &params).best_move.unwrap().to_string(), "e1e8");
}

#[test]
fn test_alpha_beta_matches_minimax_value() {
    let p = pos("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");
    let base = SearchParams {
        use_tt: false,
        quiescence: false,
        null_move: false,
        ..depth(3)
    };
    let pruned = run(&p, &base);
    let naive = run(
        &p,
        &SearchParams {
            alpha_beta: false,
            ..base.clone()
        },
    );

    assert_eq!(pruned.score, naive.score);
    assert!(pruned.stats.nodes < naive.stats.nodes);
}

#[test]
fn test_scored_root_ranks_every_move() {
    let p = Position::startpos();
    let params = SearchParams {
        scored_root: true,
        ..depth(2)
    };
    let outcome = run(&p, &params);
    assert_eq!(outcome.root_scores.len(), 20);
    assert!(outcome.root_scores.windows(2).all(|w| w[0].1 >= w[1].1));
    assert_eq!(outcome.root_scores[0], (outcome.best_move.unwrap(), outcome.score));
}

#[test]
fn test_quiescence_not_below_static_eval_with_hanging_queen() {
    // White to move can take an undefended queen
    let p = pos("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1");
    let params = SearchParams::default();
    let mut tt = table();
    let mut searcher = Searcher::new(&params, &mut tt, None, &[]);

    let static_score = searcher.static_eval(&p);
    let quiet_score = searcher.quiescence(&p, -INFINITY, INFINITY, 0, 0).unwrap();
    assert!(quiet_score >= static_score);
    assert!(quiet_score > static_score + 500);
}

#[test]
fn test_null_move_never_in_check() {
    let params = SearchParams::default();
    let checked = pos("k7/8/8/8/8/8/5PP1/r5K1 w - - 0 1");
    assert!(checked.in_check());
    assert!(!null_move_allowed(&checked, 6, 1, false, &params));

    let quiet = pos("k7/8/8/8/8/8/5PP1/1r3NK1 w - - 0 1");
    assert!(null_move_allowed(&quiet, 6, 1, false, &params));
    assert!(!null_move_allowed(&quiet, 6, 0, false, &params), "never at the root");
    assert!(!null_move_allowed(&quiet, 6, 1, true, &params), "never twice in a row");
    assert!(!null_move_allowed(&quiet, 2, 1, false, &params), "depth must exceed R");

    let pawns_only = pos("k7/p7/8/8/8/8/5PP1/6K1 w - - 0 1");
    assert!(!null_move_allowed(&pawns_only, 6, 1, false, &params));
}

#[test]
fn test_check_evasion_found_with_pruning_on() {
    // Only Kh2 escapes the rook check
    let p = pos("k7/8/8/8/8/8/5PP1/r5K1 w - - 0 1");
    let outcome = run(&p, &depth(4));
    assert_eq!(outcome.best_move.unwrap().to_string(), "g1h2");
}

#[test]
fn test_every_evasion_searched_with_pruning_on() {
    // Rook check along the first rank: Kh2, Ne1 and Rd1 all answer it
    let p = pos("k7/8/8/8/8/5N2/3R1PP1/r5K1 w - - 0 1");
    assert!(p.in_check());
    let params = SearchParams {
        scored_root: true,
        ..depth(4)
    };
    assert!(params.null_move);
    assert!(!null_move_allowed(&p, 4, 1, false, &params));

    let outcome = run(&p, &params);
    let mut searched: Vec<String> = outcome.root_scores.iter().map(|(mv, _)| mv.to_string()).collect();
    searched.sort();
    assert_eq!(searched, ["d2d1", "f3e1", "g1h2"]);
}

#[test]
fn test_mate_on_hundredth_half_move_beats_fifty_move_rule() {
    // Re8# reaches half-move 100; Rxb1 would reset the clock
    let p = pos("6k1/5ppp/8/8/8/8/8/1n2R1K1 w - - 99 80");
    for max_depth in 1..=3 {
        let outcome = run(&p, &depth(max_depth));
        assert_eq!(outcome.best_move.unwrap().to_string(), "e1e8", "depth {max_depth}");
        assert_eq!(outcome.score, mate_in(1));
    }

    // Without a mate every move reaches half-move 100
    let no_mate = pos("6k1/8/8/8/8/8/8/4R1K1 w - - 99 80");
    assert_eq!(run(&no_mate, &depth(3)).score, DRAW_SCORE);
}

#[test]
fn test_insufficient_material_scores_draw() {
    let p = pos("8/8/8/8/8/5k2/8/4K2N w - - 0 1");
    let outcome = run(&p, &depth(3));
    assert_eq!(outcome.score, DRAW_SCORE);
}

#[test]
fn test_no_legal_moves() {
    let mated = pos("R6k/6pp/8/8/8/8/8/6K1 b - - 0 1");
    let outcome = run(&mated, &depth(3));
    assert!(outcome.best_move.is_none());
    assert_eq!(outcome.score, mated_in(0));

    let stalemate = pos("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
    let outcome = run(&stalemate, &depth(3));
    assert!(outcome.best_move.is_none());
    assert_eq!(outcome.score, DRAW_SCORE);
}

#[test]
fn test_time_limit_stops_search() {
    let p = Position::startpos();
    let params = SearchParams {
        max_depth: 30,
        time_limit: Some(Duration::from_millis(50)),
        check_interval: 64,
        ..SearchParams::default()
    };
    let outcome = run(&p, &params);
    assert!(p.is_legal(outcome.best_move.unwrap()));
    assert!(outcome.stats.depth < 30);
    assert!(outcome.stats.elapsed < Duration::from_secs(2));
}

#[test]
fn test_transposition_table_reduces_work() {
    let p = pos("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");
    let without = run(
        &p,
        &SearchParams {
            use_tt: false,
            ..depth(4)
        },
    );
    let with = run(&p, &depth(4));
    assert!(with.stats.tt_hits > 0);
    assert!(with.stats.nodes < without.stats.nodes);
}

#[test]
fn test_repetition_in_history_is_a_draw() {
    // Up a queen, but Qh2 returns to a position already seen in the game
    let p = pos("1k6/8/8/8/8/8/8/K6Q w - - 0 1");
    let next = p.play(p.parse_move("h1h2").unwrap()).unwrap();
    let params = SearchParams {
        use_tt: false,
        scored_root: true,
        ..depth(1)
    };
    let score_of = |outcome: &SearchOutcome| {
        outcome
            .root_scores
            .iter()
            .find(|(mv, _)| mv.to_string() == "h1h2")
            .map(|&(_, s)| s)
            .unwrap()
    };

    let fresh = search(&p, &[], &params, &mut table(), None);
    let repeated = search(&p, &[next.key()], &params, &mut table(), None);
    assert!(score_of(&fresh) > 500);
    assert_eq!(score_of(&repeated), DRAW_SCORE);
}
