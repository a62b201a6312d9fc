use super::*;
use chess_core::{mate_in, mated_in};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn mv(from: u8, to: u8) -> Move {
    Move::new(from, to)
}

#[test]
fn test_levels_clamp() {
    assert_eq!(Difficulty::new(0).level(), 1);
    assert_eq!(Difficulty::new(99).level(), 20);
    assert!(Difficulty::try_from(21).is_err());
}

#[test]
fn test_coarse_scale_covers_range() {
    assert_eq!(Difficulty::from_coarse(1).level(), 1);
    assert_eq!(Difficulty::from_coarse(9).level(), 20);
    let mut last = 0;
    for c in 1..=9 {
        let level = Difficulty::from_coarse(c).level();
        assert!(level > last, "coarse scale must be increasing");
        last = level;
    }
}

#[test]
fn test_profile_monotonic() {
    let weak = Difficulty::new(1).profile();
    let strong = Difficulty::new(20).profile();

    assert_eq!(weak.max_depth, 1);
    assert_eq!(strong.max_depth, 7);
    assert!(weak.move_time < strong.move_time);
    assert!(!weak.quiescence && strong.quiescence);
    assert!(!weak.null_move && strong.null_move);
    assert!(weak.weakening.probability > 0.4);
    assert_eq!(strong.weakening.probability, 0.0);
    assert!(weak.weakening.top_k > strong.weakening.top_k);
}

#[test]
fn test_difficulty_serde_range() {
    #[derive(serde::Deserialize)]
    struct Holder {
        level: Difficulty,
    }
    let ok: Holder = toml::from_str("level = 7").unwrap();
    assert_eq!(ok.level.level(), 7);
    assert!(toml::from_str::<Holder>("level = 30").is_err());
}

#[test]
fn test_weaken_never_skips_mate() {
    let scored = vec![(mv(0, 1), mate_in(1)), (mv(2, 3), 50), (mv(4, 5), 40)];
    let always = Weakening {
        probability: 1.0,
        top_k: 3,
        max_loss_cp: 10_000,
    };
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..50 {
        assert_eq!(weaken(&scored, &always, &mut rng).unwrap().0, mv(0, 1));
    }
}

#[test]
fn test_weaken_excludes_blunders_and_mated_lines() {
    let scored = vec![
        (mv(0, 1), 100),
        (mv(2, 3), 60),
        (mv(4, 5), -400), // loses too much
        (mv(6, 7), mated_in(2)),
    ];
    let always = Weakening {
        probability: 1.0,
        top_k: 4,
        max_loss_cp: 300,
    };
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let (chosen, _) = weaken(&scored, &always, &mut rng).unwrap();
        assert_eq!(chosen, mv(2, 3));
    }
}

#[test]
fn test_weaken_is_reproducible_with_seed() {
    let scored: Vec<(Move, i32)> = (0..6).map(|i| (mv(i, i + 8), 100 - i as i32 * 10)).collect();
    let w = Difficulty::new(1).profile().weakening;

    let picks = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..30)
            .map(|_| weaken(&scored, &w, &mut rng).unwrap().0)
            .collect::<Vec<_>>()
    };
    assert_eq!(picks(11), picks(11));
}

#[test]
fn test_weaken_off_returns_best() {
    let scored = vec![(mv(0, 1), 10), (mv(2, 3), 9)];
    let mut rng = StdRng::seed_from_u64(3);
    assert_eq!(weaken(&scored, &Weakening::OFF, &mut rng).unwrap().0, mv(0, 1));
    assert!(weaken(&[], &Weakening::OFF, &mut rng).is_none());
}
