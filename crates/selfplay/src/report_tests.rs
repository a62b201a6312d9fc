use super::*;

fn record(game: u32, first_is_white: bool, result: GameResult) -> GameRecord {
    GameRecord {
        game,
        white: if first_is_white { "first" } else { "second" }.to_string(),
        black: if first_is_white { "second" } else { "first" }.to_string(),
        first_is_white,
        result,
        termination: Termination::Checkmate,
        plies: 40,
        moves: vec!["e2e4".to_string()],
    }
}

#[test]
fn test_totals_follow_colors() {
    let mut report = SessionReport::new("first", "second");
    report.add_game(record(1, true, GameResult::WhiteWins));
    report.add_game(record(2, false, GameResult::WhiteWins));
    report.add_game(record(3, false, GameResult::BlackWins));
    report.add_game(record(4, true, GameResult::Draw));

    assert_eq!(report.first_wins, 2);
    assert_eq!(report.second_wins, 1);
    assert_eq!(report.draws, 1);
    assert_eq!(report.total_games(), 4);
    assert!((report.first_score() - 0.625).abs() < 1e-9);
}

#[test]
fn test_empty_report_scores_even() {
    assert_eq!(SessionReport::new("a", "b").first_score(), 0.5);
}

#[test]
fn test_json_layout() {
    let mut report = SessionReport::new("first", "second");
    let mut game = record(1, true, GameResult::Draw);
    game.termination = Termination::FiftyMoveRule;
    report.add_game(game);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["games"][0]["result"], "1/2-1/2");
    assert_eq!(json["games"][0]["termination"], "fifty_move_rule");
    assert_eq!(json["draws"], 1);
}

#[test]
fn test_save_and_load() {
    let path = std::env::temp_dir()
        .join(format!("selfplay_report_{}", std::process::id()))
        .join("report.json");
    let mut report = SessionReport::new("first", "second");
    report.add_game(record(1, true, GameResult::BlackWins));
    report.save(&path).unwrap();

    let loaded = SessionReport::load(&path).unwrap();
    assert_eq!(loaded, report);
    assert!(loaded.generate_report().contains("0 wins, 1 losses, 0 draws"));

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}
