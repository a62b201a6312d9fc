use super::*;

#[test]
fn test_mate_dominates_centipawns() {
    let big = Evaluation::Centipawns(5_000);
    assert!(Evaluation::MateIn(9) > big);
    assert!(Evaluation::MatedIn(9) < Evaluation::Centipawns(-5_000));
}

#[test]
fn test_shorter_mate_is_better() {
    assert!(Evaluation::MateIn(1) > Evaluation::MateIn(3));
    assert!(Evaluation::MatedIn(4) > Evaluation::MatedIn(2));
}

#[test]
fn test_score_roundtrip_for_mates() {
    assert_eq!(Evaluation::from_score(mate_in(3)), Evaluation::MateIn(3));
    assert_eq!(Evaluation::from_score(mated_in(0)), Evaluation::MatedIn(0));
    assert_eq!(Evaluation::from_score(250), Evaluation::Centipawns(250));
}

#[test]
fn test_negate() {
    assert_eq!(Evaluation::MateIn(1).negate(), Evaluation::MatedIn(1));
    assert_eq!(Evaluation::Centipawns(40).negate(), Evaluation::Centipawns(-40));
}

#[test]
fn test_display() {
    assert_eq!(Evaluation::Centipawns(125).to_string(), "+1.25");
    assert_eq!(Evaluation::MateIn(1).to_string(), "#1");
    assert_eq!(Evaluation::MatedIn(4).to_string(), "#-2");
}
