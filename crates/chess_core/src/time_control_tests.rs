use super::*;
use std::thread;

#[test]
fn test_search_limits_constructors() {
    let limits = SearchLimits::depth(5);
    assert_eq!(limits.depth, 5);
    assert!(limits.move_time.is_none());

    let limits = SearchLimits::depth_and_time(4, Duration::from_millis(100));
    assert_eq!(limits.move_time, Some(Duration::from_millis(100)));
    assert_eq!(limits.clock().time_limit(), Some(Duration::from_millis(100)));

    assert_eq!(SearchLimits::time(Duration::from_secs(1)).depth, u8::MAX);
}

#[test]
fn test_time_control_expiry_latches() {
    let mut tc = TimeControl::new(Some(Duration::from_millis(10)));
    tc.start();
    assert!(!tc.check_time());

    thread::sleep(Duration::from_millis(20));
    assert!(tc.check_time());
    assert!(tc.is_stopped());
    assert_eq!(tc.remaining(), Some(Duration::ZERO));

    tc.start();
    assert!(!tc.is_stopped());
}

#[test]
fn test_time_control_no_limit() {
    let mut tc = TimeControl::new(None);
    tc.start();
    thread::sleep(Duration::from_millis(5));
    assert!(!tc.check_time());
    assert_eq!(tc.remaining(), None);
}

#[test]
fn test_unstarted_clock_never_expires() {
    let tc = TimeControl::new(Some(Duration::ZERO));
    assert_eq!(tc.elapsed(), Duration::ZERO);
    assert!(!tc.check_time());
}

#[test]
fn test_manual_stop() {
    let mut tc = TimeControl::default();
    tc.start();
    tc.stop();
    assert!(tc.check_time());
}

#[test]
fn test_custom_check_interval() {
    let tc = TimeControl::new(None).with_check_interval(4);
    assert!(tc.should_check_time(8));
    assert!(!tc.should_check_time(9));
    assert!(TimeControl::new(None).with_check_interval(0).should_check_time(3));
}

#[test]
fn test_used_fraction() {
    let mut tc = TimeControl::new(Some(Duration::from_millis(40)));
    tc.start();
    assert!(!tc.used_fraction_exceeds(0.9));
    thread::sleep(Duration::from_millis(25));
    assert!(tc.used_fraction_exceeds(0.5));
    assert!(!TimeControl::new(None).used_fraction_exceeds(0.0));
}
