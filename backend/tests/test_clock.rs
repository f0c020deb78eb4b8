//! Tests for the simulated clock
//!
//! The clock only moves when told to, in whole ticks.

use algorithm_judge_core_rs::Clock;

#[test]
fn test_clock_new() {
    let clock = Clock::new(1);
    assert_eq!(clock.now(), 0);
    assert_eq!(clock.ticks_elapsed(), 0);
    assert_eq!(clock.tick_size(), 1);
}

#[test]
fn test_tick_advances_by_tick_size() {
    let mut clock = Clock::new(5);

    clock.tick();
    assert_eq!(clock.now(), 5);

    clock.tick();
    assert_eq!(clock.now(), 10);
    assert_eq!(clock.ticks_elapsed(), 2);
}

#[test]
fn test_ticks_for_rounds_up() {
    let clock = Clock::new(3);
    assert_eq!(clock.ticks_for(0), 0);
    assert_eq!(clock.ticks_for(1), 1);
    assert_eq!(clock.ticks_for(3), 1);
    assert_eq!(clock.ticks_for(7), 3);
}

#[test]
fn test_restored_clock_continues() {
    let mut clock = Clock::at(12, 2, 6);
    clock.tick();
    assert_eq!(clock.now(), 14);
    assert_eq!(clock.ticks_elapsed(), 7);
}

#[test]
#[should_panic(expected = "tick_size must be positive")]
fn test_zero_tick_size_panics() {
    Clock::new(0);
}
