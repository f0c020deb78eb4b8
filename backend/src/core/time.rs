//! Simulated time for a scenario run
//!
//! The judge never reads wall-clock time. The presentation layer paces calls
//! to `Scenario::advance`, and the clock only moves by the deltas it is given,
//! so a run behaves identically under any frame rate.

use serde::{Deserialize, Serialize};

/// Monotonic simulated-time source
///
/// Time is measured in abstract units (the same units as arrival times and
/// burst lengths). The clock is advanced in fixed `tick_size` steps.
///
/// # Example
/// ```
/// use algorithm_judge_core_rs::Clock;
///
/// let mut clock = Clock::new(1);
/// assert_eq!(clock.now(), 0);
///
/// clock.tick();
/// clock.tick();
/// assert_eq!(clock.now(), 2);
/// assert_eq!(clock.ticks_elapsed(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    /// Current simulated time
    now: u64,
    /// Length of one tick in time units
    tick_size: u64,
    /// Number of ticks processed since the run started
    ticks_elapsed: u64,
}

impl Clock {
    /// Create a clock at time zero
    ///
    /// # Panics
    /// Panics if `tick_size` is zero. Scenario configuration rejects a zero
    /// tick size before a clock is ever built.
    pub fn new(tick_size: u64) -> Self {
        assert!(tick_size > 0, "tick_size must be positive");
        Self {
            now: 0,
            tick_size,
            ticks_elapsed: 0,
        }
    }

    /// Restore a clock at an arbitrary point (checkpoint restore)
    pub fn at(now: u64, tick_size: u64, ticks_elapsed: u64) -> Self {
        assert!(tick_size > 0, "tick_size must be positive");
        Self {
            now,
            tick_size,
            ticks_elapsed,
        }
    }

    /// Advance by exactly one tick
    pub fn tick(&mut self) {
        self.now += self.tick_size;
        self.ticks_elapsed += 1;
    }

    /// Number of whole ticks needed to cover `delta` time units
    ///
    /// ```
    /// use algorithm_judge_core_rs::Clock;
    ///
    /// let clock = Clock::new(2);
    /// assert_eq!(clock.ticks_for(5), 3);
    /// assert_eq!(clock.ticks_for(0), 0);
    /// ```
    pub fn ticks_for(&self, delta: u64) -> u64 {
        delta.div_ceil(self.tick_size)
    }

    /// Current simulated time
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Length of one tick
    pub fn tick_size(&self) -> u64 {
        self.tick_size
    }

    /// Ticks processed so far
    pub fn ticks_elapsed(&self) -> u64 {
        self.ticks_elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "tick_size must be positive")]
    fn test_zero_tick_size_panics() {
        Clock::new(0);
    }

    #[test]
    fn test_tick_size_scales_time() {
        let mut clock = Clock::new(5);
        clock.tick();
        clock.tick();
        assert_eq!(clock.now(), 10);
        assert_eq!(clock.ticks_elapsed(), 2);
    }
}
