//! xorshift64* random number generator
//!
//! Small, fast and fully deterministic: the same seed yields the same
//! sequence on every platform. Randomized lessons rely on this to make a
//! generated roster reproducible from its seed alone.

use serde::{Deserialize, Serialize};

/// Seeded xorshift64* generator
///
/// # Example
/// ```
/// use algorithm_judge_core_rs::RngManager;
///
/// let mut rng = RngManager::new(7);
/// let burst = rng.range_inclusive(1, 10);
/// assert!((1..=10).contains(&burst));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a generator from a seed
    ///
    /// A zero seed would lock xorshift at zero forever, so it is mapped to 1.
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Next raw 64-bit value
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Uniform value in `[min, max]`
    ///
    /// # Panics
    /// Panics if `min > max`
    pub fn range_inclusive(&mut self, min: u64, max: u64) -> u64 {
        assert!(min <= max, "min must not exceed max");
        let span = max - min;
        if span == u64::MAX {
            return self.next_u64();
        }
        min + self.next_u64() % (span + 1)
    }

    /// Pick an index with probability proportional to its weight
    ///
    /// Returns `None` when every weight is zero.
    ///
    /// ```
    /// use algorithm_judge_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(3);
    /// assert_eq!(rng.weighted_index(&[0, 5, 0]), Some(1));
    /// assert_eq!(rng.weighted_index(&[0, 0]), None);
    /// ```
    pub fn weighted_index(&mut self, weights: &[u32]) -> Option<usize> {
        let total: u64 = weights.iter().map(|w| u64::from(*w)).sum();
        if total == 0 {
            return None;
        }
        let mut target = self.next_u64() % total;
        for (idx, weight) in weights.iter().enumerate() {
            let weight = u64::from(*weight);
            if target < weight {
                return Some(idx);
            }
            target -= weight;
        }
        None
    }

    /// Current internal state
    pub fn state(&self) -> u64 {
        self.state
    }
}
