//! Score accounting for one run
//!
//! Points are kept as a true signed total. Only the displayed value is
//! clamped at zero. Totals saturate instead of wrapping.

use serde::{Deserialize, Serialize};

/// Running score and attempt counters
///
/// Mutated only by the action validator and the preemption monitor. Reset
/// only by a full restart.
///
/// # Example
/// ```
/// use algorithm_judge_core_rs::ScoreState;
///
/// let mut score = ScoreState::new();
/// score.record_wrong(-10);
/// assert_eq!(score.points(), -10);
/// assert_eq!(score.display_points(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreState {
    points: i64,
    correct_attempts: u32,
    wrong_attempts: u32,
    malformed_actions: u32,
    /// Sum of per-tick delay penalties (stored as a positive amount)
    preemption_penalty_total: i64,
    /// Sum of completion bonuses awarded
    completion_bonus_total: i64,
}

impl ScoreState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Correct action: apply the reward and count the attempt
    pub fn record_correct(&mut self, delta: i64) {
        self.points = self.points.saturating_add(delta);
        self.correct_attempts += 1;
    }

    /// Wrong choice: apply the (negative) delta and count the attempt
    pub fn record_wrong(&mut self, delta: i64) {
        self.points = self.points.saturating_add(delta);
        self.wrong_attempts += 1;
    }

    /// Malformed action: counted but never scored
    pub fn record_malformed(&mut self) {
        self.malformed_actions += 1;
    }

    /// Bonus for a finished entity
    pub fn award_completion(&mut self, bonus: i64) {
        self.points = self.points.saturating_add(bonus);
        self.completion_bonus_total = self.completion_bonus_total.saturating_add(bonus);
    }

    /// Real-time cost of not preempting promptly
    pub fn apply_delay_penalty(&mut self, penalty: i64) {
        self.points = self.points.saturating_sub(penalty);
        self.preemption_penalty_total = self.preemption_penalty_total.saturating_add(penalty);
    }

    /// True signed total
    pub fn points(&self) -> i64 {
        self.points
    }

    /// Total clamped at zero for display
    pub fn display_points(&self) -> i64 {
        self.points.max(0)
    }

    pub fn correct_attempts(&self) -> u32 {
        self.correct_attempts
    }

    pub fn wrong_attempts(&self) -> u32 {
        self.wrong_attempts
    }

    pub fn malformed_actions(&self) -> u32 {
        self.malformed_actions
    }

    pub fn preemption_penalty_total(&self) -> i64 {
        self.preemption_penalty_total
    }

    pub fn completion_bonus_total(&self) -> i64 {
        self.completion_bonus_total
    }

    /// `100 × correct / (correct + wrong)`, or 0 when nothing was attempted
    pub fn accuracy(&self) -> f64 {
        let attempts = self.correct_attempts + self.wrong_attempts;
        if attempts == 0 {
            return 0.0;
        }
        100.0 * f64::from(self.correct_attempts) / f64::from(attempts)
    }
}
