//! Scenario phase state machine
//!
//! ```text
//! Intro ──ack──▶ Arrival ──opening batch in──▶ Active ──all terminal──▶ Results
//! ```
//!
//! Transitions only move forward. The only way back is a full restart,
//! which rebuilds the whole scenario state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Briefing shown, waiting for the learner to acknowledge it
    Intro,
    /// Opening batch of entities arriving
    Arrival,
    /// Learner is processing, placing or treating entities
    Active,
    /// Terminal: summary available
    Results,
}

impl Phase {
    /// Whether learner actions are accepted
    pub fn accepts_actions(&self) -> bool {
        *self == Phase::Active
    }

    /// Whether simulated time may advance
    pub fn accepts_ticks(&self) -> bool {
        matches!(self, Phase::Arrival | Phase::Active)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Intro => "intro",
            Phase::Arrival => "arrival",
            Phase::Active => "active",
            Phase::Results => "results",
        };
        f.write_str(name)
    }
}

/// Registry facts the transition guards look at
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseSignals {
    /// Learner dismissed the briefing
    pub briefing_acknowledged: bool,
    /// The generator still holds an entity due at the current time
    pub arrivals_due: bool,
    /// The generator has nothing left to release
    pub arrivals_exhausted: bool,
    /// At least one entity can be acted on now
    pub any_eligible: bool,
    /// Every registered entity is completed or rejected
    pub all_terminal: bool,
    /// Arrival waits for an eligible entity before handing over
    pub require_eligible: bool,
}

/// The transition to take from `current`, if its guard holds
pub fn next_phase(current: Phase, signals: &PhaseSignals) -> Option<Phase> {
    match current {
        Phase::Intro if signals.briefing_acknowledged => Some(Phase::Arrival),
        Phase::Arrival
            if !signals.arrivals_due && (signals.any_eligible || !signals.require_eligible) =>
        {
            Some(Phase::Active)
        }
        Phase::Active if signals.arrivals_exhausted && signals.all_terminal => Some(Phase::Results),
        _ => None,
    }
}
