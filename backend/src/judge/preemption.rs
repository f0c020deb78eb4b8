//! Preemption monitor
//!
//! Watches the running job under a preemptive algorithm. After every tick it
//! asks the resolver whether someone else should hold the CPU; if so, a
//! preemption is due and every further tick spent without switching costs
//! the learner a delay penalty.
//!
//! ```text
//! Idle ──start──▶ Serving(a) ──shorter job──▶ PreemptionPending(a, b)
//!   ▲                 │                               │
//!   └────completes────┘◀──────correct switch──────────┘
//! ```
//!
//! Non-preemptive algorithms only ever see `Idle` and `Serving`.

use crate::algorithms::{AlgorithmStrategy, ResolverView};
use crate::models::{EntityId, Event, EventLog, ScenarioState};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where the running job stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
    /// Server is free
    Idle,
    /// Entity holds the server and is the correct holder
    Serving(EntityId),
    /// `from` holds the server but `to` should
    PreemptionPending { from: EntityId, to: EntityId },
}

impl MonitorState {
    pub fn is_pending(&self) -> bool {
        matches!(self, MonitorState::PreemptionPending { .. })
    }

    /// Entity currently holding the server
    pub fn running(&self) -> Option<EntityId> {
        match self {
            MonitorState::Idle => None,
            MonitorState::Serving(id) => Some(*id),
            MonitorState::PreemptionPending { from, .. } => Some(*from),
        }
    }
}

/// Tick-driven checks for preemptive algorithms
#[derive(Debug, Clone, Copy)]
pub struct PreemptionMonitor<'a> {
    strategy: &'a dyn AlgorithmStrategy,
    delay_penalty: i64,
}

impl<'a> PreemptionMonitor<'a> {
    pub fn new(strategy: &'a dyn AlgorithmStrategy, delay_penalty: i64) -> Self {
        Self {
            strategy,
            delay_penalty,
        }
    }

    /// Monitoring only happens under a preemptive algorithm
    pub fn is_active(&self) -> bool {
        self.strategy.is_preemptive()
    }

    /// Charge one tick of delay if a preemption is still outstanding
    ///
    /// Returns the penalty applied (0 when nothing was due).
    pub fn charge_delay(&self, state: &mut ScenarioState, log: &mut EventLog) -> i64 {
        if !self.is_active() || !state.monitor().is_pending() {
            return 0;
        }

        state.score_mut().apply_delay_penalty(self.delay_penalty);
        log.log(Event::PreemptionDelayPenalty {
            time: state.now(),
            penalty: self.delay_penalty,
        });
        self.delay_penalty
    }

    /// Ask the resolver whether the running job should give way
    ///
    /// Returns `(running, preferred)` while a preemption is due.
    pub fn reevaluate(
        &self,
        state: &mut ScenarioState,
        log: &mut EventLog,
    ) -> Option<(EntityId, EntityId)> {
        if !self.is_active() {
            return None;
        }

        let Some(running) = state.entities().in_service().map(|e| e.id()) else {
            state.set_monitor(MonitorState::Idle);
            return None;
        };

        let preferred = self
            .strategy
            .resolve(&ResolverView::of(state))
            .map(|action| action.entity_id);

        match preferred {
            Some(preferred) if preferred != running => {
                let pending = MonitorState::PreemptionPending {
                    from: running,
                    to: preferred,
                };
                if state.monitor() != pending {
                    log.log(Event::PreemptionDue {
                        time: state.now(),
                        running,
                        preferred,
                    });
                    debug!(time = state.now(), running = %running, preferred = %preferred, "preemption due");
                }
                state.set_monitor(pending);
                Some((running, preferred))
            }
            _ => {
                state.set_monitor(MonitorState::Serving(running));
                None
            }
        }
    }
}
