//! Event log for replay, feedback and auditing
//!
//! Every state change the judge makes during a run is recorded as an
//! [`Event`]. The log lets the presentation layer animate what happened
//! between two calls and lets tests assert on the exact sequence of
//! decisions.
//!
//! # Example
//!
//! ```rust
//! use algorithm_judge_core_rs::models::event::{Event, EventLog};
//! use algorithm_judge_core_rs::EntityId;
//!
//! let mut log = EventLog::new();
//! log.log(Event::Arrival { time: 0, entity_id: EntityId(1), size: 4 });
//! assert_eq!(log.events_at(0).len(), 1);
//! ```

use crate::models::action::{Action, MalformedAction};
use crate::models::entity::EntityId;
use crate::models::resource::ResourceId;
use crate::orchestrator::phase::Phase;
use serde::{Deserialize, Serialize};

/// A state change, stamped with the simulated time it happened at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Scenario moved to a new phase
    PhaseChanged { time: u64, from: Phase, to: Phase },

    /// Entity arrived and became visible to the resolver
    Arrival {
        time: u64,
        entity_id: EntityId,
        size: u64,
    },

    /// Entity took the server
    ServiceStarted {
        time: u64,
        entity_id: EntityId,
        resource_id: ResourceId,
    },

    /// Entity finished its burst
    ServiceCompleted {
        time: u64,
        entity_id: EntityId,
        bonus: i64,
    },

    /// A shorter job became available while another one runs
    PreemptionDue {
        time: u64,
        running: EntityId,
        preferred: EntityId,
    },

    /// Running entity was switched off the server
    Preempted {
        time: u64,
        from: EntityId,
        to: EntityId,
    },

    /// Penalty charged for a tick spent without preempting
    PreemptionDelayPenalty { time: u64, penalty: i64 },

    /// Allocation request placed into a partition
    Placed {
        time: u64,
        entity_id: EntityId,
        resource_id: ResourceId,
    },

    /// Allocation request fits nowhere (external fragmentation)
    Rejected {
        time: u64,
        entity_id: EntityId,
        size: u64,
    },

    /// Learner chose differently from the algorithm
    WrongChoice {
        time: u64,
        submitted: Action,
        canonical: Option<Action>,
        penalty: i64,
    },

    /// Learner action could not be applied
    MalformedAction {
        time: u64,
        submitted: Action,
        error: MalformedAction,
    },

    /// Scenario was rebuilt from its config under a new run id
    Restarted { time: u64, run_id: String },
}

impl Event {
    /// Simulated time of the event
    pub fn time(&self) -> u64 {
        match self {
            Event::PhaseChanged { time, .. }
            | Event::Arrival { time, .. }
            | Event::ServiceStarted { time, .. }
            | Event::ServiceCompleted { time, .. }
            | Event::PreemptionDue { time, .. }
            | Event::Preempted { time, .. }
            | Event::PreemptionDelayPenalty { time, .. }
            | Event::Placed { time, .. }
            | Event::Rejected { time, .. }
            | Event::WrongChoice { time, .. }
            | Event::MalformedAction { time, .. }
            | Event::Restarted { time, .. } => *time,
        }
    }

    /// Short name of the event kind
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::PhaseChanged { .. } => "PhaseChanged",
            Event::Arrival { .. } => "Arrival",
            Event::ServiceStarted { .. } => "ServiceStarted",
            Event::ServiceCompleted { .. } => "ServiceCompleted",
            Event::PreemptionDue { .. } => "PreemptionDue",
            Event::Preempted { .. } => "Preempted",
            Event::PreemptionDelayPenalty { .. } => "PreemptionDelayPenalty",
            Event::Placed { .. } => "Placed",
            Event::Rejected { .. } => "Rejected",
            Event::WrongChoice { .. } => "WrongChoice",
            Event::MalformedAction { .. } => "MalformedAction",
            Event::Restarted { .. } => "Restarted",
        }
    }
}

/// Append-only list of events for one run
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events stamped with `time`
    pub fn events_at(&self, time: u64) -> Vec<&Event> {
        self.events.iter().filter(|e| e.time() == time).collect()
    }

    /// Events of one kind, in order
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Events logged after the first `offset` (what changed since a call)
    pub fn since(&self, offset: usize) -> &[Event] {
        &self.events[offset.min(self.events.len())..]
    }
}
