//! Results aggregation
//!
//! Once a run reaches the Results phase it is summarized into a read-only
//! [`ResultsSummary`]. The summary is the only artifact that leaves the
//! engine: it is rendered by the caller and handed to a
//! [`PersistenceService`] as a [`PersistencePayload`].

pub mod persistence;

use crate::algorithms::{Algorithm, AlgorithmFamily};
use crate::judge::FragmentationMetrics;
use crate::models::{Entity, EntityId, EntityStatus, ScenarioState};
use serde::{Deserialize, Serialize};

pub use persistence::{PersistenceError, PersistencePayload, PersistenceService};

/// Per-entity timing figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityStats {
    pub id: EntityId,
    pub label: String,
    pub arrival_time: u64,
    pub burst: u64,
    pub status: EntityStatus,
    pub first_service_time: Option<u64>,
    pub completion_time: Option<u64>,

    /// `completion_time - arrival_time`
    pub turnaround_time: Option<u64>,

    /// `turnaround_time - burst`
    pub waiting_time: Option<u64>,

    pub preemptions: u32,
}

impl EntityStats {
    /// Stats for an entity judged under `family`
    ///
    /// A placed allocation request holds no burst of service, so its
    /// waiting time is the whole delay until placement.
    pub fn for_family(entity: &Entity, family: AlgorithmFamily) -> Self {
        let mut stats = Self::from(entity);
        if family == AlgorithmFamily::Allocation {
            stats.waiting_time = stats.turnaround_time;
        }
        stats
    }
}

impl From<&Entity> for EntityStats {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id(),
            label: entity.label().to_string(),
            arrival_time: entity.arrival_time(),
            burst: entity.burst(),
            status: entity.status(),
            first_service_time: entity.first_service_time(),
            completion_time: entity.completion_time(),
            turnaround_time: entity.turnaround_time(),
            waiting_time: entity.waiting_time(),
            preemptions: entity.preemptions(),
        }
    }
}

/// Final, read-only account of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsSummary {
    pub run_id: String,
    pub scenario_id: String,
    pub algorithm: Algorithm,

    /// Score clamped at zero
    pub points: i64,

    /// True signed score
    pub raw_points: i64,

    /// Percentage of correct attempts (0 when nothing was attempted)
    pub accuracy: f64,

    pub correct_attempts: u32,
    pub wrong_attempts: u32,
    pub malformed_actions: u32,
    pub preemption_penalty_total: i64,
    pub completion_bonus_total: i64,

    /// Simulated time at the end of the run
    pub time_spent: u64,

    /// Entities in id order
    pub entities: Vec<EntityStats>,

    /// Mean turnaround over completed entities
    pub average_turnaround: Option<f64>,

    /// Mean waiting time over completed entities
    pub average_waiting: Option<f64>,

    pub rejected: u32,

    /// Present for allocation lessons only
    pub fragmentation: Option<FragmentationMetrics>,
}

impl ResultsSummary {
    /// Aggregate a finished run
    pub fn from_state(
        run_id: impl Into<String>,
        scenario_id: impl Into<String>,
        algorithm: Algorithm,
        state: &ScenarioState,
    ) -> Self {
        let score = state.score();
        let family = algorithm.family();
        let entities: Vec<EntityStats> = state
            .entities()
            .iter()
            .map(|e| EntityStats::for_family(e, family))
            .collect();

        let fragmentation = match family {
            AlgorithmFamily::Allocation => Some(FragmentationMetrics::calculate(
                state.entities(),
                state.resources(),
                state.rejections(),
            )),
            AlgorithmFamily::Scheduling => None,
        };

        Self {
            run_id: run_id.into(),
            scenario_id: scenario_id.into(),
            algorithm,
            points: score.display_points(),
            raw_points: score.points(),
            accuracy: score.accuracy(),
            correct_attempts: score.correct_attempts(),
            wrong_attempts: score.wrong_attempts(),
            malformed_actions: score.malformed_actions(),
            preemption_penalty_total: score.preemption_penalty_total(),
            completion_bonus_total: score.completion_bonus_total(),
            time_spent: state.now(),
            average_turnaround: mean(entities.iter().filter_map(|e| e.turnaround_time)),
            average_waiting: mean(entities.iter().filter_map(|e| e.waiting_time)),
            entities,
            rejected: state.rejections(),
            fragmentation,
        }
    }

    pub fn completed(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| e.status == EntityStatus::Completed)
            .count()
    }
}

fn mean(values: impl Iterator<Item = u64>) -> Option<f64> {
    let (sum, count) = values.fold((0u64, 0u64), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum as f64 / count as f64)
    }
}
