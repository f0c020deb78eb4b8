//! Persistence collaborator boundary
//!
//! The engine never stores anything itself. A caller-supplied
//! [`PersistenceService`] receives the payload of a finished run and answers
//! with any achievement ids it unlocked. Failures there must never keep the
//! learner from seeing local results, so [`ResultsSummary::publish`] logs
//! them and moves on.

use super::ResultsSummary;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

/// Shape handed to the persistence collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistencePayload {
    pub scenario_id: String,
    pub score: i64,
    pub time_spent: u64,
    pub accuracy: f64,
    pub wrong_attempts: u32,
    /// Free-form extras (algorithm, run id, averages, fragmentation)
    pub metadata: serde_json::Value,
}

#[derive(Debug, Error, PartialEq)]
pub enum PersistenceError {
    #[error("Persistence service unavailable: {0}")]
    Unavailable(String),

    #[error("Persistence service rejected the payload: {0}")]
    Rejected(String),
}

/// External store for finished runs
pub trait PersistenceService {
    /// Store a run, returning the ids of any achievements it unlocked
    fn record(&mut self, payload: &PersistencePayload) -> Result<Vec<String>, PersistenceError>;
}

impl ResultsSummary {
    /// Payload for the persistence collaborator
    pub fn persistence_payload(&self) -> PersistencePayload {
        PersistencePayload {
            scenario_id: self.scenario_id.clone(),
            score: self.points,
            time_spent: self.time_spent,
            accuracy: self.accuracy,
            wrong_attempts: self.wrong_attempts,
            metadata: json!({
                "run_id": self.run_id,
                "algorithm": self.algorithm,
                "correct_attempts": self.correct_attempts,
                "raw_points": self.raw_points,
                "average_turnaround": self.average_turnaround,
                "average_waiting": self.average_waiting,
                "rejected": self.rejected,
                "fragmentation": self.fragmentation,
            }),
        }
    }

    /// Hand the run to `service`, fire-and-forget
    ///
    /// Returns the unlocked achievement ids, or an empty list when the
    /// service failed.
    pub fn publish(&self, service: &mut dyn PersistenceService) -> Vec<String> {
        match service.record(&self.persistence_payload()) {
            Ok(achievements) => {
                info!(
                    scenario = %self.scenario_id,
                    run_id = %self.run_id,
                    unlocked = achievements.len(),
                    "results published"
                );
                achievements
            }
            Err(e) => {
                warn!(scenario = %self.scenario_id, run_id = %self.run_id, error = %e, "failed to publish results");
                Vec::new()
            }
        }
    }
}
