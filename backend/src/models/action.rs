//! Learner actions and the verdicts they receive

use crate::models::entity::{EntityId, EntityStatus};
use crate::models::resource::ResourceId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A decision: put `entity_id` on (or into) `resource_id`
///
/// The same shape is used for what the learner submits and for the
/// canonical answer the resolver computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub entity_id: EntityId,
    pub resource_id: ResourceId,
}

impl Action {
    pub fn new(entity_id: EntityId, resource_id: ResourceId) -> Self {
        Self {
            entity_id,
            resource_id,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.entity_id, self.resource_id)
    }
}

/// Why an action could not be applied at all
///
/// These are interface misuse, not learning signals: no score penalty.
#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
pub enum MalformedAction {
    #[error("Unknown entity {0}")]
    UnknownEntity(EntityId),

    #[error("Unknown resource {0}")]
    UnknownResource(ResourceId),

    #[error("Entity {entity} has not arrived yet")]
    NotArrived { entity: EntityId },

    #[error("Entity {entity} is {status} and cannot be chosen")]
    NotWaiting {
        entity: EntityId,
        status: EntityStatus,
    },

    #[error("Resource {resource} has {available} free but entity needs {size}")]
    CannotFit {
        resource: ResourceId,
        size: u64,
        available: u64,
    },

    #[error("Server {resource} is busy with {occupant}")]
    ServerBusy {
        resource: ResourceId,
        occupant: EntityId,
    },

    #[error("Resource {resource} is not used by this kind of lesson")]
    WrongResourceKind { resource: ResourceId },
}

/// Outcome category of a submitted action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictReason {
    /// Matched the canonical action and was applied
    Correct,
    /// Well formed, but not what the algorithm would do
    WrongChoice,
    /// Rejected before consulting the algorithm
    Malformed(MalformedAction),
}

/// Ephemeral result of one submitted action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub accepted: bool,
    pub reason: VerdictReason,
    pub submitted: Action,
    /// What the algorithm prescribes, when it was consulted
    pub canonical: Option<Action>,
    pub score_delta: i64,
    /// Human-readable explanation for the learner
    pub feedback: String,
}

impl Verdict {
    pub fn correct(submitted: Action, score_delta: i64, feedback: String) -> Self {
        Self {
            accepted: true,
            reason: VerdictReason::Correct,
            submitted,
            canonical: Some(submitted),
            score_delta,
            feedback,
        }
    }

    pub fn wrong(
        submitted: Action,
        canonical: Option<Action>,
        score_delta: i64,
        feedback: String,
    ) -> Self {
        Self {
            accepted: false,
            reason: VerdictReason::WrongChoice,
            submitted,
            canonical,
            score_delta,
            feedback,
        }
    }

    pub fn malformed(submitted: Action, error: MalformedAction) -> Self {
        let feedback = error.to_string();
        Self {
            accepted: false,
            reason: VerdictReason::Malformed(error),
            submitted,
            canonical: None,
            score_delta: 0,
            feedback,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self.reason, VerdictReason::Malformed(_))
    }
}
