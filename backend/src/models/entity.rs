//! Entity model
//!
//! An entity is the unit of demand a learner must place: a job waiting for
//! the CPU, a file request looking for a cupboard compartment, a car looking
//! for a parking slot. Each entity has:
//! - A stable numeric id (used for tie-breaks) and a display label
//! - Arrival time and total demand (`burst`, which doubles as `size` for
//!   allocation requests)
//! - Remaining demand, decremented while the entity is served
//! - Status (Pending, Waiting, InService, Completed, Rejected)
//!
//! Invariants:
//! - `remaining <= burst`
//! - `remaining == 0` exactly when `status == Completed`
//!
//! Entities are never removed from the registry. Terminal entities stay so
//! that the results summary can recount the whole run.

use crate::models::resource::ResourceId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable entity identifier
///
/// Ordered numerically; "smallest id" tie-breaks use this ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Entity lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    /// Emitted by the arrival generator, not yet visible to the resolver
    Pending,

    /// Arrived and eligible for a decision
    Waiting,

    /// Currently holding the server
    InService,

    /// Fully served (scheduling) or placed (allocation)
    Completed,

    /// No resource could ever hold it (external fragmentation)
    Rejected,
}

impl EntityStatus {
    /// True for statuses no action can leave
    pub fn is_terminal(&self) -> bool {
        matches!(self, EntityStatus::Completed | EntityStatus::Rejected)
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityStatus::Pending => "pending",
            EntityStatus::Waiting => "waiting",
            EntityStatus::InService => "in service",
            EntityStatus::Completed => "completed",
            EntityStatus::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Errors raised by illegal entity transitions
#[derive(Debug, Error, PartialEq)]
pub enum EntityError {
    #[error("Entity {id} cannot {action} while {status}")]
    InvalidTransition {
        id: EntityId,
        status: EntityStatus,
        action: &'static str,
    },

    #[error("Entity {id} violates invariant: {detail}")]
    InvariantViolated { id: EntityId, detail: String },
}

/// A job or allocation request participating in one scenario run
///
/// # Example
/// ```
/// use algorithm_judge_core_rs::{Entity, EntityId, EntityStatus};
///
/// let job = Entity::new(EntityId(1), "P1", 0, 4);
/// assert_eq!(job.status(), EntityStatus::Pending);
/// assert_eq!(job.remaining(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,

    /// Display label ("P1", "File C", "Car 3")
    label: String,

    /// Simulated time at which the entity becomes eligible
    arrival_time: u64,

    /// Total service demand (burst length or request size)
    burst: u64,

    /// Demand still outstanding
    remaining: u64,

    status: EntityStatus,

    /// Time service first started (scheduling only)
    first_service_time: Option<u64>,

    /// Time service finished or the request was placed
    completion_time: Option<u64>,

    /// Time the entity was rejected
    rejection_time: Option<u64>,

    /// Resource currently (or finally) holding the entity
    resource: Option<ResourceId>,

    /// Number of times the entity was switched off the server
    preemptions: u32,
}

impl Entity {
    /// Create a pending entity
    ///
    /// # Panics
    /// Panics if `burst` is zero. Configuration validation rejects zero
    /// demand before any entity is built.
    pub fn new(id: EntityId, label: impl Into<String>, arrival_time: u64, burst: u64) -> Self {
        assert!(burst > 0, "burst must be positive");
        Self {
            id,
            label: label.into(),
            arrival_time,
            burst,
            remaining: burst,
            status: EntityStatus::Pending,
            first_service_time: None,
            completion_time: None,
            rejection_time: None,
            resource: None,
            preemptions: 0,
        }
    }

    // ========================================================================
    // Getters
    // ========================================================================

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn arrival_time(&self) -> u64 {
        self.arrival_time
    }

    /// Total demand (burst length)
    pub fn burst(&self) -> u64 {
        self.burst
    }

    /// Total demand, under its allocation name
    pub fn size(&self) -> u64 {
        self.burst
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn status(&self) -> EntityStatus {
        self.status
    }

    pub fn first_service_time(&self) -> Option<u64> {
        self.first_service_time
    }

    pub fn completion_time(&self) -> Option<u64> {
        self.completion_time
    }

    pub fn rejection_time(&self) -> Option<u64> {
        self.rejection_time
    }

    pub fn resource(&self) -> Option<ResourceId> {
        self.resource
    }

    pub fn preemptions(&self) -> u32 {
        self.preemptions
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Waiting and already arrived at `now`
    pub fn is_eligible(&self, now: u64) -> bool {
        self.status == EntityStatus::Waiting && self.arrival_time <= now
    }

    /// `completion_time - arrival_time`, once completed
    pub fn turnaround_time(&self) -> Option<u64> {
        self.completion_time
            .map(|done| done.saturating_sub(self.arrival_time))
    }

    /// `turnaround_time - burst`, once completed
    pub fn waiting_time(&self) -> Option<u64> {
        self.turnaround_time()
            .map(|turnaround| turnaround.saturating_sub(self.burst))
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn invalid(&self, action: &'static str) -> EntityError {
        EntityError::InvalidTransition {
            id: self.id,
            status: self.status,
            action,
        }
    }

    /// Pending → Waiting
    pub fn admit(&mut self) -> Result<(), EntityError> {
        if self.status != EntityStatus::Pending {
            return Err(self.invalid("be admitted"));
        }
        self.status = EntityStatus::Waiting;
        Ok(())
    }

    /// Waiting → InService on `resource`
    pub fn start_service(&mut self, resource: ResourceId, now: u64) -> Result<(), EntityError> {
        if self.status != EntityStatus::Waiting {
            return Err(self.invalid("start service"));
        }
        self.status = EntityStatus::InService;
        self.resource = Some(resource);
        self.first_service_time.get_or_insert(now);
        Ok(())
    }

    /// InService → Waiting, keeping the remaining demand
    pub fn yield_service(&mut self) -> Result<(), EntityError> {
        if self.status != EntityStatus::InService {
            return Err(self.invalid("yield the server"));
        }
        self.status = EntityStatus::Waiting;
        self.resource = None;
        self.preemptions += 1;
        Ok(())
    }

    /// Consume up to `amount` of remaining demand while in service
    ///
    /// `finished_at` is the simulated time at the end of the served slice;
    /// it becomes the completion time when the demand reaches zero.
    /// Returns the amount actually consumed.
    pub fn serve(&mut self, amount: u64, finished_at: u64) -> Result<u64, EntityError> {
        if self.status != EntityStatus::InService {
            return Err(self.invalid("be served"));
        }
        let consumed = amount.min(self.remaining);
        self.remaining -= consumed;
        if self.remaining == 0 {
            self.status = EntityStatus::Completed;
            self.completion_time = Some(finished_at);
        }
        Ok(consumed)
    }

    /// Waiting → Completed, placed inside `resource`
    ///
    /// Placement satisfies the whole request at once, so the remaining
    /// demand drops to zero.
    pub fn place(&mut self, resource: ResourceId, now: u64) -> Result<(), EntityError> {
        if self.status != EntityStatus::Waiting {
            return Err(self.invalid("be placed"));
        }
        self.status = EntityStatus::Completed;
        self.remaining = 0;
        self.resource = Some(resource);
        self.completion_time = Some(now);
        Ok(())
    }

    /// Waiting → Rejected
    pub fn reject(&mut self, now: u64) -> Result<(), EntityError> {
        if self.status != EntityStatus::Waiting {
            return Err(self.invalid("be rejected"));
        }
        self.status = EntityStatus::Rejected;
        self.rejection_time = Some(now);
        Ok(())
    }

    /// Check the model invariants (used when restoring checkpoints)
    pub fn validate(&self) -> Result<(), EntityError> {
        if self.burst == 0 {
            return Err(EntityError::InvariantViolated {
                id: self.id,
                detail: "burst must be positive".to_string(),
            });
        }
        if self.remaining > self.burst {
            return Err(EntityError::InvariantViolated {
                id: self.id,
                detail: format!("remaining {} exceeds burst {}", self.remaining, self.burst),
            });
        }
        if (self.remaining == 0) != (self.status == EntityStatus::Completed) {
            return Err(EntityError::InvariantViolated {
                id: self.id,
                detail: format!("remaining {} inconsistent with status {}", self.remaining, self.status),
            });
        }
        if self.status == EntityStatus::InService && self.resource.is_none() {
            return Err(EntityError::InvariantViolated {
                id: self.id,
                detail: "in service without a resource".to_string(),
            });
        }
        Ok(())
    }
}
