//! Judging components
//!
//! - **validator**: checks a learner action, compares it with the canonical
//!   resolver and scores it
//! - **preemption**: tick-driven watch over the running job for preemptive
//!   algorithms
//! - **fragmentation**: utilization and fragmentation metrics for allocation
//!   lessons
//! - **service**: the registry mutations shared by the components above
//!
//! All of them work on a borrowed [`ScenarioState`](crate::models::ScenarioState);
//! none of them keeps state of its own.

pub mod fragmentation;
pub mod preemption;
pub mod service;
pub mod validator;

use crate::models::{EntityError, EntityId, ResourceError, ResourceId};
use thiserror::Error;

pub use fragmentation::FragmentationMetrics;
pub use preemption::{MonitorState, PreemptionMonitor};
pub use validator::ActionValidator;

/// A mutation the judge attempted was refused by the model
///
/// Validation runs before every mutation, so this signals corrupted state
/// rather than a learner mistake.
#[derive(Debug, Error, PartialEq)]
pub enum JudgeError {
    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("Entity {0} is not registered")]
    MissingEntity(EntityId),

    #[error("Resource {0} is not registered")]
    MissingResource(ResourceId),

    #[error("Entity {0} is in service without a resource")]
    Unassigned(EntityId),
}
