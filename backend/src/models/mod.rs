//! Domain models for the algorithm judge

pub mod action;
pub mod entity;
pub mod event;
pub mod registry;
pub mod resource;
pub mod score;
pub mod state;

// Re-exports
pub use action::{Action, MalformedAction, Verdict, VerdictReason};
pub use entity::{Entity, EntityError, EntityId, EntityStatus};
pub use event::{Event, EventLog};
pub use registry::{EntityRegistry, RegistryError, ResourceRegistry};
pub use resource::{Resource, ResourceError, ResourceId, ResourceKind};
pub use score::ScoreState;
pub use state::ScenarioState;
