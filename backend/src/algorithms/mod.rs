//! Algorithm strategies (the canonical resolver)
//!
//! Each lesson is judged against one algorithm. An algorithm is a small
//! strategy object with a single pure query: given the registries and the
//! current time, what is the one correct next action?
//!
//! # Strategy Interface
//!
//! ```rust
//! use algorithm_judge_core_rs::algorithms::{AlgorithmFamily, AlgorithmStrategy, ResolverView};
//! use algorithm_judge_core_rs::Action;
//!
//! #[derive(Debug)]
//! struct NeverAct;
//!
//! impl AlgorithmStrategy for NeverAct {
//!     fn name(&self) -> &'static str {
//!         "NONE"
//!     }
//!
//!     fn family(&self) -> AlgorithmFamily {
//!         AlgorithmFamily::Scheduling
//!     }
//!
//!     fn criterion(&self) -> &'static str {
//!         "doing nothing"
//!     }
//!
//!     fn resolve(&self, _view: &ResolverView<'_>) -> Option<Action> {
//!         None
//!     }
//! }
//! ```
//!
//! Resolution never mutates anything, so the validator and the preemption
//! monitor can both ask "what is correct right now" as often as they like.
//!
//! Available algorithms:
//! 1. **FCFS**: earliest arrival first
//! 2. **SJF**: shortest burst first, non-preemptive
//! 3. **SRTF**: shortest remaining time first, preemptive
//! 4. **First-Fit**: first partition in declaration order that fits
//! 5. **Best-Fit**: tightest partition that fits

use crate::models::registry::{EntityRegistry, ResourceRegistry};
use crate::models::state::ScenarioState;
use crate::models::{Action, Entity, ResourceId};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod best_fit;
pub mod fcfs;
pub mod first_fit;
pub mod sjf;
pub mod srtf;

pub use best_fit::BestFit;
pub use fcfs::Fcfs;
pub use first_fit::FirstFit;
pub use sjf::Sjf;
pub use srtf::Srtf;

/// Which kind of lesson an algorithm judges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmFamily {
    /// Single CPU, entities are served over time
    Scheduling,
    /// Many partitions, entities are placed once
    Allocation,
}

/// Read-only view the resolver works on
#[derive(Debug, Clone, Copy)]
pub struct ResolverView<'a> {
    pub entities: &'a EntityRegistry,
    pub resources: &'a ResourceRegistry,
    pub now: u64,
}

impl<'a> ResolverView<'a> {
    pub fn new(entities: &'a EntityRegistry, resources: &'a ResourceRegistry, now: u64) -> Self {
        Self {
            entities,
            resources,
            now,
        }
    }

    pub fn of(state: &'a ScenarioState) -> Self {
        Self::new(state.entities(), state.resources(), state.now())
    }

    /// Earliest-arrived eligible entity (ties by smallest id)
    ///
    /// This is the FCFS choice and the request an allocation lesson is
    /// currently deciding on.
    pub fn head_of_line(&self) -> Option<&'a Entity> {
        self.entities
            .eligible(self.now)
            .min_by_key(|e| (e.arrival_time(), e.id()))
    }
}

/// A canonical resolver for one algorithm
///
/// # Contract
/// `resolve` is pure: same view in, same answer out, nothing mutated.
/// It returns `None` when no action is currently valid (nothing waiting,
/// the server is busy under a non-preemptive rule, or no partition fits).
pub trait AlgorithmStrategy: Send + Sync + Debug {
    /// Short name ("FCFS", "Best-Fit")
    fn name(&self) -> &'static str;

    fn family(&self) -> AlgorithmFamily;

    /// Whether the running entity can be displaced by a better one
    fn is_preemptive(&self) -> bool {
        false
    }

    /// The ranking criterion, phrased for learner feedback
    fn criterion(&self) -> &'static str;

    /// The single correct next action, if any
    fn resolve(&self, view: &ResolverView<'_>) -> Option<Action>;
}

/// Algorithm selection in a scenario config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Fcfs,
    Sjf,
    Srtf,
    FirstFit,
    BestFit,
}

impl Algorithm {
    /// Build the strategy object for this algorithm
    pub fn strategy(&self) -> Box<dyn AlgorithmStrategy> {
        match self {
            Algorithm::Fcfs => Box::new(Fcfs),
            Algorithm::Sjf => Box::new(Sjf),
            Algorithm::Srtf => Box::new(Srtf),
            Algorithm::FirstFit => Box::new(FirstFit),
            Algorithm::BestFit => Box::new(BestFit),
        }
    }

    pub fn family(&self) -> AlgorithmFamily {
        match self {
            Algorithm::Fcfs | Algorithm::Sjf | Algorithm::Srtf => AlgorithmFamily::Scheduling,
            Algorithm::FirstFit | Algorithm::BestFit => AlgorithmFamily::Allocation,
        }
    }
}

/// Idle server for a non-preemptive scheduling rule, if there is one
fn idle_server(view: &ResolverView<'_>) -> Option<ResourceId> {
    view.resources
        .server()
        .filter(|server| !server.is_occupied())
        .map(|server| server.id())
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::registry::{EntityRegistry, ResourceRegistry};
    use crate::models::{Entity, EntityId, Resource, ResourceId};

    /// Entities `(id, arrival, burst)`, all admitted
    pub fn waiting(specs: &[(u32, u64, u64)]) -> EntityRegistry {
        let mut registry = EntityRegistry::new();
        for &(id, arrival, burst) in specs {
            let mut entity = Entity::new(EntityId(id), format!("P{}", id), arrival, burst);
            entity.admit().unwrap();
            registry.insert(entity).unwrap();
        }
        registry
    }

    pub fn cpu() -> ResourceRegistry {
        ResourceRegistry::new(vec![Resource::server(ResourceId(0), "CPU")]).unwrap()
    }

    /// Partitions with ids 1.. in the given order
    pub fn partitions(capacities: &[u64]) -> ResourceRegistry {
        ResourceRegistry::new(
            capacities
                .iter()
                .enumerate()
                .map(|(i, cap)| {
                    Resource::partition(ResourceId(i as u32 + 1), format!("Block {}", i + 1), *cap)
                })
                .collect(),
        )
        .unwrap()
    }
}
