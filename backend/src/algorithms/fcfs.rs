//! FCFS (First-Come-First-Served)
//!
//! Serves jobs strictly in arrival order, regardless of burst length.
//! Non-preemptive: once a job holds the CPU, nothing is decided until it
//! finishes.

use super::{idle_server, AlgorithmFamily, AlgorithmStrategy, ResolverView};
use crate::models::Action;

/// Earliest arrival first, ties by smallest id
///
/// # Example
///
/// ```
/// use algorithm_judge_core_rs::algorithms::{AlgorithmStrategy, Fcfs, ResolverView};
/// use algorithm_judge_core_rs::models::{EntityRegistry, ResourceRegistry};
/// use algorithm_judge_core_rs::{Entity, EntityId, Resource, ResourceId};
///
/// let mut entities = EntityRegistry::new();
/// for (id, arrival, burst) in [(1, 0, 4), (2, 1, 2)] {
///     let mut job = Entity::new(EntityId(id), format!("P{}", id), arrival, burst);
///     job.admit().unwrap();
///     entities.insert(job).unwrap();
/// }
/// let resources = ResourceRegistry::new(vec![Resource::server(ResourceId(0), "CPU")]).unwrap();
///
/// let choice = Fcfs.resolve(&ResolverView::new(&entities, &resources, 1)).unwrap();
/// assert_eq!(choice.entity_id, EntityId(1));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Fcfs;

impl AlgorithmStrategy for Fcfs {
    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::Scheduling
    }

    fn criterion(&self) -> &'static str {
        "earliest arrival"
    }

    fn resolve(&self, view: &ResolverView<'_>) -> Option<Action> {
        let server = idle_server(view)?;
        view.head_of_line()
            .map(|entity| Action::new(entity.id(), server))
    }
}
