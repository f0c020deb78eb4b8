//! First-Fit memory allocation
//!
//! Scans partitions in their declaration order (never sorted by size) and
//! places the current request into the first one with enough room left.

use super::{AlgorithmFamily, AlgorithmStrategy, ResolverView};
use crate::models::Action;

/// First partition in declaration order that fits
///
/// # Example
///
/// ```
/// use algorithm_judge_core_rs::algorithms::{AlgorithmStrategy, FirstFit, ResolverView};
/// use algorithm_judge_core_rs::models::{EntityRegistry, ResourceRegistry};
/// use algorithm_judge_core_rs::{Entity, EntityId, Resource, ResourceId};
///
/// let mut entities = EntityRegistry::new();
/// let mut file = Entity::new(EntityId(1), "File A", 0, 60);
/// file.admit().unwrap();
/// entities.insert(file).unwrap();
///
/// let resources = ResourceRegistry::new(vec![
///     Resource::partition(ResourceId(1), "50K", 50),
///     Resource::partition(ResourceId(2), "100K", 100),
///     Resource::partition(ResourceId(3), "200K", 200),
/// ])
/// .unwrap();
///
/// let choice = FirstFit.resolve(&ResolverView::new(&entities, &resources, 0)).unwrap();
/// assert_eq!(choice.resource_id, ResourceId(2));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFit;

impl AlgorithmStrategy for FirstFit {
    fn name(&self) -> &'static str {
        "First-Fit"
    }

    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::Allocation
    }

    fn criterion(&self) -> &'static str {
        "first partition that fits"
    }

    fn resolve(&self, view: &ResolverView<'_>) -> Option<Action> {
        let request = view.head_of_line()?;
        view.resources
            .iter()
            .filter(|r| !r.is_server())
            .find(|r| r.can_fit(request.size()))
            .map(|r| Action::new(request.id(), r.id()))
    }
}
