//! Fragmentation and utilization metrics for allocation lessons
//!
//! Every figure is derived from the registries on demand. Nothing is
//! patched incrementally, so the metrics cannot drift from the state they
//! describe.

use crate::models::{EntityRegistry, Resource, ResourceRegistry};
use serde::{Deserialize, Serialize};

/// Snapshot of how well the partitions are used
///
/// # Example
/// ```
/// use algorithm_judge_core_rs::judge::FragmentationMetrics;
/// use algorithm_judge_core_rs::models::{EntityRegistry, ResourceRegistry};
/// use algorithm_judge_core_rs::{Resource, ResourceId};
///
/// let resources = ResourceRegistry::new(vec![
///     Resource::partition(ResourceId(1), "Block 1", 100),
/// ])
/// .unwrap();
/// let metrics = FragmentationMetrics::calculate(&EntityRegistry::new(), &resources, 0);
/// assert_eq!(metrics.total_allocated, 0);
/// assert_eq!(metrics.efficiency, 100.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentationMetrics {
    /// Sum of every partition's capacity
    pub total_capacity: u64,

    /// Sum of the capacity of partitions holding at least one entity
    pub total_allocated: u64,

    /// Free space inside occupied partitions too small for any
    /// outstanding request
    pub internal_fragmentation: u64,

    /// `100 × (1 − internal / allocated)`, 100 when nothing is allocated
    pub efficiency: f64,

    /// `100 × allocated / capacity`
    pub utilization: f64,

    /// Requests that fit nowhere (external fragmentation)
    pub rejected: u32,
}

impl FragmentationMetrics {
    /// Recompute all metrics from the registries
    ///
    /// Only registered entities count as outstanding, which is exact once
    /// every request has arrived.
    pub fn calculate(
        entities: &EntityRegistry,
        resources: &ResourceRegistry,
        rejected: u32,
    ) -> Self {
        Self::calculate_with_unreleased(entities, resources, rejected, &[])
    }

    /// Same as [`calculate`](Self::calculate), with the sizes of requests
    /// that have not arrived yet also counting as outstanding
    pub fn calculate_with_unreleased(
        entities: &EntityRegistry,
        resources: &ResourceRegistry,
        rejected: u32,
        unreleased: &[u64],
    ) -> Self {
        let partitions = || resources.iter().filter(|r| !r.is_server());
        let occupied = || partitions().filter(|r| r.is_occupied());

        let total_capacity: u64 = partitions().map(Resource::capacity).sum();
        let total_allocated: u64 = occupied().map(Resource::capacity).sum();

        // With nothing left to place, every leftover hole is wasted
        let smallest_outstanding = entities
            .smallest_outstanding_size()
            .into_iter()
            .chain(unreleased.iter().copied())
            .min();
        let internal_fragmentation: u64 = occupied()
            .map(Resource::remaining_capacity)
            .filter(|free| smallest_outstanding.map_or(true, |size| *free < size))
            .sum();

        let efficiency = if total_allocated == 0 {
            100.0
        } else {
            100.0 * (1.0 - internal_fragmentation as f64 / total_allocated as f64)
        };
        let utilization = if total_capacity == 0 {
            0.0
        } else {
            100.0 * total_allocated as f64 / total_capacity as f64
        };

        Self {
            total_capacity,
            total_allocated,
            internal_fragmentation,
            efficiency,
            utilization,
            rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::test_support::partitions;
    use crate::models::{Entity, EntityId, ResourceId};

    fn place(
        entities: &mut EntityRegistry,
        resources: &mut ResourceRegistry,
        id: u32,
        size: u64,
        resource: u32,
    ) {
        let mut entity = Entity::new(EntityId(id), format!("F{}", id), 0, size);
        entity.admit().unwrap();
        entity.place(ResourceId(resource), 0).unwrap();
        resources
            .get_mut(ResourceId(resource))
            .unwrap()
            .admit(EntityId(id), size)
            .unwrap();
        entities.insert(entity).unwrap();
    }

    #[test]
    fn test_allocated_counts_whole_occupied_partitions() {
        let mut entities = EntityRegistry::new();
        let mut resources = partitions(&[50, 100, 200]);
        place(&mut entities, &mut resources, 1, 40, 1);

        let metrics = FragmentationMetrics::calculate(&entities, &resources, 0);
        assert_eq!(metrics.total_capacity, 350);
        assert_eq!(metrics.total_allocated, 50);
        assert!((metrics.utilization - 100.0 * 50.0 / 350.0).abs() < 1e-9);
    }

    #[test]
    fn test_hole_counts_only_when_too_small_for_outstanding() {
        let mut entities = EntityRegistry::new();
        let mut resources = partitions(&[50, 100]);
        place(&mut entities, &mut resources, 1, 40, 1);

        // An outstanding request of 8 could still use the 10-unit hole
        let mut pending = Entity::new(EntityId(2), "F2", 0, 8);
        pending.admit().unwrap();
        entities.insert(pending).unwrap();
        let metrics = FragmentationMetrics::calculate(&entities, &resources, 0);
        assert_eq!(metrics.internal_fragmentation, 0);
        assert_eq!(metrics.efficiency, 100.0);

        // Once it is bigger than the hole, the hole is wasted
        let mut entities = EntityRegistry::new();
        let mut resources = partitions(&[50, 100]);
        place(&mut entities, &mut resources, 1, 40, 1);
        let mut pending = Entity::new(EntityId(2), "F2", 0, 30);
        pending.admit().unwrap();
        entities.insert(pending).unwrap();
        let metrics = FragmentationMetrics::calculate(&entities, &resources, 0);
        assert_eq!(metrics.internal_fragmentation, 10);
        assert!((metrics.efficiency - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_unreleased_requests_keep_holes_useful() {
        let mut entities = EntityRegistry::new();
        let mut resources = partitions(&[50, 100]);
        place(&mut entities, &mut resources, 1, 40, 1);

        // A 5-unit request still to come could use the 10-unit hole
        let metrics =
            FragmentationMetrics::calculate_with_unreleased(&entities, &resources, 0, &[60, 5]);
        assert_eq!(metrics.internal_fragmentation, 0);

        let metrics =
            FragmentationMetrics::calculate_with_unreleased(&entities, &resources, 0, &[60]);
        assert_eq!(metrics.internal_fragmentation, 10);
    }

    #[test]
    fn test_everything_placed_counts_all_holes() {
        let mut entities = EntityRegistry::new();
        let mut resources = partitions(&[50, 100, 200]);
        place(&mut entities, &mut resources, 1, 40, 1);
        place(&mut entities, &mut resources, 2, 60, 2);

        let metrics = FragmentationMetrics::calculate(&entities, &resources, 1);
        assert_eq!(metrics.total_allocated, 150);
        assert_eq!(metrics.internal_fragmentation, 50);
        assert_eq!(metrics.rejected, 1);
        assert!(metrics.internal_fragmentation <= metrics.total_allocated);
    }
}
