//! Entity arrival generation
//!
//! Populates the entity registry over simulated time. Two generators sit
//! behind one [`ArrivalGenerator`] trait:
//!
//! - [`FixedArrivals`]: hand-authored arrival times and sizes, for the
//!   deterministic teaching lessons and for tests
//! - [`RandomizedArrivals`]: count, sizes and arrival offsets sampled within
//!   configured bounds from a seed
//!
//! # Key Principles
//!
//! 1. **Determinism**: same seed + same config → same roster
//! 2. **Up-front sampling**: the randomized roster is drawn once, at
//!    construction, and released as the clock reaches each arrival
//! 3. **Hard constraints**: a high-demand cap is checked when the roster is
//!    built; a roster that breaks it is never handed out
//!
//! # Example
//!
//! ```
//! use algorithm_judge_core_rs::arrivals::{ArrivalGenerator, RandomizedArrivals, RandomizedConfig, SizeBucket};
//!
//! let config = RandomizedConfig {
//!     count_min: 3,
//!     count_max: 5,
//!     size_buckets: vec![SizeBucket { min: 1, max: 8, weight: 1 }],
//!     max_arrival_gap: 2,
//!     seed: 42,
//!     label_prefix: "P".to_string(),
//! };
//!
//! let mut generator = RandomizedArrivals::generate(&config, None).unwrap();
//! let first = generator.next_arrival(0).unwrap();
//! assert_eq!(first.arrival_time(), 0);
//! ```

use crate::models::{Entity, EntityId};
use crate::orchestrator::config::ConfigError;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt::Debug;
use tracing::debug;

// ============================================================================
// Configuration
// ============================================================================

/// One hand-authored entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    pub id: u32,
    /// Display label; defaults to `P<id>`
    #[serde(default)]
    pub label: Option<String>,
    pub arrival_time: u64,
    /// Burst length (scheduling) or request size (allocation)
    pub size: u64,
}

impl EntitySpec {
    pub fn new(id: u32, arrival_time: u64, size: u64) -> Self {
        Self {
            id,
            label: None,
            arrival_time,
            size,
        }
    }

    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn build(&self) -> Entity {
        let label = self
            .label
            .clone()
            .unwrap_or_else(|| format!("P{}", self.id));
        Entity::new(EntityId(self.id), label, self.arrival_time, self.size)
    }
}

/// Inclusive size range with a selection weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeBucket {
    pub min: u64,
    pub max: u64,
    pub weight: u32,
}

/// Bounds for a randomized roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomizedConfig {
    /// Fewest entities to generate (inclusive)
    pub count_min: usize,
    /// Most entities to generate (inclusive)
    pub count_max: usize,
    /// Size distribution, one bucket picked per entity by weight
    pub size_buckets: Vec<SizeBucket>,
    /// Largest gap between consecutive arrivals; the first arrives at 0
    pub max_arrival_gap: u64,
    pub seed: u64,
    #[serde(default = "default_label_prefix")]
    pub label_prefix: String,
}

fn default_label_prefix() -> String {
    "P".to_string()
}

/// "At most `max_count` entities of size ≥ `threshold` per scenario"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighDemandLimit {
    pub threshold: u64,
    pub max_count: usize,
}

impl HighDemandLimit {
    pub fn is_high_demand(&self, size: u64) -> bool {
        size >= self.threshold
    }
}

/// How a scenario's entities are produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    Fixed { entities: Vec<EntitySpec> },
    Randomized(RandomizedConfig),
}

impl GenerationMode {
    /// Build the generator, validating every constraint
    pub fn build(
        &self,
        high_demand: Option<HighDemandLimit>,
    ) -> Result<Box<dyn ArrivalGenerator>, ConfigError> {
        match self {
            GenerationMode::Fixed { entities } => {
                Ok(Box::new(FixedArrivals::from_specs(entities, high_demand)?))
            }
            GenerationMode::Randomized(config) => {
                Ok(Box::new(RandomizedArrivals::generate(config, high_demand)?))
            }
        }
    }
}

// ============================================================================
// Generator interface
// ============================================================================

/// Source of entities over simulated time
pub trait ArrivalGenerator: Send + Debug {
    /// Next entity whose arrival time has been reached at `now`
    ///
    /// Call repeatedly until it returns `None` to drain everything due.
    fn next_arrival(&mut self, now: u64) -> Option<Entity>;

    /// Arrival time of the next unreleased entity
    fn next_arrival_time(&self) -> Option<u64>;

    /// Entities not yet released, in release order
    fn unreleased(&self) -> Vec<Entity>;

    /// Nothing left to release
    fn is_exhausted(&self) -> bool {
        self.next_arrival_time().is_none()
    }

    /// Whether something is due at `now` but not yet released
    fn has_due(&self, now: u64) -> bool {
        self.next_arrival_time().is_some_and(|t| t <= now)
    }
}

// ============================================================================
// Fixed roster
// ============================================================================

/// Hand-authored roster released in arrival order (ties by id)
#[derive(Debug, Clone)]
pub struct FixedArrivals {
    queue: VecDeque<Entity>,
}

impl FixedArrivals {
    /// Validate and order a hand-authored entity list
    pub fn from_specs(
        specs: &[EntitySpec],
        high_demand: Option<HighDemandLimit>,
    ) -> Result<Self, ConfigError> {
        if specs.is_empty() {
            return Err(ConfigError::NoEntities);
        }

        let mut seen = HashSet::new();
        for spec in specs {
            if !seen.insert(spec.id) {
                return Err(ConfigError::DuplicateEntity(spec.id));
            }
            if spec.size == 0 {
                return Err(ConfigError::ZeroSize(spec.id));
            }
        }

        let entities = specs.iter().map(EntitySpec::build).collect();
        Self::from_entities(entities, high_demand)
    }

    /// Wrap already-built pending entities (used by checkpoint restore)
    pub fn from_entities(
        mut entities: Vec<Entity>,
        high_demand: Option<HighDemandLimit>,
    ) -> Result<Self, ConfigError> {
        if let Some(limit) = high_demand {
            check_high_demand(entities.iter().map(Entity::size), limit)?;
        }
        entities.sort_by_key(|e| (e.arrival_time(), e.id()));
        Ok(Self {
            queue: entities.into(),
        })
    }

    /// Roster size still to be released
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl ArrivalGenerator for FixedArrivals {
    fn next_arrival(&mut self, now: u64) -> Option<Entity> {
        if self.queue.front()?.arrival_time() <= now {
            self.queue.pop_front()
        } else {
            None
        }
    }

    fn next_arrival_time(&self) -> Option<u64> {
        self.queue.front().map(Entity::arrival_time)
    }

    fn unreleased(&self) -> Vec<Entity> {
        self.queue.iter().cloned().collect()
    }
}

// ============================================================================
// Randomized roster
// ============================================================================

/// Roster sampled from a seed within configured bounds
#[derive(Debug, Clone)]
pub struct RandomizedArrivals {
    roster: FixedArrivals,
}

impl RandomizedArrivals {
    /// Sample a roster, enforcing the high-demand cap
    pub fn generate(
        config: &RandomizedConfig,
        high_demand: Option<HighDemandLimit>,
    ) -> Result<Self, ConfigError> {
        validate_randomized(config, high_demand)?;

        let mut rng = RngManager::new(config.seed);
        let count = rng.range_inclusive(config.count_min as u64, config.count_max as u64) as usize;
        let weights: Vec<u32> = config.size_buckets.iter().map(|b| b.weight).collect();

        let mut entities = Vec::with_capacity(count);
        let mut arrival: u64 = 0;
        let mut high_demand_count = 0;

        for n in 0..count {
            if n > 0 {
                arrival = arrival
                    .checked_add(rng.range_inclusive(0, config.max_arrival_gap))
                    .ok_or(ConfigError::ArrivalTimeOverflow {
                        gap: config.max_arrival_gap,
                        count,
                    })?;
            }

            let at_cap = high_demand.is_some_and(|limit| high_demand_count >= limit.max_count);
            let size = if at_cap {
                // validate_randomized guarantees a bucket reaching below the threshold
                let threshold = high_demand.map_or(u64::MAX, |l| l.threshold);
                sample_below(&config.size_buckets, threshold, &mut rng)
                    .ok_or(ConfigError::HighDemandUnsatisfiable)?
            } else {
                let bucket = rng
                    .weighted_index(&weights)
                    .ok_or(ConfigError::EmptySizeBuckets)?;
                let chosen = &config.size_buckets[bucket];
                rng.range_inclusive(chosen.min, chosen.max)
            };

            if high_demand.is_some_and(|limit| limit.is_high_demand(size)) {
                high_demand_count += 1;
            }

            let id = n as u32 + 1;
            entities.push(Entity::new(
                EntityId(id),
                format!("{}{}", config.label_prefix, id),
                arrival,
                size,
            ));
        }

        debug!(
            seed = config.seed,
            count,
            high_demand = high_demand_count,
            "sampled randomized roster"
        );

        Ok(Self {
            roster: FixedArrivals::from_entities(entities, high_demand)?,
        })
    }
}

impl ArrivalGenerator for RandomizedArrivals {
    fn next_arrival(&mut self, now: u64) -> Option<Entity> {
        self.roster.next_arrival(now)
    }

    fn next_arrival_time(&self) -> Option<u64> {
        self.roster.next_arrival_time()
    }

    fn unreleased(&self) -> Vec<Entity> {
        self.roster.unreleased()
    }
}

// ============================================================================
// Validation helpers
// ============================================================================

fn check_high_demand(
    sizes: impl Iterator<Item = u64>,
    limit: HighDemandLimit,
) -> Result<(), ConfigError> {
    let count = sizes.filter(|s| limit.is_high_demand(*s)).count();
    if count > limit.max_count {
        return Err(ConfigError::TooManyHighDemand {
            count,
            max: limit.max_count,
        });
    }
    Ok(())
}

fn validate_randomized(
    config: &RandomizedConfig,
    high_demand: Option<HighDemandLimit>,
) -> Result<(), ConfigError> {
    if config.count_min == 0 {
        return Err(ConfigError::NoEntities);
    }
    if config.count_min > config.count_max {
        return Err(ConfigError::InvalidCountBounds {
            min: config.count_min,
            max: config.count_max,
        });
    }
    if config.size_buckets.is_empty() || config.size_buckets.iter().all(|b| b.weight == 0) {
        return Err(ConfigError::EmptySizeBuckets);
    }
    for bucket in &config.size_buckets {
        if bucket.min == 0 || bucket.min > bucket.max {
            return Err(ConfigError::InvalidBucket {
                min: bucket.min,
                max: bucket.max,
            });
        }
    }
    // Worst case: every gap drawn at its maximum
    if config
        .max_arrival_gap
        .checked_mul(config.count_max as u64 - 1)
        .is_none()
    {
        return Err(ConfigError::ArrivalTimeOverflow {
            gap: config.max_arrival_gap,
            count: config.count_max,
        });
    }

    if let Some(limit) = high_demand {
        let can_stay_below = config
            .size_buckets
            .iter()
            .any(|b| b.weight > 0 && b.min < limit.threshold);
        if !can_stay_below && config.count_max > limit.max_count {
            return Err(ConfigError::HighDemandUnsatisfiable);
        }
    }
    Ok(())
}

/// Sample a size strictly below `threshold` from the buckets that allow it
fn sample_below(buckets: &[SizeBucket], threshold: u64, rng: &mut RngManager) -> Option<u64> {
    let weights: Vec<u32> = buckets
        .iter()
        .map(|b| if b.min < threshold { b.weight } else { 0 })
        .collect();
    let bucket = &buckets[rng.weighted_index(&weights)?];
    let upper = bucket.max.min(threshold - 1);
    Some(rng.range_inclusive(bucket.min, upper))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> RandomizedConfig {
        RandomizedConfig {
            count_min: 4,
            count_max: 8,
            size_buckets: vec![
                SizeBucket {
                    min: 10,
                    max: 40,
                    weight: 3,
                },
                SizeBucket {
                    min: 150,
                    max: 250,
                    weight: 2,
                },
            ],
            max_arrival_gap: 3,
            seed,
            label_prefix: "File ".to_string(),
        }
    }

    #[test]
    fn test_fixed_releases_in_arrival_order() {
        let specs = vec![
            EntitySpec::new(3, 2, 1),
            EntitySpec::new(1, 0, 4),
            EntitySpec::new(2, 1, 2),
        ];
        let mut generator = FixedArrivals::from_specs(&specs, None).unwrap();

        assert_eq!(generator.next_arrival(0).map(|e| e.id()), Some(EntityId(1)));
        assert!(generator.next_arrival(0).is_none());
        assert_eq!(generator.next_arrival_time(), Some(1));
        assert_eq!(generator.next_arrival(5).map(|e| e.id()), Some(EntityId(2)));
        assert_eq!(generator.next_arrival(5).map(|e| e.id()), Some(EntityId(3)));
        assert!(generator.is_exhausted());
    }

    #[test]
    fn test_fixed_default_labels() {
        let mut generator = FixedArrivals::from_specs(&[EntitySpec::new(7, 0, 1)], None).unwrap();
        assert_eq!(generator.next_arrival(0).unwrap().label(), "P7");
    }

    #[test]
    fn test_randomized_is_deterministic() {
        let a = RandomizedArrivals::generate(&config(42), None).unwrap();
        let b = RandomizedArrivals::generate(&config(42), None).unwrap();
        assert_eq!(a.unreleased(), b.unreleased());
    }

    #[test]
    fn test_randomized_respects_bounds() {
        for seed in 1..50 {
            let generator = RandomizedArrivals::generate(&config(seed), None).unwrap();
            let roster = generator.unreleased();
            assert!((4..=8).contains(&roster.len()));
            let mut previous = 0;
            for (n, entity) in roster.iter().enumerate() {
                let size = entity.size();
                assert!((10..=40).contains(&size) || (150..=250).contains(&size));
                if n == 0 {
                    assert_eq!(entity.arrival_time(), 0);
                }
                assert!(entity.arrival_time() - previous <= 3);
                previous = entity.arrival_time();
            }
        }
    }

    #[test]
    fn test_randomized_never_exceeds_high_demand_cap() {
        let limit = HighDemandLimit {
            threshold: 150,
            max_count: 1,
        };
        for seed in 1..100 {
            let generator = RandomizedArrivals::generate(&config(seed), Some(limit)).unwrap();
            let big = generator
                .unreleased()
                .iter()
                .filter(|e| e.size() >= 150)
                .count();
            assert!(big <= 1, "seed {} produced {} high-demand entities", seed, big);
        }
    }

    #[test]
    fn test_unsatisfiable_cap_is_config_error() {
        let mut cfg = config(1);
        cfg.size_buckets.remove(0);
        let limit = HighDemandLimit {
            threshold: 150,
            max_count: 2,
        };
        assert_eq!(
            RandomizedArrivals::generate(&cfg, Some(limit)).unwrap_err(),
            ConfigError::HighDemandUnsatisfiable
        );
    }
}
