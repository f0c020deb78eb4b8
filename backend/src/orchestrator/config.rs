//! Scenario configuration
//!
//! Everything needed to start a run: which algorithm judges it, where its
//! entities come from, what the resources look like and how actions are
//! scored. Configs are plain serde types so lessons can be authored as JSON.
//!
//! Validation happens once, in [`ScenarioConfig::validate`], before any
//! state is built. An invalid config never produces a scenario.

use crate::algorithms::{Algorithm, AlgorithmFamily};
use crate::arrivals::{GenerationMode, HighDemandLimit};
use crate::models::registry::ResourceRegistry;
use crate::models::{Resource, ResourceId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Id of the CPU in single-server lessons
pub const SERVER_ID: ResourceId = ResourceId(0);

// ============================================================================
// Configuration Types
// ============================================================================

/// Complete scenario configuration
///
/// # Example
///
/// ```
/// use algorithm_judge_core_rs::algorithms::Algorithm;
/// use algorithm_judge_core_rs::arrivals::{EntitySpec, GenerationMode};
/// use algorithm_judge_core_rs::orchestrator::{ScenarioConfig, Topology};
///
/// let config = ScenarioConfig::new(
///     "fcfs-intro",
///     Algorithm::Fcfs,
///     GenerationMode::Fixed {
///         entities: vec![EntitySpec::new(1, 0, 4), EntitySpec::new(2, 1, 2)],
///     },
///     Topology::SingleServer,
/// );
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Lesson identifier reported to persistence
    pub scenario_id: String,

    pub algorithm: Algorithm,

    pub generation: GenerationMode,

    pub topology: Topology,

    #[serde(default)]
    pub scoring: ScoringRules,

    /// Optional cap on large entities per run
    #[serde(default)]
    pub high_demand: Option<HighDemandLimit>,

    /// Time units per tick
    #[serde(default = "default_tick_size")]
    pub tick_size: u64,

    /// Stay in Arrival until at least one entity can be acted on
    #[serde(default = "default_true")]
    pub require_eligible_to_start: bool,
}

fn default_tick_size() -> u64 {
    1
}

fn default_true() -> bool {
    true
}

impl ScenarioConfig {
    /// Config with default scoring, tick size 1 and no high-demand cap
    pub fn new(
        scenario_id: impl Into<String>,
        algorithm: Algorithm,
        generation: GenerationMode,
        topology: Topology,
    ) -> Self {
        Self {
            scenario_id: scenario_id.into(),
            algorithm,
            generation,
            topology,
            scoring: ScoringRules::default(),
            high_demand: None,
            tick_size: default_tick_size(),
            require_eligible_to_start: true,
        }
    }

    pub fn with_scoring(mut self, scoring: ScoringRules) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_high_demand(mut self, limit: HighDemandLimit) -> Self {
        self.high_demand = Some(limit);
        self
    }

    pub fn with_tick_size(mut self, tick_size: u64) -> Self {
        self.tick_size = tick_size;
        self
    }

    /// Check everything that can be checked without sampling
    ///
    /// Entity-level constraints (duplicate ids, zero sizes, the
    /// high-demand cap) are checked when the generator is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_size == 0 {
            return Err(ConfigError::ZeroTickSize);
        }
        if self.scenario_id.trim().is_empty() {
            return Err(ConfigError::MissingScenarioId);
        }
        self.scoring.validate()?;
        self.topology.validate(self.algorithm.family())
    }
}

/// Resource layout of a lesson
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// One CPU (scheduling lessons)
    SingleServer,
    /// Partitions in enumeration order (allocation lessons)
    Partitions(Vec<PartitionSpec>),
}

/// One configured partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionSpec {
    pub id: u32,
    #[serde(default)]
    pub label: Option<String>,
    pub capacity: u64,
}

impl PartitionSpec {
    pub fn new(id: u32, capacity: u64) -> Self {
        Self {
            id,
            label: None,
            capacity,
        }
    }
}

impl Topology {
    /// Partitions with ids 1.. in the given order
    pub fn partitions(capacities: &[u64]) -> Self {
        Topology::Partitions(
            capacities
                .iter()
                .enumerate()
                .map(|(i, cap)| PartitionSpec::new(i as u32 + 1, *cap))
                .collect(),
        )
    }

    fn validate(&self, family: AlgorithmFamily) -> Result<(), ConfigError> {
        match (self, family) {
            (Topology::SingleServer, AlgorithmFamily::Scheduling) => Ok(()),
            (Topology::Partitions(parts), AlgorithmFamily::Allocation) => {
                if parts.is_empty() {
                    return Err(ConfigError::NoResources);
                }
                let mut ids = HashSet::new();
                for part in parts {
                    if !ids.insert(part.id) {
                        return Err(ConfigError::DuplicateResource(part.id));
                    }
                    if part.capacity == 0 {
                        return Err(ConfigError::ZeroCapacity(part.id));
                    }
                }
                Ok(())
            }
            (_, family) => Err(ConfigError::TopologyMismatch { family }),
        }
    }

    /// Build the resource registry (config must be valid)
    pub fn build(&self) -> Result<ResourceRegistry, ConfigError> {
        let resources = match self {
            Topology::SingleServer => vec![Resource::server(SERVER_ID, "CPU")],
            Topology::Partitions(parts) => parts
                .iter()
                .map(|p| {
                    let label = p
                        .label
                        .clone()
                        .unwrap_or_else(|| format!("Block {}", p.id));
                    Resource::partition(ResourceId(p.id), label, p.capacity)
                })
                .collect(),
        };
        ResourceRegistry::new(resources).map_err(|e| ConfigError::Registry(e.to_string()))
    }
}

/// Upper bound on any single configured score delta
pub const MAX_SCORE_DELTA: i64 = 1_000_000;

/// Score deltas applied by the validator and the preemption monitor
///
/// Rewards are positive, penalties are stored as positive magnitudes and
/// subtracted when applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Correct pick-up of a job onto the CPU
    pub service_start_reward: i64,

    /// Correct placement of an allocation request
    pub placement_reward: i64,

    /// Bonus when a job finishes its burst
    pub completion_bonus: i64,

    /// Wrong job picked for the CPU
    pub wrong_pick_penalty: i64,

    /// Wrong partition (or request) chosen
    pub wrong_placement_penalty: i64,

    /// Charged on each tick a due preemption is left pending
    pub preemption_delay_penalty: i64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            service_start_reward: 20,
            placement_reward: 100,
            completion_bonus: 10,
            wrong_pick_penalty: 10,
            wrong_placement_penalty: 20,
            preemption_delay_penalty: 5,
        }
    }
}

impl ScoringRules {
    /// Every delta must be a magnitude in `0..=MAX_SCORE_DELTA`
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("service_start_reward", self.service_start_reward),
            ("placement_reward", self.placement_reward),
            ("completion_bonus", self.completion_bonus),
            ("wrong_pick_penalty", self.wrong_pick_penalty),
            ("wrong_placement_penalty", self.wrong_placement_penalty),
            ("preemption_delay_penalty", self.preemption_delay_penalty),
        ];
        for (field, value) in fields {
            if !(0..=MAX_SCORE_DELTA).contains(&value) {
                return Err(ConfigError::InvalidScoring { field, value });
            }
        }
        Ok(())
    }

    /// Reward for a correct action in this family
    pub fn reward_for(&self, family: AlgorithmFamily) -> i64 {
        match family {
            AlgorithmFamily::Scheduling => self.service_start_reward,
            AlgorithmFamily::Allocation => self.placement_reward,
        }
    }

    /// Penalty magnitude for a wrong choice in this family
    pub fn penalty_for(&self, family: AlgorithmFamily) -> i64 {
        match family {
            AlgorithmFamily::Scheduling => self.wrong_pick_penalty,
            AlgorithmFamily::Allocation => self.wrong_placement_penalty,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Invalid configuration; fatal at scenario construction
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Scenario must contain at least one entity")]
    NoEntities,

    #[error("Duplicate entity id {0}")]
    DuplicateEntity(u32),

    #[error("Entity {0} has zero size")]
    ZeroSize(u32),

    #[error("Entity count bounds inverted: min {min} > max {max}")]
    InvalidCountBounds { min: usize, max: usize },

    #[error("Randomized generation needs at least one weighted size bucket")]
    EmptySizeBuckets,

    #[error("Invalid size bucket [{min}, {max}]")]
    InvalidBucket { min: u64, max: u64 },

    #[error("{count} high-demand entities exceed the limit of {max}")]
    TooManyHighDemand { count: usize, max: usize },

    #[error("Size buckets cannot honour the high-demand limit")]
    HighDemandUnsatisfiable,

    #[error("Topology must contain at least one partition")]
    NoResources,

    #[error("Duplicate resource id {0}")]
    DuplicateResource(u32),

    #[error("Partition {0} has zero capacity")]
    ZeroCapacity(u32),

    #[error("Topology does not suit a {family:?} algorithm")]
    TopologyMismatch { family: AlgorithmFamily },

    #[error("Tick size must be positive")]
    ZeroTickSize,

    #[error("Scenario id must not be empty")]
    MissingScenarioId,

    #[error("Scoring value {field} = {value} is outside 0..={max}", max = MAX_SCORE_DELTA)]
    InvalidScoring { field: &'static str, value: i64 },

    #[error("Arrival times overflow: gap {gap} across {count} entities")]
    ArrivalTimeOverflow { gap: u64, count: usize },

    #[error("Registry error: {0}")]
    Registry(String),
}
