//! Algorithm Judge Core - Rust Engine
//!
//! Judges learner decisions in operating-systems algorithm lessons: CPU
//! scheduling (FCFS, SJF, SRTF) and memory allocation (First-Fit,
//! Best-Fit). The engine owns the simulated world, tells whether each
//! learner action is the one the algorithm prescribes, scores it and
//! summarizes the run.
//!
//! # Architecture
//!
//! - **core**: Simulated clock
//! - **models**: Domain types (Entity, Resource, registries, score, events)
//! - **arrivals**: Fixed and randomized entity rosters
//! - **algorithms**: Canonical resolvers, one per algorithm
//! - **judge**: Action validation, preemption monitoring, fragmentation
//! - **orchestrator**: Config, phase machine, scenario engine, checkpoints
//! - **results**: Run summary and the persistence boundary
//! - **presets**: Built-in lessons
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. `remaining <= burst` and `remaining == 0` exactly when completed
//! 2. Partition capacity accounting never drifts from its occupants
//! 3. All randomness is deterministic (seeded RNG)
//! 4. The engine performs no I/O and never blocks

// Module declarations
pub mod algorithms;
pub mod arrivals;
pub mod core;
pub mod judge;
pub mod models;
pub mod orchestrator;
pub mod presets;
pub mod results;
pub mod rng;

// Re-exports for convenience
pub use algorithms::{Algorithm, AlgorithmFamily, AlgorithmStrategy};
pub use core::time::Clock;
pub use judge::{FragmentationMetrics, MonitorState};
pub use models::{
    action::{Action, MalformedAction, Verdict, VerdictReason},
    entity::{Entity, EntityError, EntityId, EntityStatus},
    event::{Event, EventLog},
    resource::{Resource, ResourceError, ResourceId, ResourceKind},
    score::ScoreState,
    state::ScenarioState,
};
pub use orchestrator::{
    AdvanceOutcome, ConfigError, Phase, Scenario, ScenarioConfig, ScenarioError, ScenarioSnapshot,
    ScoringRules, Topology,
};
pub use results::{PersistencePayload, PersistenceService, ResultsSummary};
pub use rng::RngManager;
