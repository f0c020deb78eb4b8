//! Orchestrator - scenario lifecycle
//!
//! Configuration, the phase state machine, the scenario engine that ties the
//! judging components together, and checkpointing.
//!
//! See `engine.rs` for the tick loop.

pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod phase;

// Re-export main types for convenience
pub use config::{
    ConfigError, PartitionSpec, ScenarioConfig, ScoringRules, Topology, MAX_SCORE_DELTA, SERVER_ID,
};
pub use engine::{AdvanceOutcome, Scenario, ScenarioError, ScenarioSnapshot};
pub use phase::{next_phase, Phase, PhaseSignals};

// Re-export checkpoint types
pub use checkpoint::ScenarioCheckpoint;
