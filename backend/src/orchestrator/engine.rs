//! Scenario engine
//!
//! [`Scenario`] owns every piece of run state and is the only way in from
//! the outside. The presentation layer drives it with two kinds of calls,
//! serialized on one logical thread:
//!
//! - [`Scenario::advance`]: simulated time moves forward by some delta
//! - [`Scenario::submit`]: the learner acts
//!
//! Everything else is a read-only query or a lifecycle step (briefing
//! acknowledgement, finalization, restart, checkpointing).
//!
//! # Tick order
//!
//! Each tick of `advance` runs, in order:
//! 1. Preemption delay charge (preemptive algorithms, while a switch is due)
//! 2. Service of the running job; completion frees the server
//! 3. Clock advance
//! 4. Arrivals due at the new time are registered and admitted
//! 5. Preemption re-evaluation (preemptive algorithms)
//! 6. Automatic rejection of unplaceable requests (allocation lessons)
//! 7. Phase transitions
//!
//! # Determinism
//!
//! Randomness is confined to roster sampling, which is seeded. The same
//! config and the same sequence of calls give the same state, however the
//! calls are paced in wall-clock time.

use crate::algorithms::{AlgorithmFamily, AlgorithmStrategy, ResolverView};
use crate::arrivals::{ArrivalGenerator, FixedArrivals};
use crate::core::time::Clock;
use crate::judge::{
    service, ActionValidator, FragmentationMetrics, JudgeError, MonitorState, PreemptionMonitor,
};
use crate::models::{
    Action, Entity, EntityId, EntityRegistry, Event, EventLog, RegistryError, ResourceRegistry,
    ScenarioState, ScoreState, Verdict,
};
use crate::orchestrator::checkpoint::{compute_config_hash, validate_checkpoint, ScenarioCheckpoint};
use crate::orchestrator::config::{ConfigError, ScenarioConfig};
use crate::orchestrator::phase::{next_phase, Phase, PhaseSignals};
use crate::results::ResultsSummary;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

// ============================================================================
// Public result types
// ============================================================================

/// What happened during one `advance` call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvanceOutcome {
    /// Entities that arrived, as admitted
    pub arrivals: Vec<Entity>,

    /// A preemption was due at the end of some tick
    pub preemption_due: bool,

    /// Jobs that finished service
    pub completed: Vec<EntityId>,

    /// Allocation requests rejected for lack of a fitting partition
    pub rejected: Vec<EntityId>,

    /// Delay penalty charged across the call
    pub delay_penalty: i64,

    /// Ticks actually processed
    pub ticks: u64,
}

/// Read-only view for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSnapshot {
    pub phase: Phase,
    pub clock: Clock,
    pub entities: EntityRegistry,
    pub resources: ResourceRegistry,
    pub score: ScoreState,
    pub monitor: MonitorState,
    /// Present for allocation lessons only
    pub fragmentation: Option<FragmentationMetrics>,
}

/// Public API failures
#[derive(Debug, Error, PartialEq)]
pub enum ScenarioError {
    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Cannot {operation} during the {phase} phase")]
    InvalidPhase {
        operation: &'static str,
        phase: Phase,
    },

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("State error: {0}")]
    State(#[from] JudgeError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

// ============================================================================
// Scenario
// ============================================================================

/// One running lesson
///
/// # Example
///
/// ```rust
/// use algorithm_judge_core_rs::algorithms::Algorithm;
/// use algorithm_judge_core_rs::arrivals::{EntitySpec, GenerationMode};
/// use algorithm_judge_core_rs::orchestrator::{Phase, Scenario, ScenarioConfig, Topology, SERVER_ID};
/// use algorithm_judge_core_rs::{Action, EntityId};
///
/// let config = ScenarioConfig::new(
///     "fcfs-demo",
///     Algorithm::Fcfs,
///     GenerationMode::Fixed {
///         entities: vec![EntitySpec::new(1, 0, 2)],
///     },
///     Topology::SingleServer,
/// );
///
/// let mut scenario = Scenario::initialize(config).unwrap();
/// scenario.acknowledge_briefing().unwrap();
/// assert_eq!(scenario.phase(), Phase::Active);
///
/// let verdict = scenario.submit(Action::new(EntityId(1), SERVER_ID)).unwrap();
/// assert!(verdict.accepted);
///
/// scenario.advance(2).unwrap();
/// assert_eq!(scenario.phase(), Phase::Results);
/// assert_eq!(scenario.finalize().unwrap().accuracy, 100.0);
/// ```
pub struct Scenario {
    config: ScenarioConfig,

    /// Unique per run (fresh on restart)
    run_id: String,

    state: ScenarioState,

    strategy: Box<dyn AlgorithmStrategy>,

    arrivals: Box<dyn ArrivalGenerator>,

    event_log: EventLog,

    briefing_acknowledged: bool,
}

impl Scenario {
    /// Validate `config` and build a scenario in the Intro phase
    ///
    /// # Errors
    ///
    /// Any configuration problem aborts construction with
    /// [`ScenarioError::InvalidConfig`]; no partial scenario is returned.
    pub fn initialize(config: ScenarioConfig) -> Result<Self, ScenarioError> {
        config.validate()?;
        let resources = config.topology.build()?;
        let arrivals = config.generation.build(config.high_demand)?;
        let strategy = config.algorithm.strategy();
        let state = ScenarioState::new(Clock::new(config.tick_size), resources);
        let run_id = Uuid::new_v4().to_string();

        info!(
            scenario = %config.scenario_id,
            run_id = %run_id,
            algorithm = strategy.name(),
            "scenario initialized"
        );

        Ok(Self {
            config,
            run_id,
            state,
            strategy,
            arrivals,
            event_log: EventLog::new(),
            briefing_acknowledged: false,
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn now(&self) -> u64 {
        self.state.now()
    }

    pub fn state(&self) -> &ScenarioState {
        &self.state
    }

    pub fn strategy(&self) -> &dyn AlgorithmStrategy {
        self.strategy.as_ref()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Owned copy of everything a renderer needs
    pub fn snapshot(&self) -> ScenarioSnapshot {
        ScenarioSnapshot {
            phase: self.state.phase(),
            clock: self.state.clock().clone(),
            entities: self.state.entities().clone(),
            resources: self.state.resources().clone(),
            score: self.state.score().clone(),
            monitor: self.state.monitor(),
            fragmentation: self.fragmentation(),
        }
    }

    /// Current partition usage, allocation lessons only
    ///
    /// Requests the generator has not released yet still count as
    /// outstanding, so a hole is only wasted once nothing left could use it.
    pub fn fragmentation(&self) -> Option<FragmentationMetrics> {
        if self.strategy.family() != AlgorithmFamily::Allocation {
            return None;
        }
        let unreleased: Vec<u64> = self.arrivals.unreleased().iter().map(Entity::size).collect();
        Some(FragmentationMetrics::calculate_with_unreleased(
            self.state.entities(),
            self.state.resources(),
            self.state.rejections(),
            &unreleased,
        ))
    }

    /// The action the algorithm prescribes right now, if any
    ///
    /// `None` outside the Active phase and when the job already on the CPU
    /// is the right one.
    pub fn hint(&self) -> Option<Action> {
        if !self.state.phase().accepts_actions() {
            return None;
        }
        let canonical = self.strategy.resolve(&ResolverView::of(&self.state))?;
        let running = self.state.entities().in_service().map(|e| e.id());
        if running == Some(canonical.entity_id) {
            return None;
        }
        Some(canonical)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Dismiss the briefing: Intro → Arrival, then admit what is due now
    pub fn acknowledge_briefing(&mut self) -> Result<(), ScenarioError> {
        self.require_phase("acknowledge the briefing", |p| p == Phase::Intro)?;
        self.briefing_acknowledged = true;
        self.settle()?;
        self.admit_arrivals()?;
        self.settle()?;
        Ok(())
    }

    /// Move simulated time forward by `delta`
    ///
    /// `delta` is processed in whole ticks, rounding up. Stops early once
    /// the Results phase is reached.
    pub fn advance(&mut self, delta: u64) -> Result<AdvanceOutcome, ScenarioError> {
        self.require_phase("advance", |p| p.accepts_ticks())?;

        let ticks = self.state.clock().ticks_for(delta);
        let mut outcome = AdvanceOutcome::default();
        for _ in 0..ticks {
            if !self.state.phase().accepts_ticks() {
                break;
            }
            self.tick(&mut outcome)?;
            outcome.ticks += 1;
        }
        Ok(outcome)
    }

    /// Judge one learner action
    ///
    /// Wrong and malformed actions come back as verdicts; only calling
    /// outside the Active phase is an error.
    pub fn submit(&mut self, action: Action) -> Result<Verdict, ScenarioError> {
        self.require_phase("submit an action", |p| p.accepts_actions())?;

        let validator = ActionValidator::new(self.strategy.as_ref(), &self.config.scoring);
        let verdict = validator.submit(&mut self.state, action, &mut self.event_log)?;
        self.settle()?;
        Ok(verdict)
    }

    /// Summary of the finished run
    pub fn finalize(&self) -> Result<ResultsSummary, ScenarioError> {
        self.require_phase("finalize", |p| p == Phase::Results)?;
        Ok(ResultsSummary::from_state(
            self.run_id.clone(),
            self.config.scenario_id.clone(),
            self.config.algorithm,
            &self.state,
        ))
    }

    /// Discard everything and start over from the stored config
    pub fn restart(&mut self) -> Result<(), ScenarioError> {
        let previous = self.run_id.clone();
        let mut fresh = Self::initialize(self.config.clone())?;
        fresh.event_log.log(Event::Restarted {
            time: 0,
            run_id: fresh.run_id.clone(),
        });
        info!(previous = %previous, run_id = %fresh.run_id, "scenario restarted");
        *self = fresh;
        Ok(())
    }

    // ========================================================================
    // Checkpointing
    // ========================================================================

    /// Serialize the run to JSON
    pub fn save_checkpoint(&self) -> Result<String, ScenarioError> {
        let checkpoint = ScenarioCheckpoint {
            run_id: self.run_id.clone(),
            config_hash: compute_config_hash(&self.config)?,
            briefing_acknowledged: self.briefing_acknowledged,
            state: self.state.clone(),
            unreleased: self.arrivals.unreleased(),
            event_count: self.event_log.len(),
        };
        serde_json::to_string(&checkpoint)
            .map_err(|e| ScenarioError::Serialization(format!("Checkpoint serialization failed: {}", e)))
    }

    /// Resume a run saved with [`Scenario::save_checkpoint`]
    ///
    /// `config` must be the config the checkpoint was taken under. The
    /// event log restarts empty.
    pub fn load_checkpoint(config: ScenarioConfig, json: &str) -> Result<Self, ScenarioError> {
        config.validate()?;
        let checkpoint: ScenarioCheckpoint = serde_json::from_str(json)
            .map_err(|e| ScenarioError::Serialization(format!("Checkpoint parse failed: {}", e)))?;

        let expected = compute_config_hash(&config)?;
        if checkpoint.config_hash != expected {
            return Err(ScenarioError::Checkpoint(
                "Config hash mismatch: checkpoint was taken under a different config".to_string(),
            ));
        }
        validate_checkpoint(&checkpoint)?;
        let tick_size = checkpoint.state.clock().tick_size();
        if tick_size != config.tick_size {
            return Err(ScenarioError::Checkpoint(format!(
                "Clock tick size {} does not match config tick size {}",
                tick_size, config.tick_size
            )));
        }

        let arrivals = FixedArrivals::from_entities(checkpoint.unreleased, None)?;
        let strategy = config.algorithm.strategy();
        debug!(
            run_id = %checkpoint.run_id,
            now = checkpoint.state.now(),
            events_before = checkpoint.event_count,
            "checkpoint restored"
        );

        Ok(Self {
            config,
            run_id: checkpoint.run_id,
            state: checkpoint.state,
            strategy,
            arrivals: Box::new(arrivals),
            event_log: EventLog::new(),
            briefing_acknowledged: checkpoint.briefing_acknowledged,
        })
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn require_phase(
        &self,
        operation: &'static str,
        allowed: impl Fn(Phase) -> bool,
    ) -> Result<(), ScenarioError> {
        let phase = self.state.phase();
        if allowed(phase) {
            Ok(())
        } else {
            Err(ScenarioError::InvalidPhase { operation, phase })
        }
    }

    fn tick(&mut self, outcome: &mut AdvanceOutcome) -> Result<(), ScenarioError> {
        let delay_penalty = self.config.scoring.preemption_delay_penalty;

        outcome.delay_penalty += PreemptionMonitor::new(self.strategy.as_ref(), delay_penalty)
            .charge_delay(&mut self.state, &mut self.event_log);

        if let Some(done) = service::progress_service(
            &mut self.state,
            self.config.scoring.completion_bonus,
            &mut self.event_log,
        )? {
            outcome.completed.push(done);
        }

        self.state.clock_mut().tick();
        outcome.arrivals.extend(self.admit_arrivals()?);

        if PreemptionMonitor::new(self.strategy.as_ref(), delay_penalty)
            .reevaluate(&mut self.state, &mut self.event_log)
            .is_some()
        {
            outcome.preemption_due = true;
        }

        outcome.rejected.extend(self.settle()?);
        Ok(())
    }

    /// Register and admit every arrival due at the current time
    fn admit_arrivals(&mut self) -> Result<Vec<Entity>, ScenarioError> {
        let now = self.state.now();
        let mut admitted = Vec::new();

        while let Some(entity) = self.arrivals.next_arrival(now) {
            let id = entity.id();
            self.state.entities_mut().insert(entity)?;
            let entity = self
                .state
                .entities_mut()
                .get_mut(id)
                .ok_or(JudgeError::MissingEntity(id))?;
            entity.admit().map_err(JudgeError::from)?;

            self.event_log.log(Event::Arrival {
                time: now,
                entity_id: id,
                size: entity.size(),
            });
            debug!(time = now, entity = %id, size = entity.size(), "arrival");
            admitted.push(entity.clone());
        }

        Ok(admitted)
    }

    /// Apply automatic rejections and phase transitions until stable
    ///
    /// Returns the requests rejected along the way.
    fn settle(&mut self) -> Result<Vec<EntityId>, ScenarioError> {
        let mut rejected = Vec::new();
        loop {
            if self.state.phase() == Phase::Active
                && self.strategy.family() == AlgorithmFamily::Allocation
            {
                rejected.extend(service::reject_unplaceable(
                    &mut self.state,
                    self.strategy.as_ref(),
                    &mut self.event_log,
                )?);
            }

            let Some(next) = next_phase(self.state.phase(), &self.signals()) else {
                break;
            };
            self.transition(next);
        }
        Ok(rejected)
    }

    fn signals(&self) -> PhaseSignals {
        let now = self.state.now();
        PhaseSignals {
            briefing_acknowledged: self.briefing_acknowledged,
            arrivals_due: self.arrivals.has_due(now),
            arrivals_exhausted: self.arrivals.is_exhausted(),
            any_eligible: self.state.entities().eligible(now).next().is_some(),
            all_terminal: self.state.entities().all_terminal(),
            require_eligible: self.config.require_eligible_to_start,
        }
    }

    fn transition(&mut self, to: Phase) {
        let from = self.state.phase();
        let time = self.state.now();
        self.state.set_phase(to);
        self.event_log.log(Event::PhaseChanged { time, from, to });
        info!(time, from = %from, to = %to, run_id = %self.run_id, "phase changed");
    }
}

// Manual Debug: the generator is summarized, not dumped
impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("scenario_id", &self.config.scenario_id)
            .field("run_id", &self.run_id)
            .field("algorithm", &self.strategy.name())
            .field("phase", &self.state.phase())
            .field("now", &self.state.now())
            .field("entities", &self.state.entities().len())
            .field("event_count", &self.event_log.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
