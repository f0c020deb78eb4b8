//! Scenario State
//!
//! All mutable state of a run in one value: clock, registries, score, phase,
//! preemption monitor state and the rejection counter. The engine owns it and
//! hands it by reference to each component, so no component keeps counters
//! of its own.
//!
//! # Critical Invariants
//!
//! 1. **Single occupancy**: at most one entity is `InService`, and it is the
//!    occupant of the server
//! 2. **Capacity accounting**: every partition's remaining capacity equals
//!    its capacity minus the sizes of its occupants
//! 3. **Score ownership**: only the validator and the monitor touch `score`

use crate::core::time::Clock;
use crate::judge::preemption::MonitorState;
use crate::models::entity::{Entity, EntityStatus};
use crate::models::registry::{EntityRegistry, ResourceRegistry};
use crate::models::resource::Resource;
use crate::models::score::ScoreState;
use crate::orchestrator::phase::Phase;
use serde::{Deserialize, Serialize};

/// Complete state of one scenario run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioState {
    clock: Clock,
    entities: EntityRegistry,
    resources: ResourceRegistry,
    score: ScoreState,
    phase: Phase,
    monitor: MonitorState,
    /// Allocation requests that fit nowhere
    rejections: u32,
}

impl ScenarioState {
    /// Fresh state at time zero in the Intro phase
    pub fn new(clock: Clock, resources: ResourceRegistry) -> Self {
        Self {
            clock,
            entities: EntityRegistry::new(),
            resources,
            score: ScoreState::new(),
            phase: Phase::Intro,
            monitor: MonitorState::Idle,
            rejections: 0,
        }
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn monitor(&self) -> MonitorState {
        self.monitor
    }

    pub fn rejections(&self) -> u32 {
        self.rejections
    }

    // ========================================================================
    // Crate-internal mutation
    // ========================================================================

    pub(crate) fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    pub(crate) fn entities_mut(&mut self) -> &mut EntityRegistry {
        &mut self.entities
    }

    pub(crate) fn resources_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.resources
    }

    pub(crate) fn score_mut(&mut self) -> &mut ScoreState {
        &mut self.score
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn set_monitor(&mut self, monitor: MonitorState) {
        self.monitor = monitor;
    }

    pub(crate) fn record_rejection(&mut self) {
        self.rejections += 1;
    }

    // ========================================================================
    // Invariant checks
    // ========================================================================

    /// Verify the cross-registry invariants
    ///
    /// Used after restoring a checkpoint; a live run maintains them by
    /// construction.
    pub fn validate(&self) -> Result<(), String> {
        for entity in self.entities.iter() {
            entity.validate().map_err(|e| e.to_string())?;
        }

        let in_service: Vec<&Entity> = self
            .entities
            .iter()
            .filter(|e| e.status() == EntityStatus::InService)
            .collect();
        if in_service.len() > 1 {
            return Err(format!("{} entities in service at once", in_service.len()));
        }

        for resource in self.resources.iter() {
            let occupant_sizes = self.occupant_sizes(resource)?;
            resource
                .validate(occupant_sizes)
                .map_err(|e| e.to_string())?;
            self.check_occupants(resource)?;
        }

        if let Some(running) = in_service.first() {
            let holder = running
                .resource()
                .and_then(|id| self.resources.get(id))
                .and_then(Resource::current_occupant);
            if holder != Some(running.id()) {
                return Err(format!(
                    "entity {} is in service but not on its server",
                    running.id()
                ));
            }
        }

        let running = in_service.first().map(|e| e.id());
        if self.monitor.running() != running {
            return Err(format!(
                "monitor {:?} disagrees with the entity in service ({:?})",
                self.monitor, running
            ));
        }

        Ok(())
    }

    /// Servers hold only their in-service entity, partitions only placed ones
    fn check_occupants(&self, resource: &Resource) -> Result<(), String> {
        let expected = if resource.is_server() {
            EntityStatus::InService
        } else {
            EntityStatus::Completed
        };
        for id in resource.occupants() {
            let Some(entity) = self.entities.get(*id) else {
                continue;
            };
            if entity.status() != expected || entity.resource() != Some(resource.id()) {
                return Err(format!(
                    "resource {} holds entity {} which is {}",
                    resource.id(),
                    id,
                    entity.status()
                ));
            }
        }
        Ok(())
    }

    fn occupant_sizes(&self, resource: &Resource) -> Result<u64, String> {
        resource
            .occupants()
            .iter()
            .map(|id| {
                self.entities
                    .get(*id)
                    .map(Entity::size)
                    .ok_or_else(|| format!("resource {} holds unknown entity {}", resource.id(), id))
            })
            .sum()
    }
}
