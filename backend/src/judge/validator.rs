//! Action validator and scorer
//!
//! Judges one learner action in three steps:
//!
//! 1. **Well-formedness**: the action must name a registered, arrived,
//!    waiting entity and a resource that could physically take it. A
//!    malformed action is refused without touching the score.
//! 2. **Comparison**: the canonical resolver is asked for the correct
//!    action. A match is applied to the registries and rewarded.
//! 3. **Feedback**: a mismatch is penalized and the verdict carries the
//!    canonical action so the learner can correct course.

use super::{service, JudgeError};
use crate::algorithms::{AlgorithmFamily, AlgorithmStrategy, ResolverView};
use crate::models::{
    Action, EntityStatus, Event, EventLog, MalformedAction, ScenarioState, Verdict,
};
use crate::orchestrator::config::ScoringRules;
use tracing::debug;

/// Judges learner actions against one algorithm
#[derive(Debug, Clone, Copy)]
pub struct ActionValidator<'a> {
    strategy: &'a dyn AlgorithmStrategy,
    scoring: &'a ScoringRules,
}

impl<'a> ActionValidator<'a> {
    pub fn new(strategy: &'a dyn AlgorithmStrategy, scoring: &'a ScoringRules) -> Self {
        Self { strategy, scoring }
    }

    /// Judge `action`, applying it when it is the canonical one
    ///
    /// Wrong and malformed actions are ordinary verdicts. An `Err` means
    /// the registries refused a mutation that validation had allowed.
    pub fn submit(
        &self,
        state: &mut ScenarioState,
        action: Action,
        log: &mut EventLog,
    ) -> Result<Verdict, JudgeError> {
        if let Err(error) = self.check_well_formed(state, action) {
            debug!(action = %action, error = %error, "malformed action");
            state.score_mut().record_malformed();
            log.log(Event::MalformedAction {
                time: state.now(),
                submitted: action,
                error: error.clone(),
            });
            return Ok(Verdict::malformed(action, error));
        }

        let family = self.strategy.family();
        let canonical = self.strategy.resolve(&ResolverView::of(state));

        if canonical == Some(action) {
            let feedback = self.praise(state, action);
            match family {
                AlgorithmFamily::Scheduling => {
                    service::start_service(state, action, log)?;
                }
                AlgorithmFamily::Allocation => service::place(state, action, log)?,
            }
            let reward = self.scoring.reward_for(family);
            state.score_mut().record_correct(reward);
            debug!(action = %action, reward, "correct action");
            return Ok(Verdict::correct(action, reward, feedback));
        }

        let penalty = self.scoring.penalty_for(family);
        let feedback = self.correction(state, action, canonical);
        state.score_mut().record_wrong(-penalty);
        log.log(Event::WrongChoice {
            time: state.now(),
            submitted: action,
            canonical,
            penalty,
        });
        debug!(action = %action, penalty, "wrong choice");
        Ok(Verdict::wrong(action, canonical, -penalty, feedback))
    }

    /// Everything that can be refused without consulting the algorithm
    pub fn check_well_formed(
        &self,
        state: &ScenarioState,
        action: Action,
    ) -> Result<(), MalformedAction> {
        let entity = state
            .entities()
            .get(action.entity_id)
            .ok_or(MalformedAction::UnknownEntity(action.entity_id))?;
        let resource = state
            .resources()
            .get(action.resource_id)
            .ok_or(MalformedAction::UnknownResource(action.resource_id))?;

        let scheduling = self.strategy.family() == AlgorithmFamily::Scheduling;
        if resource.is_server() != scheduling {
            return Err(MalformedAction::WrongResourceKind {
                resource: resource.id(),
            });
        }

        if entity.status() == EntityStatus::Pending || entity.arrival_time() > state.now() {
            return Err(MalformedAction::NotArrived { entity: entity.id() });
        }
        if entity.status() != EntityStatus::Waiting {
            return Err(MalformedAction::NotWaiting {
                entity: entity.id(),
                status: entity.status(),
            });
        }

        if scheduling {
            if let Some(occupant) = resource.current_occupant() {
                if !self.strategy.is_preemptive() {
                    return Err(MalformedAction::ServerBusy {
                        resource: resource.id(),
                        occupant,
                    });
                }
            }
        } else if !resource.can_fit(entity.size()) {
            return Err(MalformedAction::CannotFit {
                resource: resource.id(),
                size: entity.size(),
                available: resource.remaining_capacity(),
            });
        }

        Ok(())
    }

    fn praise(&self, state: &ScenarioState, action: Action) -> String {
        let entity = entity_label(state, action);
        match self.strategy.family() {
            AlgorithmFamily::Scheduling => {
                format!("Correct: {} picks {}", self.strategy.criterion(), entity)
            }
            AlgorithmFamily::Allocation => format!(
                "Correct: {} puts {} in {}",
                self.strategy.criterion(),
                entity,
                resource_label(state, action)
            ),
        }
    }

    fn correction(&self, state: &ScenarioState, submitted: Action, canonical: Option<Action>) -> String {
        let criterion = self.strategy.criterion();
        let Some(canonical) = canonical else {
            return "No action is correct right now".to_string();
        };

        let running = state.entities().in_service().map(|e| e.id());
        if running == Some(canonical.entity_id) {
            return format!(
                "{} keeps {} on the CPU",
                capitalize(criterion),
                entity_label(state, canonical)
            );
        }

        match self.strategy.family() {
            AlgorithmFamily::Scheduling => format!(
                "{} picks {}, not {}",
                capitalize(criterion),
                entity_label(state, canonical),
                entity_label(state, submitted)
            ),
            AlgorithmFamily::Allocation if canonical.entity_id != submitted.entity_id => format!(
                "{} goes first, not {}",
                entity_label(state, canonical),
                entity_label(state, submitted)
            ),
            AlgorithmFamily::Allocation => format!(
                "{} is {}, not {}",
                capitalize(criterion),
                resource_label(state, canonical),
                resource_label(state, submitted)
            ),
        }
    }
}

fn entity_label(state: &ScenarioState, action: Action) -> String {
    state
        .entities()
        .get(action.entity_id)
        .map(|e| e.label().to_string())
        .unwrap_or_else(|| action.entity_id.to_string())
}

fn resource_label(state: &ScenarioState, action: Action) -> String {
    state
        .resources()
        .get(action.resource_id)
        .map(|r| r.label().to_string())
        .unwrap_or_else(|| action.resource_id.to_string())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
