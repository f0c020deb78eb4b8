//! Registry mutations shared by the validator and the tick loop
//!
//! Each function applies one already-judged change to the scenario state,
//! keeping the entity, the resource and the monitor state in step, and logs
//! the matching event.

use super::preemption::MonitorState;
use super::JudgeError;
use crate::algorithms::{AlgorithmStrategy, ResolverView};
use crate::models::{Action, EntityId, EntityStatus, Event, EventLog, ResourceId, ScenarioState};
use tracing::{debug, info};

fn entity_size(state: &ScenarioState, id: EntityId) -> Result<u64, JudgeError> {
    state
        .entities()
        .get(id)
        .map(|e| e.size())
        .ok_or(JudgeError::MissingEntity(id))
}

/// Put `action.entity_id` on the server, displacing the current occupant
///
/// Returns the displaced entity, if there was one.
pub fn start_service(
    state: &mut ScenarioState,
    action: Action,
    log: &mut EventLog,
) -> Result<Option<EntityId>, JudgeError> {
    let now = state.now();
    let server = action.resource_id;
    let displaced = state
        .resources()
        .get(server)
        .ok_or(JudgeError::MissingResource(server))?
        .current_occupant();

    if let Some(previous) = displaced {
        let previous_size = entity_size(state, previous)?;
        state
            .entities_mut()
            .get_mut(previous)
            .ok_or(JudgeError::MissingEntity(previous))?
            .yield_service()?;
        release(state, server, previous, previous_size)?;
        log.log(Event::Preempted {
            time: now,
            from: previous,
            to: action.entity_id,
        });
        debug!(time = now, from = %previous, to = %action.entity_id, "preempted");
    }

    let size = entity_size(state, action.entity_id)?;
    state
        .entities_mut()
        .get_mut(action.entity_id)
        .ok_or(JudgeError::MissingEntity(action.entity_id))?
        .start_service(server, now)?;
    state
        .resources_mut()
        .get_mut(server)
        .ok_or(JudgeError::MissingResource(server))?
        .admit(action.entity_id, size)?;
    state.set_monitor(MonitorState::Serving(action.entity_id));

    log.log(Event::ServiceStarted {
        time: now,
        entity_id: action.entity_id,
        resource_id: server,
    });
    Ok(displaced)
}

/// Place an allocation request into a partition
pub fn place(state: &mut ScenarioState, action: Action, log: &mut EventLog) -> Result<(), JudgeError> {
    let now = state.now();
    let size = entity_size(state, action.entity_id)?;
    state
        .resources_mut()
        .get_mut(action.resource_id)
        .ok_or(JudgeError::MissingResource(action.resource_id))?
        .admit(action.entity_id, size)?;
    state
        .entities_mut()
        .get_mut(action.entity_id)
        .ok_or(JudgeError::MissingEntity(action.entity_id))?
        .place(action.resource_id, now)?;

    log.log(Event::Placed {
        time: now,
        entity_id: action.entity_id,
        resource_id: action.resource_id,
    });
    Ok(())
}

/// Serve the running job for one tick
///
/// Consumes up to one tick of its remaining time. When it finishes, the
/// server is freed, the monitor goes idle and the completion bonus is
/// awarded. Returns the id of the job that finished, if any.
pub fn progress_service(
    state: &mut ScenarioState,
    completion_bonus: i64,
    log: &mut EventLog,
) -> Result<Option<EntityId>, JudgeError> {
    let Some((id, server, remaining)) = state
        .entities()
        .in_service()
        .map(|e| (e.id(), e.resource(), e.remaining()))
    else {
        return Ok(None);
    };
    let server = server.ok_or(JudgeError::Unassigned(id))?;

    let slice = state.clock().tick_size().min(remaining);
    let finished_at = state.now() + slice;
    let entity = state
        .entities_mut()
        .get_mut(id)
        .ok_or(JudgeError::MissingEntity(id))?;
    entity.serve(slice, finished_at)?;
    if entity.status() != EntityStatus::Completed {
        return Ok(None);
    }

    let size = entity.size();
    release(state, server, id, size)?;
    state.set_monitor(MonitorState::Idle);
    state.score_mut().award_completion(completion_bonus);
    log.log(Event::ServiceCompleted {
        time: finished_at,
        entity_id: id,
        bonus: completion_bonus,
    });
    debug!(time = finished_at, entity = %id, "service completed");
    Ok(Some(id))
}

/// Reject allocation requests at the head of the line that fit nowhere
///
/// Keeps rejecting until the head request has a feasible partition or no
/// request is waiting. Each rejection counts as external fragmentation.
pub fn reject_unplaceable(
    state: &mut ScenarioState,
    strategy: &dyn AlgorithmStrategy,
    log: &mut EventLog,
) -> Result<Vec<EntityId>, JudgeError> {
    let mut rejected = Vec::new();
    loop {
        let view = ResolverView::of(state);
        let Some(head) = view.head_of_line().map(|e| (e.id(), e.size())) else {
            break;
        };
        if strategy.resolve(&view).is_some() {
            break;
        }

        let (id, size) = head;
        let now = state.now();
        state
            .entities_mut()
            .get_mut(id)
            .ok_or(JudgeError::MissingEntity(id))?
            .reject(now)?;
        state.record_rejection();
        log.log(Event::Rejected {
            time: now,
            entity_id: id,
            size,
        });
        info!(time = now, entity = %id, size, "request fits no partition, rejected");
        rejected.push(id);
    }
    Ok(rejected)
}

fn release(
    state: &mut ScenarioState,
    resource: ResourceId,
    entity: EntityId,
    size: u64,
) -> Result<(), JudgeError> {
    state
        .resources_mut()
        .get_mut(resource)
        .ok_or(JudgeError::MissingResource(resource))?
        .release(entity, size)?;
    Ok(())
}
