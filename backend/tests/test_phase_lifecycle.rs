//! Phase lifecycle tests
//!
//! Intro → Arrival → Active → Results, driven only through the public API.
//! Operations outside their phase fail without touching state.

use algorithm_judge_core_rs::algorithms::Algorithm;
use algorithm_judge_core_rs::arrivals::{EntitySpec, GenerationMode};
use algorithm_judge_core_rs::orchestrator::{Phase, Scenario, ScenarioConfig, Topology, SERVER_ID};
use algorithm_judge_core_rs::presets;
use algorithm_judge_core_rs::{Action, EntityId, ScenarioError};

// ============================================================================
// Test Helpers
// ============================================================================

fn fcfs(specs: &[(u32, u64, u64)]) -> ScenarioConfig {
    ScenarioConfig::new(
        "lifecycle",
        Algorithm::Fcfs,
        GenerationMode::Fixed {
            entities: specs
                .iter()
                .map(|&(id, arrival, burst)| EntitySpec::new(id, arrival, burst))
                .collect(),
        },
        Topology::SingleServer,
    )
}

fn pick(id: u32) -> Action {
    Action::new(EntityId(id), SERVER_ID)
}

// ============================================================================
// Forward transitions
// ============================================================================

#[test]
fn test_new_scenario_starts_in_intro() {
    let scenario = Scenario::initialize(presets::fcfs_lesson()).unwrap();
    assert_eq!(scenario.phase(), Phase::Intro);
    assert_eq!(scenario.now(), 0);
    assert!(scenario.state().entities().is_empty());
    assert!(scenario.event_log().is_empty());
    assert_eq!(scenario.hint(), None);
}

#[test]
fn test_briefing_moves_straight_to_active_when_entities_are_waiting() {
    let mut scenario = Scenario::initialize(presets::fcfs_lesson()).unwrap();
    scenario.acknowledge_briefing().unwrap();

    assert_eq!(scenario.phase(), Phase::Active);
    assert_eq!(scenario.state().entities().len(), 1);
    assert_eq!(scenario.event_log().events_of_type("Arrival").len(), 1);
    assert_eq!(
        scenario.event_log().events_of_type("PhaseChanged").len(),
        2,
        "Intro → Arrival and Arrival → Active"
    );
}

#[test]
fn test_arrival_waits_for_first_entity() {
    let mut scenario = Scenario::initialize(fcfs(&[(1, 3, 2)])).unwrap();
    scenario.acknowledge_briefing().unwrap();
    assert_eq!(scenario.phase(), Phase::Arrival);

    let outcome = scenario.advance(2).unwrap();
    assert!(outcome.arrivals.is_empty());
    assert_eq!(scenario.phase(), Phase::Arrival);

    let outcome = scenario.advance(1).unwrap();
    assert_eq!(outcome.arrivals.len(), 1);
    assert_eq!(scenario.phase(), Phase::Active);
    assert_eq!(scenario.hint(), Some(pick(1)));
}

#[test]
fn test_arrival_hands_over_immediately_when_not_waiting_for_eligible() {
    let mut config = fcfs(&[(1, 3, 2)]);
    config.require_eligible_to_start = false;

    let mut scenario = Scenario::initialize(config).unwrap();
    scenario.acknowledge_briefing().unwrap();
    assert_eq!(scenario.phase(), Phase::Active);
    assert_eq!(scenario.hint(), None);
}

#[test]
fn test_results_reached_only_when_every_entity_is_done() {
    // P2 arrives long after P1 finishes; Results must wait for it
    let mut scenario = Scenario::initialize(fcfs(&[(1, 0, 1), (2, 5, 1)])).unwrap();
    scenario.acknowledge_briefing().unwrap();
    scenario.submit(pick(1)).unwrap();

    let outcome = scenario.advance(1).unwrap();
    assert_eq!(outcome.completed, vec![EntityId(1)]);
    assert_eq!(scenario.phase(), Phase::Active);

    scenario.advance(4).unwrap();
    assert_eq!(scenario.phase(), Phase::Active);
    scenario.submit(pick(2)).unwrap();
    scenario.advance(1).unwrap();
    assert_eq!(scenario.phase(), Phase::Results);
}

#[test]
fn test_advance_stops_at_results() {
    let mut scenario = Scenario::initialize(fcfs(&[(1, 0, 2)])).unwrap();
    scenario.acknowledge_briefing().unwrap();
    scenario.submit(pick(1)).unwrap();

    let outcome = scenario.advance(10).unwrap();
    assert_eq!(outcome.ticks, 2);
    assert_eq!(scenario.now(), 2);
    assert_eq!(scenario.phase(), Phase::Results);
}

#[test]
fn test_tick_size_rounds_delta_up() {
    let mut scenario = Scenario::initialize(fcfs(&[(1, 0, 9)]).with_tick_size(2)).unwrap();
    scenario.acknowledge_briefing().unwrap();
    scenario.submit(pick(1)).unwrap();

    let outcome = scenario.advance(3).unwrap();
    assert_eq!(outcome.ticks, 2);
    assert_eq!(scenario.now(), 4);
    assert_eq!(
        scenario.state().entities().get(EntityId(1)).unwrap().remaining(),
        5
    );

    // Last slice is cut to the remaining work
    scenario.advance(6).unwrap();
    assert_eq!(scenario.phase(), Phase::Results);
    let summary = scenario.finalize().unwrap();
    assert_eq!(summary.entities[0].completion_time, Some(9));
}

// ============================================================================
// Operations outside their phase
// ============================================================================

#[test]
fn test_submit_before_active_is_rejected() {
    let mut scenario = Scenario::initialize(presets::fcfs_lesson()).unwrap();
    let err = scenario.submit(pick(1)).unwrap_err();
    assert_eq!(
        err,
        ScenarioError::InvalidPhase {
            operation: "submit an action",
            phase: Phase::Intro,
        }
    );
    assert_eq!(scenario.state().score().malformed_actions(), 0);
}

#[test]
fn test_advance_in_intro_is_rejected() {
    let mut scenario = Scenario::initialize(presets::fcfs_lesson()).unwrap();
    assert!(matches!(
        scenario.advance(1),
        Err(ScenarioError::InvalidPhase { phase: Phase::Intro, .. })
    ));
    assert_eq!(scenario.now(), 0);
}

#[test]
fn test_briefing_cannot_be_acknowledged_twice() {
    let mut scenario = Scenario::initialize(presets::fcfs_lesson()).unwrap();
    scenario.acknowledge_briefing().unwrap();
    assert!(matches!(
        scenario.acknowledge_briefing(),
        Err(ScenarioError::InvalidPhase { phase: Phase::Active, .. })
    ));
}

#[test]
fn test_finalize_only_in_results() {
    let mut scenario = Scenario::initialize(fcfs(&[(1, 0, 1)])).unwrap();
    assert!(scenario.finalize().is_err());

    scenario.acknowledge_briefing().unwrap();
    assert!(scenario.finalize().is_err());

    scenario.submit(pick(1)).unwrap();
    scenario.advance(1).unwrap();
    assert!(scenario.finalize().is_ok());
}

#[test]
fn test_results_is_terminal() {
    let mut scenario = Scenario::initialize(fcfs(&[(1, 0, 1)])).unwrap();
    scenario.acknowledge_briefing().unwrap();
    scenario.submit(pick(1)).unwrap();
    scenario.advance(1).unwrap();
    assert_eq!(scenario.phase(), Phase::Results);

    assert!(scenario.advance(1).is_err());
    assert!(scenario.submit(pick(1)).is_err());
    assert_eq!(scenario.hint(), None);
    assert_eq!(scenario.phase(), Phase::Results);
}

// ============================================================================
// Restart
// ============================================================================

#[test]
fn test_restart_resets_everything_but_config() {
    let mut scenario = Scenario::initialize(presets::sjf_lesson()).unwrap();
    let first_run = scenario.run_id().to_string();

    scenario.acknowledge_briefing().unwrap();
    scenario.submit(pick(3)).unwrap();
    scenario.submit(pick(2)).unwrap();
    scenario.advance(1).unwrap();
    assert!(scenario.state().score().wrong_attempts() > 0);

    scenario.restart().unwrap();

    assert_ne!(scenario.run_id(), first_run);
    assert_eq!(scenario.phase(), Phase::Intro);
    assert_eq!(scenario.now(), 0);
    assert!(scenario.state().entities().is_empty());
    assert_eq!(scenario.state().score().points(), 0);
    assert_eq!(scenario.state().score().wrong_attempts(), 0);
    assert_eq!(scenario.config().scenario_id, "sjf-intro");

    let events = scenario.event_log().events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type(), "Restarted");
}

#[test]
fn test_restart_from_results_replays_same_lesson() {
    let mut scenario = Scenario::initialize(presets::fcfs_lesson()).unwrap();
    scenario.acknowledge_briefing().unwrap();
    for _ in 0..50 {
        while let Some(action) = scenario.hint() {
            scenario.submit(action).unwrap();
        }
        if scenario.phase() == Phase::Results {
            break;
        }
        scenario.advance(1).unwrap();
    }
    let first = scenario.finalize().unwrap();

    scenario.restart().unwrap();
    scenario.acknowledge_briefing().unwrap();
    for _ in 0..50 {
        while let Some(action) = scenario.hint() {
            scenario.submit(action).unwrap();
        }
        if scenario.phase() == Phase::Results {
            break;
        }
        scenario.advance(1).unwrap();
    }
    let second = scenario.finalize().unwrap();

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.points, second.points);
    assert_eq!(first.entities, second.entities);
}
