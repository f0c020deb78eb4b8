//! Scenario configuration validation
//!
//! Every invalid config must fail at construction with a `ConfigError`,
//! never with a half-built scenario.

use algorithm_judge_core_rs::algorithms::{Algorithm, AlgorithmFamily};
use algorithm_judge_core_rs::arrivals::{
    EntitySpec, GenerationMode, HighDemandLimit, RandomizedConfig, SizeBucket,
};
use algorithm_judge_core_rs::orchestrator::{
    ConfigError, PartitionSpec, Phase, Scenario, ScenarioConfig, ScenarioError, ScoringRules,
    Topology, MAX_SCORE_DELTA,
};

fn fixed(specs: &[(u32, u64, u64)]) -> GenerationMode {
    GenerationMode::Fixed {
        entities: specs
            .iter()
            .map(|&(id, arrival, size)| EntitySpec::new(id, arrival, size))
            .collect(),
    }
}

fn config_error(config: ScenarioConfig) -> ConfigError {
    match Scenario::initialize(config) {
        Err(ScenarioError::InvalidConfig(e)) => e,
        Err(other) => panic!("expected config error, got {:?}", other),
        Ok(_) => panic!("expected config error, scenario was built"),
    }
}

fn randomized(count_min: usize, count_max: usize, buckets: Vec<SizeBucket>) -> GenerationMode {
    GenerationMode::Randomized(RandomizedConfig {
        count_min,
        count_max,
        size_buckets: buckets,
        max_arrival_gap: 2,
        seed: 9,
        label_prefix: "Car ".to_string(),
    })
}

fn bucket(min: u64, max: u64, weight: u32) -> SizeBucket {
    SizeBucket { min, max, weight }
}

// ============================================================================
// Roster
// ============================================================================

#[test]
fn test_empty_roster_rejected() {
    let config = ScenarioConfig::new("empty", Algorithm::Fcfs, fixed(&[]), Topology::SingleServer);
    assert_eq!(config_error(config), ConfigError::NoEntities);
}

#[test]
fn test_duplicate_entity_ids_rejected() {
    let config = ScenarioConfig::new(
        "dupes",
        Algorithm::Sjf,
        fixed(&[(1, 0, 3), (2, 0, 4), (1, 2, 5)]),
        Topology::SingleServer,
    );
    assert_eq!(config_error(config), ConfigError::DuplicateEntity(1));
}

#[test]
fn test_zero_size_entity_rejected() {
    let config = ScenarioConfig::new(
        "zero",
        Algorithm::BestFit,
        fixed(&[(1, 0, 10), (2, 0, 0)]),
        Topology::partitions(&[100]),
    );
    assert_eq!(config_error(config), ConfigError::ZeroSize(2));
}

#[test]
fn test_fixed_roster_over_high_demand_cap_rejected() {
    let config = ScenarioConfig::new(
        "crowded",
        Algorithm::FirstFit,
        fixed(&[(1, 0, 90), (2, 0, 100), (3, 1, 95)]),
        Topology::partitions(&[100, 200]),
    )
    .with_high_demand(HighDemandLimit {
        threshold: 80,
        max_count: 2,
    });
    assert_eq!(
        config_error(config),
        ConfigError::TooManyHighDemand { count: 3, max: 2 }
    );
}

// ============================================================================
// Topology and scalars
// ============================================================================

#[test]
fn test_topology_must_match_family() {
    let config = ScenarioConfig::new(
        "cpu-with-partitions",
        Algorithm::Srtf,
        fixed(&[(1, 0, 3)]),
        Topology::partitions(&[100]),
    );
    assert_eq!(
        config_error(config),
        ConfigError::TopologyMismatch {
            family: AlgorithmFamily::Scheduling
        }
    );

    let config = ScenarioConfig::new(
        "memory-with-cpu",
        Algorithm::FirstFit,
        fixed(&[(1, 0, 30)]),
        Topology::SingleServer,
    );
    assert_eq!(
        config_error(config),
        ConfigError::TopologyMismatch {
            family: AlgorithmFamily::Allocation
        }
    );
}

#[test]
fn test_partition_problems_rejected() {
    let empty = ScenarioConfig::new(
        "no-partitions",
        Algorithm::BestFit,
        fixed(&[(1, 0, 30)]),
        Topology::Partitions(vec![]),
    );
    assert_eq!(config_error(empty), ConfigError::NoResources);

    let zero = ScenarioConfig::new(
        "zero-capacity",
        Algorithm::BestFit,
        fixed(&[(1, 0, 30)]),
        Topology::partitions(&[50, 0]),
    );
    assert_eq!(config_error(zero), ConfigError::ZeroCapacity(2));

    let dupes = ScenarioConfig::new(
        "duplicate-partitions",
        Algorithm::BestFit,
        fixed(&[(1, 0, 30)]),
        Topology::Partitions(vec![PartitionSpec::new(4, 50), PartitionSpec::new(4, 60)]),
    );
    assert_eq!(config_error(dupes), ConfigError::DuplicateResource(4));
}

#[test]
fn test_zero_tick_size_rejected() {
    let config = ScenarioConfig::new(
        "frozen",
        Algorithm::Fcfs,
        fixed(&[(1, 0, 3)]),
        Topology::SingleServer,
    )
    .with_tick_size(0);
    assert_eq!(config_error(config), ConfigError::ZeroTickSize);
}

#[test]
fn test_blank_scenario_id_rejected() {
    let config = ScenarioConfig::new("  ", Algorithm::Fcfs, fixed(&[(1, 0, 3)]), Topology::SingleServer);
    assert_eq!(config_error(config), ConfigError::MissingScenarioId);
}

#[test]
fn test_scoring_values_must_be_magnitudes() {
    let scored = |scoring: ScoringRules| {
        ScenarioConfig::new("scored", Algorithm::Sjf, fixed(&[(1, 0, 3)]), Topology::SingleServer)
            .with_scoring(scoring)
    };

    let inverted = ScoringRules {
        wrong_pick_penalty: -10,
        ..ScoringRules::default()
    };
    assert_eq!(
        config_error(scored(inverted)),
        ConfigError::InvalidScoring {
            field: "wrong_pick_penalty",
            value: -10
        }
    );

    let extreme = ScoringRules {
        preemption_delay_penalty: i64::MIN,
        ..ScoringRules::default()
    };
    assert_eq!(
        config_error(scored(extreme)),
        ConfigError::InvalidScoring {
            field: "preemption_delay_penalty",
            value: i64::MIN
        }
    );

    let huge = ScoringRules {
        placement_reward: MAX_SCORE_DELTA + 1,
        ..ScoringRules::default()
    };
    assert!(matches!(
        config_error(scored(huge)),
        ConfigError::InvalidScoring {
            field: "placement_reward",
            ..
        }
    ));

    let zeroed = ScoringRules {
        completion_bonus: 0,
        preemption_delay_penalty: MAX_SCORE_DELTA,
        ..ScoringRules::default()
    };
    assert!(Scenario::initialize(scored(zeroed)).is_ok());
}

// ============================================================================
// Randomized generation bounds
// ============================================================================

#[test]
fn test_randomized_bounds_rejected() {
    let inverted = ScenarioConfig::new(
        "inverted",
        Algorithm::Sjf,
        randomized(6, 3, vec![bucket(1, 5, 1)]),
        Topology::SingleServer,
    );
    assert_eq!(
        config_error(inverted),
        ConfigError::InvalidCountBounds { min: 6, max: 3 }
    );

    let no_buckets = ScenarioConfig::new(
        "no-buckets",
        Algorithm::Sjf,
        randomized(2, 3, vec![bucket(1, 5, 0)]),
        Topology::SingleServer,
    );
    assert_eq!(config_error(no_buckets), ConfigError::EmptySizeBuckets);

    let bad_bucket = ScenarioConfig::new(
        "bad-bucket",
        Algorithm::Sjf,
        randomized(2, 3, vec![bucket(8, 4, 1)]),
        Topology::SingleServer,
    );
    assert_eq!(
        config_error(bad_bucket),
        ConfigError::InvalidBucket { min: 8, max: 4 }
    );
}

#[test]
fn test_high_demand_cap_unreachable_with_only_large_buckets() {
    let config = ScenarioConfig::new(
        "all-trucks",
        Algorithm::FirstFit,
        randomized(4, 6, vec![bucket(90, 150, 1)]),
        Topology::partitions(&[200, 200]),
    )
    .with_high_demand(HighDemandLimit {
        threshold: 80,
        max_count: 2,
    });
    assert_eq!(config_error(config), ConfigError::HighDemandUnsatisfiable);
}

#[test]
fn test_arrival_gap_that_could_overflow_rejected() {
    let with_gap = |max_arrival_gap: u64| {
        ScenarioConfig::new(
            "gaps",
            Algorithm::Fcfs,
            GenerationMode::Randomized(RandomizedConfig {
                count_min: 6,
                count_max: 6,
                size_buckets: vec![bucket(1, 5, 1)],
                max_arrival_gap,
                seed: 3,
                label_prefix: "Job ".to_string(),
            }),
            Topology::SingleServer,
        )
    };

    assert_eq!(
        config_error(with_gap(u64::MAX)),
        ConfigError::ArrivalTimeOverflow {
            gap: u64::MAX,
            count: 6
        }
    );
    assert!(matches!(
        config_error(with_gap(u64::MAX / 5 + 1)),
        ConfigError::ArrivalTimeOverflow { .. }
    ));
    assert!(Scenario::initialize(with_gap(u64::MAX / 5)).is_ok());
}

#[test]
fn test_randomized_roster_honours_high_demand_cap() {
    for seed in 0..50 {
        let config = ScenarioConfig::new(
            "parking",
            Algorithm::FirstFit,
            GenerationMode::Randomized(RandomizedConfig {
                count_min: 6,
                count_max: 10,
                size_buckets: vec![bucket(10, 40, 1), bucket(80, 150, 3)],
                max_arrival_gap: 0,
                seed,
                label_prefix: "Car ".to_string(),
            }),
            Topology::partitions(&[200, 200, 200]),
        )
        .with_high_demand(HighDemandLimit {
            threshold: 80,
            max_count: 2,
        });

        let mut scenario = Scenario::initialize(config).unwrap();
        scenario.acknowledge_briefing().unwrap();
        assert_eq!(scenario.phase(), Phase::Active);

        let entities = scenario.state().entities();
        assert!((6..=10).contains(&entities.len()));
        let large = entities.iter().filter(|e| e.size() >= 80).count();
        assert!(large <= 2, "seed {} produced {} large requests", seed, large);
    }
}

// ============================================================================
// JSON configs
// ============================================================================

#[test]
fn test_config_from_json_applies_defaults() {
    let json = r#"{
        "scenario_id": "json-lesson",
        "algorithm": "best_fit",
        "generation": {
            "fixed": {
                "entities": [
                    { "id": 1, "arrival_time": 0, "size": 40, "label": "File A" },
                    { "id": 2, "arrival_time": 1, "size": 90 }
                ]
            }
        },
        "topology": {
            "partitions": [
                { "id": 1, "capacity": 50 },
                { "id": 2, "capacity": 100, "label": "Big" }
            ]
        }
    }"#;

    let config: ScenarioConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.algorithm, Algorithm::BestFit);
    assert_eq!(config.tick_size, 1);
    assert!(config.require_eligible_to_start);
    assert_eq!(config.scoring.placement_reward, 100);
    assert!(config.high_demand.is_none());

    let scenario = Scenario::initialize(config).unwrap();
    let labels: Vec<&str> = scenario
        .state()
        .resources()
        .iter()
        .map(|r| r.label())
        .collect();
    assert_eq!(labels, vec!["Block 1", "Big"]);
}

#[test]
fn test_single_server_json() {
    let json = r#"{
        "scenario_id": "cpu",
        "algorithm": "srtf",
        "generation": { "fixed": { "entities": [ { "id": 1, "arrival_time": 0, "size": 5 } ] } },
        "topology": "single_server",
        "tick_size": 2
    }"#;

    let config: ScenarioConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.topology, Topology::SingleServer);
    assert_eq!(config.tick_size, 2);
    assert!(Scenario::initialize(config).is_ok());
}

#[test]
fn test_unknown_algorithm_fails_to_parse() {
    let json = r#"{
        "scenario_id": "rr",
        "algorithm": "round_robin",
        "generation": { "fixed": { "entities": [] } },
        "topology": "single_server"
    }"#;
    assert!(serde_json::from_str::<ScenarioConfig>(json).is_err());
}
