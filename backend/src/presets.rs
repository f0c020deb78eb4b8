//! Built-in lessons
//!
//! The deterministic lessons walk through the textbook case of each
//! algorithm. The randomized ones draw a fresh roster from a seed.

use crate::algorithms::Algorithm;
use crate::arrivals::{EntitySpec, GenerationMode, HighDemandLimit, RandomizedConfig, SizeBucket};
use crate::orchestrator::config::{PartitionSpec, ScenarioConfig, Topology};

/// Names accepted by [`by_name`]
pub const PRESET_NAMES: &[&str] = &[
    "fcfs",
    "sjf",
    "srtf",
    "first-fit",
    "best-fit",
    "random-scheduling",
    "random-allocation",
];

/// Look a preset up by name; randomized presets use `seed`
pub fn by_name(name: &str, seed: u64) -> Option<ScenarioConfig> {
    match name {
        "fcfs" => Some(fcfs_lesson()),
        "sjf" => Some(sjf_lesson()),
        "srtf" => Some(srtf_lesson()),
        "first-fit" => Some(first_fit_lesson()),
        "best-fit" => Some(best_fit_lesson()),
        "random-scheduling" => Some(random_scheduling(Algorithm::Srtf, seed)),
        "random-allocation" => Some(random_allocation(Algorithm::BestFit, seed)),
        _ => None,
    }
}

fn fixed(specs: Vec<EntitySpec>) -> GenerationMode {
    GenerationMode::Fixed { entities: specs }
}

/// Three jobs arriving one after another; served strictly by arrival
pub fn fcfs_lesson() -> ScenarioConfig {
    ScenarioConfig::new(
        "fcfs-intro",
        Algorithm::Fcfs,
        fixed(vec![
            EntitySpec::new(1, 0, 4),
            EntitySpec::new(2, 1, 2),
            EntitySpec::new(3, 2, 1),
        ]),
        Topology::SingleServer,
    )
}

/// Four jobs all present at the start; served shortest burst first
pub fn sjf_lesson() -> ScenarioConfig {
    ScenarioConfig::new(
        "sjf-intro",
        Algorithm::Sjf,
        fixed(vec![
            EntitySpec::new(1, 0, 6),
            EntitySpec::new(2, 0, 2),
            EntitySpec::new(3, 0, 8),
            EntitySpec::new(4, 0, 4),
        ]),
        Topology::SingleServer,
    )
}

/// A long job interrupted by a short one arriving at t=4
pub fn srtf_lesson() -> ScenarioConfig {
    ScenarioConfig::new(
        "srtf-intro",
        Algorithm::Srtf,
        fixed(vec![
            EntitySpec::new(1, 0, 10).labelled("A"),
            EntitySpec::new(2, 4, 3).labelled("B"),
        ]),
        Topology::SingleServer,
    )
}

fn cupboard() -> Topology {
    Topology::Partitions(vec![
        PartitionSpec {
            id: 1,
            label: Some("50K".to_string()),
            capacity: 50,
        },
        PartitionSpec {
            id: 2,
            label: Some("100K".to_string()),
            capacity: 100,
        },
        PartitionSpec {
            id: 3,
            label: Some("200K".to_string()),
            capacity: 200,
        },
    ])
}

/// Two files scanned against partitions in their declared order
pub fn first_fit_lesson() -> ScenarioConfig {
    ScenarioConfig::new(
        "first-fit-intro",
        Algorithm::FirstFit,
        fixed(vec![
            EntitySpec::new(1, 0, 60).labelled("File A"),
            EntitySpec::new(2, 0, 40).labelled("File B"),
        ]),
        cupboard(),
    )
}

/// One file that belongs in the tightest partition
pub fn best_fit_lesson() -> ScenarioConfig {
    ScenarioConfig::new(
        "best-fit-intro",
        Algorithm::BestFit,
        fixed(vec![EntitySpec::new(1, 0, 40).labelled("File A")]),
        cupboard(),
    )
}

/// Randomized CPU lesson: 4-7 jobs with short and long bursts
pub fn random_scheduling(algorithm: Algorithm, seed: u64) -> ScenarioConfig {
    ScenarioConfig::new(
        format!("{}-random", algorithm_slug(algorithm)),
        algorithm,
        GenerationMode::Randomized(RandomizedConfig {
            count_min: 4,
            count_max: 7,
            size_buckets: vec![
                SizeBucket {
                    min: 1,
                    max: 4,
                    weight: 3,
                },
                SizeBucket {
                    min: 5,
                    max: 10,
                    weight: 2,
                },
            ],
            max_arrival_gap: 3,
            seed,
            label_prefix: "P".to_string(),
        }),
        Topology::SingleServer,
    )
}

/// Randomized parking lesson with at most two oversized vehicles
pub fn random_allocation(algorithm: Algorithm, seed: u64) -> ScenarioConfig {
    ScenarioConfig::new(
        format!("{}-random", algorithm_slug(algorithm)),
        algorithm,
        GenerationMode::Randomized(RandomizedConfig {
            count_min: 5,
            count_max: 8,
            size_buckets: vec![
                SizeBucket {
                    min: 10,
                    max: 40,
                    weight: 4,
                },
                SizeBucket {
                    min: 80,
                    max: 150,
                    weight: 1,
                },
            ],
            max_arrival_gap: 2,
            seed,
            label_prefix: "Car ".to_string(),
        }),
        Topology::partitions(&[60, 120, 40, 200, 80]),
    )
    .with_high_demand(HighDemandLimit {
        threshold: 80,
        max_count: 2,
    })
}

fn algorithm_slug(algorithm: Algorithm) -> &'static str {
    match algorithm {
        Algorithm::Fcfs => "fcfs",
        Algorithm::Sjf => "sjf",
        Algorithm::Srtf => "srtf",
        Algorithm::FirstFit => "first-fit",
        Algorithm::BestFit => "best-fit",
    }
}
