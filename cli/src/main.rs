use algorithm_judge_core_rs::presets::{self, PRESET_NAMES};
use algorithm_judge_core_rs::results::{PersistenceError, PersistencePayload, PersistenceService};
use algorithm_judge_core_rs::{Phase, Scenario, ScenarioConfig};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Algorithm Judge CLI
/// Drives lessons from the terminal with the algorithm's own answers
#[derive(Parser)]
#[command(name = "algorithm-judge")]
#[command(about = "Scheduling and allocation lesson judge", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in lessons
    List,
    /// Play a lesson to the end and print its summary
    Play {
        #[command(flatten)]
        source: Source,
        /// Give up after this many ticks
        #[arg(long, default_value_t = 10_000)]
        max_ticks: u64,
    },
    /// Play a lesson for some ticks and print a checkpoint
    Checkpoint {
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        ticks: u64,
    },
    /// Resume a checkpoint and play it to the end
    Resume {
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        checkpoint: PathBuf,
        #[arg(long, default_value_t = 10_000)]
        max_ticks: u64,
    },
}

#[derive(Args)]
struct Source {
    /// Built-in lesson name
    #[arg(long, conflicts_with = "config")]
    preset: Option<String>,
    /// Scenario config JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for randomized presets
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

impl Source {
    fn load(&self) -> Result<ScenarioConfig> {
        match (&self.preset, &self.config) {
            (Some(name), _) => presets::by_name(name, self.seed).with_context(|| {
                format!("unknown preset '{}' (try one of: {})", name, PRESET_NAMES.join(", "))
            }),
            (None, Some(path)) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
            }
            (None, None) => bail!("either --preset or --config is required"),
        }
    }
}

/// Stand-in persistence collaborator that only logs
struct LoggingRecorder;

impl PersistenceService for LoggingRecorder {
    fn record(&mut self, payload: &PersistencePayload) -> Result<Vec<String>, PersistenceError> {
        info!(
            scenario = %payload.scenario_id,
            score = payload.score,
            accuracy = payload.accuracy,
            "recording run"
        );
        let mut unlocked = Vec::new();
        if payload.wrong_attempts == 0 && payload.accuracy >= 100.0 {
            unlocked.push(format!("{}:flawless", payload.scenario_id));
        }
        Ok(unlocked)
    }
}

/// Submit every prescribed action, then let time pass, until `limit` ticks
fn autoplay(scenario: &mut Scenario, limit: u64) -> Result<()> {
    if scenario.phase() == Phase::Intro {
        scenario.acknowledge_briefing()?;
    }

    let mut ticks = 0;
    while scenario.phase() != Phase::Results {
        while let Some(action) = scenario.hint() {
            let verdict = scenario.submit(action)?;
            info!(time = scenario.now(), action = %action, feedback = %verdict.feedback, "submitted");
            if !verdict.accepted {
                bail!("prescribed action {} was refused: {}", action, verdict.feedback);
            }
        }
        if scenario.phase() == Phase::Results || ticks >= limit {
            break;
        }

        let outcome = scenario.advance(1)?;
        ticks += 1;
        if !outcome.rejected.is_empty() {
            warn!(time = scenario.now(), rejected = ?outcome.rejected, "requests rejected");
        }
    }
    Ok(())
}

fn finish(scenario: &mut Scenario, max_ticks: u64) -> Result<()> {
    autoplay(scenario, max_ticks)?;
    if scenario.phase() != Phase::Results {
        bail!("lesson did not finish within {} ticks", max_ticks);
    }

    let summary = scenario.finalize()?;
    let achievements = summary.publish(&mut LoggingRecorder);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    for achievement in achievements {
        println!("unlocked: {}", achievement);
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            for name in PRESET_NAMES {
                println!("{}", name);
            }
        }
        Commands::Play { source, max_ticks } => {
            let mut scenario = Scenario::initialize(source.load()?)?;
            info!(run_id = %scenario.run_id(), "playing");
            finish(&mut scenario, max_ticks)?;
        }
        Commands::Checkpoint { source, ticks } => {
            let mut scenario = Scenario::initialize(source.load()?)?;
            autoplay(&mut scenario, ticks)?;
            println!("{}", scenario.save_checkpoint()?);
        }
        Commands::Resume {
            source,
            checkpoint,
            max_ticks,
        } => {
            let json = std::fs::read_to_string(&checkpoint)
                .with_context(|| format!("reading {}", checkpoint.display()))?;
            let mut scenario = Scenario::load_checkpoint(source.load()?, &json)?;
            info!(run_id = %scenario.run_id(), now = scenario.now(), "resumed");
            finish(&mut scenario, max_ticks)?;
        }
    }

    Ok(())
}
