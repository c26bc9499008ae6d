//! Dialogue Simulation CLI
//!
//! Runs a seeded conversation with the offline collaborators and prints the
//! transcript to stdout. Logs go to stderr, filtered by `RUST_LOG`.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use dialogue_core::config::defaults;
use dialogue_core::events::JsonlEventLogger;
use dialogue_core::output::write_snapshot;
use dialogue_core::{ModelType, SimulationConfig, SimulationRunner, StepReport, TopologyKind};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "dialogue_sim")]
#[command(about = "Simulate a moderated conversation between agents on a social graph")]
struct Args {
    /// Topic of discussion
    #[arg(short, long, required_unless_present = "config")]
    topic: Option<String>,

    /// Number of agents
    #[arg(short, long, default_value_t = 3)]
    agents: usize,

    /// Number of conversation rounds
    #[arg(short, long, default_value_t = 5)]
    rounds: u64,

    /// Language model the agents would use
    #[arg(short, long, default_value = "gpt-3.5-turbo")]
    model: ModelType,

    /// Network shape: star, small-world or scale-free
    #[arg(long, default_value = "star")]
    topology: TopologyKind,

    /// Sampling temperature, 0 to 2
    #[arg(long, default_value_t = 0.7)]
    temperature: f64,

    /// Random seed for reproducibility
    #[arg(long, default_value_t = defaults::SEED)]
    seed: u64,

    /// Run an opinion pass every N rounds
    #[arg(long, default_value_t = defaults::OPINION_UPDATE_FREQUENCY)]
    update_frequency: u64,

    /// Leave the moderator out of the conversation
    #[arg(long)]
    no_moderator: bool,

    /// Load the whole configuration from a TOML file instead
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write dialogue events as JSON lines
    #[arg(long)]
    events: Option<PathBuf>,

    /// Write the final snapshot as JSON
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(args: &Args) -> anyhow::Result<SimulationConfig> {
    if let Some(path) = &args.config {
        return SimulationConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()));
    }

    if args.agents < 2 {
        bail!("at least 2 agents are required, got {}", args.agents);
    }
    if args.rounds < 1 {
        bail!("at least 1 round is required");
    }
    if !(0.0..=2.0).contains(&args.temperature) {
        bail!("temperature must be between 0 and 2, got {}", args.temperature);
    }

    let topic = args.topic.clone().unwrap_or_default();
    let config = SimulationConfig::builder(args.agents, topic, args.rounds)
        .topology(args.topology)
        .model_type(args.model)
        .temperature(args.temperature)
        .seed(args.seed)
        .opinion_update_frequency(args.update_frequency)
        .with_moderator(!args.no_moderator)
        .build()?;
    Ok(config)
}

fn print_header(runner: &SimulationRunner) {
    let config = runner.config();
    println!("Dialogue Simulation");
    println!("===================");
    println!("Topic: {}", config.topic());
    println!("Agents: {}", config.num_agents());
    println!("Rounds: {}", config.num_rounds());
    println!("Topology: {}", config.topology());
    println!("Model: {}", config.model_type());
    println!("Temperature: {}", config.temperature());
    println!("Seed: {}", config.seed());
    println!();

    println!("Agent roster:");
    for agent in runner.simulator().agents() {
        match agent.persona() {
            Some(persona) => {
                println!(
                    "  {} ({}yo, {}) opinion {:+.2}",
                    agent.name(),
                    persona.age(),
                    persona.status(),
                    agent.opinion()
                );
                println!("    -> {}", persona.traits());
            }
            None => println!("  {} opinion {:+.2}", agent.name(), agent.opinion()),
        }
    }
    if runner.simulator().moderator().is_some() {
        println!("  Mediator (moderator)");
    }
    println!();
}

fn print_round(report: &StepReport<'_>) {
    println!("Round {}", report.round);
    println!("  {}: {}", report.speaker, report.message);
    if !report.shifts.is_empty() {
        println!("  Opinion update:");
        for shift in report.shifts {
            println!(
                "    {}: {:+.2} -> {:+.2} ({:+.3})",
                shift.agent_name, shift.before, shift.after, shift.applied_delta
            );
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = build_config(&args)?;
    let mut runner = SimulationRunner::from_config(config)?;

    if let Some(path) = &args.events {
        let logger = JsonlEventLogger::new(path)
            .with_context(|| format!("opening event log {}", path.display()))?;
        runner.simulator_mut().set_sink(Box::new(logger));
    }

    print_header(&runner);
    let summary = runner.run(print_round)?;

    let stats = &summary.snapshot.stats;
    println!();
    println!("Simulation complete");
    println!("===================");
    println!("Run: {}", summary.snapshot.run_id);
    println!("Steps: {}", summary.steps);
    println!("History entries: {}", summary.history_len);
    println!("Opinion passes: {}", summary.opinion_passes);
    println!("Average opinion: {:+.3}", stats.average);
    println!("Opinion spread: {:.3}", stats.spread);
    println!(
        "Distribution: {} status-quo, {} neutral, {} change",
        stats.distribution.positive, stats.distribution.neutral, stats.distribution.negative
    );
    for agent in &summary.snapshot.agents {
        println!("  {}: {:+.2} ({} messages)", agent.name, agent.opinion, agent.message_count);
    }

    if let Some(path) = &args.snapshot {
        write_snapshot(&summary.snapshot, path)
            .with_context(|| format!("writing snapshot to {}", path.display()))?;
        println!("Snapshot written to {}", path.display());
    }

    Ok(())
}
