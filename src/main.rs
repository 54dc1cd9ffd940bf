//! Headless colony runner
//!
//! Bootstraps (or loads) a colony, runs a fixed number of ticks and prints
//! the final status.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use colony_sim::core::config::SimulationConfig;
use colony_sim::core::error::Result;
use colony_sim::persistence::JsonSaveStore;
use colony_sim::simulation::events::TracingSink;
use colony_sim::simulation::policy::PolicyId;
use colony_sim::simulation::tick::SimulationEngine;

#[derive(Parser, Debug)]
#[command(name = "colony_sim")]
#[command(about = "Run the colony simulation headless")]
struct Args {
    /// Ticks to run (5 ticks = 1 second of world time at the default rate)
    #[arg(long, default_value_t = 1500)]
    ticks: u64,

    /// TOML config; missing keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for active-save.json and its backups
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Save on the autosave interval while running
    #[arg(long)]
    autosave: bool,

    /// Resume from the active save in --save-dir
    #[arg(long)]
    load: bool,

    /// Policy to apply before running (FORTIFY, HARVEST_RUSH, RECOVERY)
    #[arg(long)]
    policy: Option<String>,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: String,

    /// Multi-line status in text output
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Serialize)]
struct RunSummary {
    ticks: u64,
    world_time: u64,
    population: usize,
    population_cap: u32,
    hotspots: usize,
    tasks: usize,
    raids_survived: u32,
    threat_score: u32,
    reserve: i64,
    policy: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("colony_sim=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load_from_toml(path)?,
        None => SimulationConfig::default(),
    };
    if args.autosave {
        config.sim.autosave = true;
    }
    let rotations = config.save.backup_rotations;

    let mut engine = SimulationEngine::with_sink(config, TracingSink)?;
    if let Some(dir) = &args.save_dir {
        engine = engine.with_store(Box::new(JsonSaveStore::new(dir, rotations)));
        if args.load {
            engine.load()?;
        }
    }

    if let Some(policy) = &args.policy {
        engine.apply_policy(policy.parse::<PolicyId>()?);
    }

    tracing::info!(ticks = args.ticks, "running colony");
    for _ in 0..args.ticks {
        engine.tick()?;
    }

    if args.save_dir.is_some() {
        engine.save_now()?;
    }

    if args.format == "json" {
        let world = engine.world();
        let summary = RunSummary {
            ticks: engine.tick_count(),
            world_time: world.world_time,
            population: world.population(),
            population_cap: world.population_cap,
            hotspots: world.hotspots.len(),
            tasks: world.tasks.len(),
            raids_survived: world.threat.raids_survived,
            threat_score: world.threat.threat_score,
            reserve: world.reserve.balance,
            policy: world.active_policy.to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", engine.status(args.verbose));
    }

    Ok(())
}
