//! Headless evolution driver: runs generations and logs their outcomes.

use anyhow::Context;
use lifemutation_core::{GameMode, SimulationConfig, SimulationWorld};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Generations to evolve before exiting. Override with `GENERATIONS`.
const DEFAULT_GENERATIONS: u32 = 200;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn generation_budget() -> anyhow::Result<u32> {
    match std::env::var("GENERATIONS") {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("GENERATIONS must be a number, got {raw:?}")),
        Err(_) => Ok(DEFAULT_GENERATIONS),
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let generations = generation_budget()?;
    let config = SimulationConfig::default();
    let mode = GameMode::default();

    info!(
        ?mode,
        population = config.population_count,
        moves = config.moves_per_generation,
        generations,
        "starting evolution run"
    );

    let mut world = SimulationWorld::new(config, mode).context("building simulation world")?;

    for _ in 0..generations {
        world.seed_population().context("seeding population")?;

        let mut moves = 0u32;
        while world.step().context("stepping generation")? {
            moves += 1;
        }

        log_generation(&world, moves);
        world.run_selection().context("running selection")?;
    }

    info!("evolution run complete");
    Ok(())
}

fn log_generation(world: &SimulationWorld, moves: u32) {
    let survivors = world
        .lifeforms()
        .values()
        .filter(|lifeform| !lifeform.is_dead())
        .count();

    let fitnesses: Vec<f32> = world.networks().values().map(|n| n.fitness).collect();
    let best = fitnesses.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mean = if fitnesses.is_empty() {
        0.0
    } else {
        fitnesses.iter().sum::<f32>() / fitnesses.len() as f32
    };

    if survivors == 0 {
        warn!(
            generation = world.generation(),
            moves, "entire population died"
        );
    }

    info!(
        generation = world.generation(),
        moves,
        survivors,
        best_fitness = best,
        mean_fitness = mean,
        "generation finished"
    );
}
