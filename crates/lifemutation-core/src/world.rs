//! The simulation world: population, networks, targets, and the
//! generation life cycle.

use std::collections::BTreeMap;

use lifemutation_brain::{LayeredNetwork, NetworkError};
use lifemutation_geom::{distance, Point, Rect};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SimulationConfig;
use crate::lifeform::LifeForm;
use crate::mode::GameMode;
use crate::sensor::PeerSnapshot;

/// Errors surfaced by world construction and operation.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// Food dots are scattered in [15, 285] on both axes.
const FOOD_RANGE: std::ops::Range<f32> = 15.0..285.0;

/// Owns every piece of mutable simulation state.
///
/// The same slot id `0..population_count` keys both a [`LifeForm`] and its
/// [`LayeredNetwork`]. Lifeforms are recreated every generation; networks
/// persist and evolve through [`run_selection`](Self::run_selection).
#[derive(Debug, Serialize, Deserialize)]
pub struct SimulationWorld {
    config: SimulationConfig,
    mode: GameMode,
    lifeforms: BTreeMap<usize, LifeForm>,
    networks: BTreeMap<usize, LayeredNetwork>,
    targets: Vec<Rect>,
    food_dots: Vec<Point>,
    generation: u32,
    moves_remaining: u32,
    halted: bool,
    #[serde(skip, default = "entropy_rng")]
    rng: StdRng,
}

fn entropy_rng() -> StdRng {
    StdRng::from_os_rng()
}

impl SimulationWorld {
    /// Builds a world for `mode`, validating `config` up front. The world is
    /// halted until the first [`seed_population`](Self::seed_population).
    pub fn new(config: SimulationConfig, mode: GameMode) -> Result<Self, WorldError> {
        config.validate()?;
        let targets = mode.targets(config.add_baffles);
        Ok(Self {
            config,
            mode,
            lifeforms: BTreeMap::new(),
            networks: BTreeMap::new(),
            targets,
            food_dots: Vec::new(),
            generation: 0,
            moves_remaining: 0,
            halted: true,
            rng: entropy_rng(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[must_use]
    pub fn moves_remaining(&self) -> u32 {
        self.moves_remaining
    }

    #[must_use]
    pub fn targets(&self) -> &[Rect] {
        &self.targets
    }

    /// The shared food layout lifeforms were cloned from this generation.
    #[must_use]
    pub fn food_dots(&self) -> &[Point] {
        &self.food_dots
    }

    #[must_use]
    pub fn lifeforms(&self) -> &BTreeMap<usize, LifeForm> {
        &self.lifeforms
    }

    #[must_use]
    pub fn networks(&self) -> &BTreeMap<usize, LayeredNetwork> {
        &self.networks
    }

    #[must_use]
    pub fn lifeform(&self, id: usize) -> Option<&LifeForm> {
        self.lifeforms.get(&id)
    }

    #[must_use]
    pub fn network(&self, id: usize) -> Option<&LayeredNetwork> {
        self.networks.get(&id)
    }

    /// Network topology implied by the current mode and config: sensor
    /// input width, the configured hidden layers (`0` widens to the input
    /// layer), then the movement mode's output width.
    #[must_use]
    pub fn topology(&self) -> Vec<usize> {
        let inputs =
            LifeForm::input_neurons_required(&self.config, self.mode, !self.targets.is_empty());
        let mut layers = vec![inputs];
        for &hidden in &self.config.hidden_layers {
            layers.push(if hidden == 0 { inputs } else { hidden });
        }
        layers.push(self.config.movement.output_neurons());
        layers
    }

    /// Starts a generation: fresh lifeforms at safe spawn points, fresh
    /// food, full move budget. Networks survive from the previous
    /// generation; any slot without one gets a new random network.
    pub fn seed_population(&mut self) -> Result<(), WorldError> {
        self.moves_remaining = self.config.moves_per_generation;
        self.generation += 1;
        self.halted = false;

        self.lifeforms.clear();
        self.food_dots.clear();
        if self.mode.uses_food() {
            self.scatter_food();
        }

        let topology = self.topology();
        for id in 0..self.config.population_count {
            let location = self.safe_spawn_location();
            if !self.networks.contains_key(&id) {
                self.networks
                    .insert(id, LayeredNetwork::new(id, &topology, &mut self.rng)?);
            }
            let lifeform = LifeForm::new(id, location, self.food_dots.clone(), &mut self.rng);
            self.lifeforms.insert(id, lifeform);
        }

        Ok(())
    }

    /// Drops food at random, discarding (not retrying) dots that land inside
    /// a target rectangle, so the actual count may fall short of the config.
    fn scatter_food(&mut self) {
        for _ in 0..self.config.food_dot_count {
            let dot = Point::new(
                self.rng.random_range(FOOD_RANGE),
                self.rng.random_range(FOOD_RANGE),
            );
            if !self.targets.iter().any(|t| t.contains(dot)) {
                self.food_dots.push(dot);
            }
        }
    }

    /// Draws spawn candidates until one clears the targets, the mode's
    /// forbidden zone, and (when collision detection is on) the already
    /// placed population.
    fn safe_spawn_location(&mut self) -> Point {
        let bounds = self.mode.spawn_bounds();
        loop {
            let candidate = Point::new(
                self.rng.random_range(bounds.x..bounds.right()),
                self.rng.random_range(bounds.y..bounds.bottom()),
            );

            if self.mode.forbidden_spawn(candidate) {
                continue;
            }
            if self.mode.lethal_targets() && self.targets.iter().any(|t| t.contains(candidate)) {
                continue;
            }
            if self.config.peer_collision_enabled
                && self.lifeforms.values().any(|other| {
                    distance(other.location(), candidate) < other.diameter(self.mode)
                })
            {
                continue;
            }

            return candidate;
        }
    }

    /// Advances the generation by one move.
    ///
    /// Every live agent moves exactly once in ascending slot order; an
    /// agent's peer checks see slots below it at their already-updated
    /// positions. Returns `false` once the generation is over (move budget
    /// spent, everyone dead, or a DontStarve world out of shared food), and
    /// keeps returning `false` without touching state until the next
    /// seeding.
    pub fn step(&mut self) -> Result<bool, WorldError> {
        if self.halted {
            return Ok(false);
        }

        let ids: Vec<usize> = self.lifeforms.keys().copied().collect();
        for id in ids {
            let peers: Vec<PeerSnapshot> = self
                .lifeforms
                .values()
                .filter(|other| other.id() != id && !other.is_dead())
                .map(|other| PeerSnapshot {
                    id: other.id(),
                    location: other.location(),
                    diameter: other.diameter(self.mode),
                })
                .collect();

            let Some(lifeform) = self.lifeforms.get_mut(&id) else {
                continue;
            };
            let Some(network) = self.networks.get_mut(&id) else {
                continue;
            };

            lifeform.step(
                network,
                self.mode,
                &self.config,
                &self.targets,
                &peers,
                &mut self.rng,
            )?;

            network.fitness = self.mode.fitness(lifeform);
        }

        self.moves_remaining = self.moves_remaining.saturating_sub(1);

        let all_dead = self.lifeforms.values().all(LifeForm::is_dead);
        let starved = self.mode.uses_food() && self.food_dots.is_empty();
        let running = self.moves_remaining > 0 && !all_dead && !starved;
        if !running {
            self.halted = true;
        }
        Ok(running)
    }

    /// Truncation selection over the network population.
    ///
    /// Networks are ranked ascending by fitness (ties keep slot order). If
    /// no network scored above zero the whole population is discarded and
    /// the next seeding starts from scratch. Otherwise the bottom half
    /// copies the matching top-half survivor and mutates, and the single
    /// best slot is replaced outright by a fresh random network so the
    /// population never stops exploring.
    pub fn run_selection(&mut self) -> Result<(), WorldError> {
        for (id, lifeform) in &self.lifeforms {
            if let Some(network) = self.networks.get_mut(id) {
                network.fitness = self.mode.fitness(lifeform);
            }
        }

        let mut ranked: Vec<LayeredNetwork> =
            std::mem::take(&mut self.networks).into_values().collect();
        ranked.sort_by_key(|network| OrderedFloat(network.fitness));

        let positive_total: f32 = ranked.iter().map(|n| n.fitness.max(0.0)).sum();
        if positive_total == 0.0 {
            // nobody scored; the population restarts at the next seeding
            return Ok(());
        }

        let half = ranked.len() / 2;
        let (losers, survivors) = ranked.split_at_mut(half);
        for (loser, survivor) in losers.iter_mut().zip(survivors.iter()) {
            loser.copy_weights_from(survivor)?;
            loser.mutate(
                self.config.selection_mutation_chance,
                self.config.selection_mutation_magnitude,
                &mut self.rng,
            );
        }

        // the champion's slot restarts from random weights each round
        if let Some(best) = ranked.last_mut() {
            let layers = best.layers().to_vec();
            *best = LayeredNetwork::new(best.id(), &layers, &mut self.rng)?;
        }

        for network in ranked {
            self.networks.insert(network.id(), network);
        }
        Ok(())
    }

    /// Switches game mode. Targets are rebuilt and all networks dropped
    /// (their topology no longer matches); takes effect at the next seeding.
    pub fn set_game_mode(&mut self, mode: GameMode) {
        self.mode = mode;
        self.targets = mode.targets(self.config.add_baffles);
        self.networks.clear();
        self.halted = true;
    }

    /// Replaces the configuration. As with a mode change, the evolved
    /// networks are discarded and the world halts until reseeded.
    pub fn set_config(&mut self, config: SimulationConfig) -> Result<(), WorldError> {
        config.validate()?;
        self.config = config;
        self.targets = self.mode.targets(self.config.add_baffles);
        self.networks.clear();
        self.halted = true;
        Ok(())
    }
}
