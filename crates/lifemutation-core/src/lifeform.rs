//! A single agent: sensor suite, decision pipeline, and movement.

use lifemutation_brain::LayeredNetwork;
use lifemutation_geom::{clamp_360, deg_to_rad, distance, rad_to_deg, Point, Rect};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::config::{MovementMode, SimulationConfig};
use crate::mode::{GameMode, PLAY_AREA_CENTER};
use crate::sensor::{FoodSensor, PeerSensor, PeerSnapshot, WallSensor};
use crate::world::WorldError;

/// Eating reach beyond the blob radius (food dot width plus top speed).
const FOOD_REACH_MARGIN: f32 = 5.0;

/// Half-width of the target inflation applied before lethal contact checks,
/// accounting for the blob's radius.
const LETHAL_INFLATE: f32 = 4.0;

/// One lifeform blob.
///
/// Owns its sensors and a private clone of the generation's food dots, so
/// every agent hunts the same initial layout without stealing bites from the
/// others. The matching [`LayeredNetwork`] lives in the world under the same
/// slot id and is lent to [`step`](Self::step) each move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifeForm {
    id: usize,
    location: Point,
    desired_position: Point,
    heading_degrees: f32,
    speed: f32,
    is_dead: bool,
    food_eaten: u32,
    food_dots: Vec<Point>,
    trail: Vec<Point>,
    food_sensor: FoodSensor,
    peer_sensor: PeerSensor,
    wall_sensor: WallSensor,
}

impl LifeForm {
    /// Spawns a lifeform at `location` facing a random direction.
    pub fn new(id: usize, location: Point, food_dots: Vec<Point>, rng: &mut dyn RngCore) -> Self {
        Self {
            id,
            location,
            desired_position: location,
            heading_degrees: rng.random_range(0.0..360.0),
            speed: 0.0,
            is_dead: false,
            food_eaten: 0,
            food_dots,
            trail: Vec::new(),
            food_sensor: FoodSensor::default(),
            peer_sensor: PeerSensor::default(),
            wall_sensor: WallSensor::default(),
        }
    }

    /// Input layer width implied by the sensor suite for `mode` and
    /// `config`. Always at least 1 so a sensor-free setup still feeds the
    /// network something.
    #[must_use]
    pub fn input_neurons_required(
        config: &SimulationConfig,
        mode: GameMode,
        has_targets: bool,
    ) -> usize {
        let mut neurons = 0;
        if mode == GameMode::ReachCenter {
            neurons += 1; // in-circle indicator
        }
        if mode.uses_food() {
            neurons += config.food_sensor_sectors();
        }
        if config.peer_collision_enabled {
            neurons += config.peer_sensor_sample_points;
        }
        if has_targets {
            neurons += config.wall_sensor_sample_points;
        }
        neurons.max(1)
    }

    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub fn location(&self) -> Point {
        self.location
    }

    /// Where the network last asked to go (DesiredPoint steering only).
    #[must_use]
    pub fn desired_position(&self) -> Point {
        self.desired_position
    }

    #[must_use]
    pub fn heading_degrees(&self) -> f32 {
        self.heading_degrees
    }

    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    #[must_use]
    pub fn food_eaten(&self) -> u32 {
        self.food_eaten
    }

    /// This agent's remaining private food dots.
    #[must_use]
    pub fn food_dots(&self) -> &[Point] {
        &self.food_dots
    }

    /// Every position visited this generation, oldest first.
    #[must_use]
    pub fn trail(&self) -> &[Point] {
        &self.trail
    }

    #[must_use]
    pub fn food_sensor(&self) -> &FoodSensor {
        &self.food_sensor
    }

    #[must_use]
    pub fn peer_sensor(&self) -> &PeerSensor {
        &self.peer_sensor
    }

    #[must_use]
    pub fn wall_sensor(&self) -> &WallSensor {
        &self.wall_sensor
    }

    /// Blob size: DontStarve blobs start small and grow with each meal.
    #[must_use]
    pub fn diameter(&self, mode: GameMode) -> f32 {
        if mode == GameMode::DontStarve {
            4.0 + self.food_eaten as f32
        } else {
            10.0
        }
    }

    /// Marks the lifeform dead. Death is terminal for the generation.
    pub fn kill(&mut self) {
        self.is_dead = true;
    }

    /// Runs one move: sense, feed forward, steer, displace, and resolve
    /// collisions. Dead lifeforms do nothing.
    pub(crate) fn step(
        &mut self,
        network: &mut LayeredNetwork,
        mode: GameMode,
        config: &SimulationConfig,
        targets: &[Rect],
        peers: &[PeerSnapshot],
        rng: &mut dyn RngCore,
    ) -> Result<(), WorldError> {
        if self.is_dead {
            return Ok(());
        }

        let inputs = self.collect_inputs(mode, config, targets, peers);
        let outputs = network.feed_forward(&inputs)?;
        self.steer(&outputs, mode, config, rng);

        let heading = deg_to_rad(self.heading_degrees);
        let before = self.location;
        self.location.x += heading.cos() * self.speed;
        self.location.y += heading.sin() * self.speed;

        // the play-area edge is lethal when homing on the centre
        if mode == GameMode::ReachCenter
            && (self.location.x < 10.0
                || self.location.x > 290.0
                || self.location.y < 10.0
                || self.location.y > 290.0)
        {
            self.is_dead = true;
            return Ok(());
        }

        if mode == GameMode::DontTouchRed
            && (120.0..=180.0).contains(&self.location.x)
            && (120.0..=180.0).contains(&self.location.y)
        {
            self.is_dead = true;
            return Ok(());
        }

        self.location.x = self.location.x.clamp(5.0, 295.0);
        self.location.y = self.location.y.clamp(5.0, 295.0);

        self.resolve_collisions(before, mode, config, targets, peers);

        self.trail.push(self.location);
        Ok(())
    }

    /// Assembles the network input vector: in-circle indicator, food sweep,
    /// peer sweep, wall sweep, in that fixed order, each present only when
    /// its sensor is active.
    fn collect_inputs(
        &mut self,
        mode: GameMode,
        config: &SimulationConfig,
        targets: &[Rect],
        peers: &[PeerSnapshot],
    ) -> Vec<f32> {
        let mut inputs = Vec::new();

        if mode == GameMode::ReachCenter {
            let d = distance(self.location, PLAY_AREA_CENTER);
            inputs.push(if d < 40.0 { 0.0 } else { 1.0 });
        }

        if mode.uses_food() {
            inputs.extend(self.food_sensor.read(
                self.heading_degrees,
                self.location,
                &self.food_dots,
                config.food_sensor_sector_degrees,
                config.food_sensor_depth,
            ));
        }

        if config.peer_collision_enabled {
            inputs.extend(self.peer_sensor.read(
                self.heading_degrees,
                self.location,
                self.id,
                peers,
                config.peer_sensor_sample_points,
                config.peer_sensor_depth,
            ));
        }

        if !targets.is_empty() {
            inputs.extend(self.wall_sensor.read(
                self.heading_degrees,
                self.location,
                targets,
                config.wall_sensor_sample_points,
                mode.wall_sensor_depth(config),
            ));
        }

        if inputs.is_empty() {
            inputs.push(0.0);
        }

        inputs
    }

    /// Turns network outputs into a new heading and speed.
    fn steer(
        &mut self,
        outputs: &[f32],
        mode: GameMode,
        config: &SimulationConfig,
        rng: &mut dyn RngCore,
    ) {
        match config.movement {
            MovementMode::DesiredPoint => {
                self.desired_position = Point::new(
                    self.location.x + outputs[0] * 300.0,
                    self.location.y + outputs[1] * 300.0,
                );

                let bearing = rad_to_deg(
                    (self.desired_position.y - self.location.y)
                        .atan2(self.desired_position.x - self.location.x),
                );

                // turn at most 30 degrees per move, along the shorter arc
                let delta = (bearing - self.heading_degrees).abs().clamp(0.0, 30.0);
                let optimal = (bearing - self.heading_degrees + 540.0) % 360.0 - 180.0;
                let direction = if optimal > 0.0 {
                    1.0
                } else if optimal < 0.0 {
                    -1.0
                } else {
                    0.0
                };
                self.heading_degrees = clamp_360(self.heading_degrees + delta * direction);

                self.speed = distance(self.location, self.desired_position).clamp(-2.0, 2.0);
            }

            MovementMode::SpeedAndHeading => {
                self.set_speed_from_output(outputs[0], mode, config);
                self.heading_degrees = clamp_360(outputs[1] * 360.0);
            }

            MovementMode::EightDirection => {
                self.set_speed_from_output(outputs[0], mode, config);

                let x = vote(outputs[3], outputs[1]);
                let y = vote(outputs[2], outputs[4]);
                let chosen = match (x, y) {
                    (-1, -1) => Some(135.0),
                    (-1, 0) => Some(180.0),
                    (-1, 1) => Some(0.0),
                    (0, -1) => Some(90.0),
                    (0, 1) => Some(270.0),
                    (1, -1) => Some(225.0),
                    (1, 0) => Some(270.0),
                    (1, 1) => Some(315.0),
                    _ => None,
                };

                // a deadlocked vote or a loud "jitter" neuron goes random
                self.heading_degrees = match chosen {
                    Some(angle) if outputs[5].abs() <= 0.9 => angle,
                    _ => rng.random_range(0.0..360.0),
                };
            }
        }
    }

    /// ReachCenter permits reversing; every other mode only goes forward.
    fn set_speed_from_output(&mut self, output: f32, mode: GameMode, config: &SimulationConfig) {
        let floor = if mode == GameMode::ReachCenter { -3.0 } else { 0.0 };
        self.speed = (output * config.speed_amplifier).clamp(floor, 3.0);
    }

    /// Post-move contact handling, in priority order: lethal targets, peer
    /// overlap (revert), then food.
    fn resolve_collisions(
        &mut self,
        before: Point,
        mode: GameMode,
        config: &SimulationConfig,
        targets: &[Rect],
        peers: &[PeerSnapshot],
    ) {
        if mode.lethal_targets() {
            for target in targets {
                if target.inflate(LETHAL_INFLATE, LETHAL_INFLATE).contains(self.location) {
                    self.is_dead = true;
                    return;
                }
            }
        }

        for peer in peers {
            if peer.id != self.id && distance(peer.location, self.location) < peer.diameter {
                if config.peer_collision_enabled {
                    self.location = before;
                }
                return;
            }
        }

        if !self.food_dots.is_empty() {
            let reach = self.diameter(mode) / 2.0 + FOOD_REACH_MARGIN;
            let location = self.location;
            let before_count = self.food_dots.len();
            self.food_dots.retain(|&dot| distance(dot, location) > reach);
            if self.food_dots.len() < before_count {
                self.food_eaten += 1;
            }
        }
    }
}

/// Rounds both outputs and compares: -1 when the first is smaller, 1 when
/// larger, 0 on a tie.
fn vote(a: f32, b: f32) -> i8 {
    let a = a.round();
    let b = b.round();
    if a == b {
        0
    } else if a < b {
        -1
    } else {
        1
    }
}
