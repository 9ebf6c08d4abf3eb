//! Simulation configuration.

use serde::{Deserialize, Serialize};

use crate::world::WorldError;

/// How network outputs are turned into motion each move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementMode {
    /// Two outputs describe an offset to steer toward, with a turn-rate cap.
    #[default]
    DesiredPoint,
    /// Output 0 is speed, output 1 is an absolute heading.
    SpeedAndHeading,
    /// Six outputs vote on one of eight compass headings.
    EightDirection,
}

impl MovementMode {
    /// Width of the network output layer this movement mode consumes.
    #[must_use]
    pub const fn output_neurons(self) -> usize {
        match self {
            Self::DesiredPoint | Self::SpeedAndHeading => 2,
            Self::EightDirection => 6,
        }
    }
}

/// Tunable parameters for a simulation run.
///
/// Validated when handed to [`SimulationWorld::new`](crate::SimulationWorld::new)
/// or [`set_config`](crate::SimulationWorld::set_config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of lifeforms (and network slots) per generation.
    pub population_count: usize,
    /// Moves each generation runs before selection.
    pub moves_per_generation: u32,
    pub movement: MovementMode,
    /// Speed multiplier applied in `SpeedAndHeading` and `EightDirection`.
    pub speed_amplifier: f32,
    /// Hidden layer widths. A `0` entry means "same width as the input
    /// layer", resolved once the sensor suite fixes the input width.
    pub hidden_layers: Vec<usize>,
    /// When set, blob overlap reverts the mover and the peer sensor feeds
    /// the network.
    pub peer_collision_enabled: bool,
    /// Adds the interior baffle walls to the target set.
    pub add_baffles: bool,
    /// Food dots scattered at seeding in food-driven modes.
    pub food_dot_count: usize,
    /// Angular width of one food sensor sector; must divide 360 evenly.
    pub food_sensor_sector_degrees: f32,
    pub food_sensor_depth: f32,
    /// Number of peer sensor sectors over the full circle.
    pub peer_sensor_sample_points: usize,
    pub peer_sensor_depth: f32,
    /// Number of wall sensor sectors over the full circle.
    pub wall_sensor_sample_points: usize,
    /// Wall sensor depth in `ReachCenter`, whose agents navigate baffles
    /// from far away.
    pub wall_sensor_depth_reach_center: f32,
    /// Wall sensor depth everywhere else.
    pub wall_sensor_depth_default: f32,
    /// Percent chance each weight mutates during selection.
    pub selection_mutation_chance: f32,
    /// Half-width of the uniform mutation perturbation.
    pub selection_mutation_magnitude: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            population_count: 100,
            moves_per_generation: 500,
            movement: MovementMode::default(),
            speed_amplifier: 5.0,
            hidden_layers: Vec::new(),
            peer_collision_enabled: false,
            add_baffles: false,
            food_dot_count: 50,
            food_sensor_sector_degrees: 11.25,
            food_sensor_depth: 120.0,
            peer_sensor_sample_points: 8,
            peer_sensor_depth: 30.0,
            wall_sensor_sample_points: 16,
            wall_sensor_depth_reach_center: 220.0,
            wall_sensor_depth_default: 20.0,
            selection_mutation_chance: 50.0,
            selection_mutation_magnitude: 0.5,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.population_count == 0 {
            return Err(WorldError::InvalidConfig("population_count must be > 0"));
        }
        if self.population_count % 2 != 0 {
            return Err(WorldError::InvalidConfig(
                "population_count must be even for truncation selection",
            ));
        }
        if self.moves_per_generation == 0 {
            return Err(WorldError::InvalidConfig(
                "moves_per_generation must be > 0",
            ));
        }
        if !(self.food_sensor_sector_degrees > 0.0)
            || (360.0 / self.food_sensor_sector_degrees).fract() != 0.0
        {
            return Err(WorldError::InvalidConfig(
                "food_sensor_sector_degrees must divide 360 evenly",
            ));
        }
        if self.food_sensor_depth <= 0.0
            || self.peer_sensor_depth <= 0.0
            || self.wall_sensor_depth_reach_center <= 0.0
            || self.wall_sensor_depth_default <= 0.0
        {
            return Err(WorldError::InvalidConfig("sensor depths must be > 0"));
        }
        if self.peer_sensor_sample_points == 0 || self.wall_sensor_sample_points == 0 {
            return Err(WorldError::InvalidConfig(
                "sensor sample points must be > 0",
            ));
        }
        if !(0.0..=100.0).contains(&self.selection_mutation_chance) {
            return Err(WorldError::InvalidConfig(
                "selection_mutation_chance must be in 0..=100",
            ));
        }
        if self.selection_mutation_magnitude < 0.0 {
            return Err(WorldError::InvalidConfig(
                "selection_mutation_magnitude must be >= 0",
            ));
        }
        Ok(())
    }

    /// Number of food sensor sectors implied by the sector angle.
    #[must_use]
    pub fn food_sensor_sectors(&self) -> usize {
        (360.0 / self.food_sensor_sector_degrees) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn odd_population_is_rejected() {
        let config = SimulationConfig {
            population_count: 99,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn sector_angle_must_divide_the_circle() {
        let config = SimulationConfig {
            food_sensor_sector_degrees: 7.0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SimulationConfig {
            food_sensor_sector_degrees: 45.0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.food_sensor_sectors(), 8);
    }

    #[test]
    fn default_food_sectors_are_thirty_two() {
        assert_eq!(SimulationConfig::default().food_sensor_sectors(), 32);
    }

    #[test]
    fn output_neurons_per_movement_mode() {
        assert_eq!(MovementMode::DesiredPoint.output_neurons(), 2);
        assert_eq!(MovementMode::SpeedAndHeading.output_neurons(), 2);
        assert_eq!(MovementMode::EightDirection.output_neurons(), 6);
    }
}
