//! Simulation core: configuration, game modes, sensors, the lifeform
//! decision pipeline, and the generation-managing world.
//!
//! The world is headless. Rendering collaborators read agent positions,
//! trails, and sensor sweep debug data through the accessors on
//! [`SimulationWorld`]; nothing in this crate draws or logs.

pub mod config;
pub mod lifeform;
pub mod mode;
pub mod sensor;
pub mod world;

pub use config::{MovementMode, SimulationConfig};
pub use lifeform::LifeForm;
pub use mode::{GameMode, PLAY_AREA_CENTER};
pub use sensor::{FoodSensor, PeerSensor, PeerSnapshot, SweepDebug, WallSensor};
pub use world::{SimulationWorld, WorldError};
