//! Game modes: fitness formulas, spawn rules, and target layouts.

use lifemutation_geom::{distance, Point, Rect};
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::lifeform::LifeForm;

/// Centre of the 300x300 play area.
pub const PLAY_AREA_CENTER: Point = Point::new(150.0, 150.0);

/// The challenge the population is being evolved against.
///
/// Each mode bundles its fitness formula with the board layout it implies:
/// spawn bounds, target rectangles, forbidden spawn zones, and whether food
/// exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Eat as many food dots as possible.
    DontStarve,
    /// Cross to the left third of the board, bonus for the top.
    ReachLeftSide,
    /// Cross to the right third of the board, bonus for the top.
    ReachRightSide,
    /// Stop within 50 of the centre marker.
    #[default]
    ReachCenter,
    /// Get as far from the centre as possible (the corners).
    ReachCorner,
    /// Survive while staying far from the lethal red box.
    DontTouchRed,
}

impl GameMode {
    /// Scores a lifeform. Death always scores 0, whatever the position.
    #[must_use]
    pub fn fitness(&self, lifeform: &LifeForm) -> f32 {
        if lifeform.is_dead() {
            return 0.0;
        }

        let Point { x, y } = lifeform.location();

        match self {
            Self::DontStarve => lifeform.food_eaten() as f32,

            Self::ReachLeftSide => {
                let mut fitness = if x < 180.0 { (180.0 - x) * 1000.0 } else { 0.0 };
                if x < 110.0 {
                    fitness += 1_000_000.0;
                    fitness += (290.0 - y) + 500.0;
                } else if x < 190.0 {
                    // height bonus while still mid-board
                    fitness += y * 10.0;
                }
                fitness
            }

            Self::ReachRightSide => {
                let mut fitness = (x - 120.0) * 1000.0;
                if x > 200.0 {
                    fitness += 1_000_000.0;
                }
                if x > 120.0 {
                    fitness += 290.0 - y;
                }
                fitness
            }

            Self::ReachCenter => {
                let d = distance(lifeform.location(), PLAY_AREA_CENTER);
                if d < 50.0 {
                    50.0 - d
                } else {
                    0.0
                }
            }

            Self::ReachCorner => {
                let d = distance(lifeform.location(), PLAY_AREA_CENTER);
                // anything closer than ~161 is nowhere near a corner
                if d < 161.0 {
                    0.0
                } else {
                    d
                }
            }

            Self::DontTouchRed => {
                if (120.0..=180.0).contains(&x) && (120.0..=180.0).contains(&y) {
                    0.0
                } else {
                    distance(lifeform.location(), PLAY_AREA_CENTER)
                }
            }
        }
    }

    /// Rectangle within which spawn candidates are drawn.
    #[must_use]
    pub fn spawn_bounds(&self) -> Rect {
        match self {
            Self::ReachLeftSide => Rect::new(200.0, 155.0, 90.0, 125.0),
            Self::ReachRightSide => Rect::new(10.0, 5.0, 189.0, 290.0),
            Self::ReachCenter => Rect::new(20.0, 20.0, 260.0, 260.0),
            _ => Rect::new(5.0, 5.0, 290.0, 290.0),
        }
    }

    /// Target rectangles for this mode, plus the baffle walls when enabled.
    #[must_use]
    pub fn targets(&self, add_baffles: bool) -> Vec<Rect> {
        let mut targets = Vec::new();
        match self {
            Self::ReachCenter => targets.push(Rect::new(140.0, 140.0, 20.0, 20.0)),
            Self::DontTouchRed => targets.push(Rect::new(120.0, 120.0, 60.0, 60.0)),
            _ => {}
        }
        if add_baffles {
            targets.push(Rect::new(110.0, 0.0, 20.0, 170.0));
            targets.push(Rect::new(190.0, 119.0, 20.0, 180.0));
            targets.push(Rect::new(0.0, 0.0, 5.0, 299.0));
            targets.push(Rect::new(293.0, 0.0, 5.0, 299.0));
            targets.push(Rect::new(0.0, 293.0, 299.0, 5.0));
            targets.push(Rect::new(0.0, 0.0, 299.0, 5.0));
        }
        targets
    }

    /// Whether the shared food set exists in this mode.
    #[must_use]
    pub fn uses_food(&self) -> bool {
        matches!(self, Self::DontStarve)
    }

    /// Whether touching an (inflated) target kills. `ReachCenter`'s
    /// rectangle is the goal marker, not a hazard.
    #[must_use]
    pub fn lethal_targets(&self) -> bool {
        !matches!(self, Self::ReachCenter)
    }

    /// Whether `location` is barred from spawning over and above the target
    /// rectangles.
    #[must_use]
    pub fn forbidden_spawn(&self, location: Point) -> bool {
        match self {
            Self::ReachCenter => distance(location, PLAY_AREA_CENTER) < 50.0,
            Self::DontTouchRed => {
                (120.0..=180.0).contains(&location.x) && (120.0..=180.0).contains(&location.y)
            }
            _ => false,
        }
    }

    /// Wall sensor reach for this mode.
    #[must_use]
    pub fn wall_sensor_depth(&self, config: &SimulationConfig) -> f32 {
        match self {
            Self::ReachCenter => config.wall_sensor_depth_reach_center,
            _ => config.wall_sensor_depth_default,
        }
    }
}
