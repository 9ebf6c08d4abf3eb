//! Radial triangle-sweep sensors.
//!
//! All three sensors share the same LIDAR-style sweep: the circle around the
//! agent is divided into sector triangles whose apex sits at the agent and
//! whose outer vertices lie `depth` away. Sector 0 straddles the heading
//! (the sweep starts at `heading - sector_angle / 2`) and subsequent sectors
//! proceed clockwise in screen coordinates.
//!
//! The sensor frame maps an angle to `(sin(a) * depth + x, cos(a) * depth + y)`.
//! This differs from the motion frame (cos for x, sin for y); the mapping is
//! part of the evolved behaviour and must not be "fixed".

use lifemutation_geom::{deg_to_rad, distance, point_in_triangle, segment_intersection, Point, Rect};
use serde::{Deserialize, Serialize};

/// Sweep geometry retained for rendering collaborators.
///
/// `triangles` is every sector of the last read; `hits` is the subset where
/// the sensor registered something. Purely observational.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepDebug {
    pub triangles: Vec<[Point; 3]>,
    pub hits: Vec<[Point; 3]>,
}

impl SweepDebug {
    fn reset(&mut self) {
        self.triangles.clear();
        self.hits.clear();
    }
}

/// Position and size of another live agent, as seen by sensors and the
/// collision check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeerSnapshot {
    pub id: usize,
    pub location: Point,
    pub diameter: f32,
}

/// One sector triangle of the sweep: apex at the agent, outer vertices at
/// `angle_min` and `angle_min + span` on the depth circle.
fn sector_triangle(location: Point, angle_min_deg: f32, span_deg: f32, depth: f32) -> [Point; 3] {
    let min = deg_to_rad(angle_min_deg);
    let max = deg_to_rad(angle_min_deg + span_deg);
    let p1 = Point::new(min.sin() * depth + location.x, min.cos() * depth + location.y);
    let p2 = Point::new(max.sin() * depth + location.x, max.cos() * depth + location.y);
    [location, p1, p2]
}

/// Detects food dots; winner-take-all over the sectors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodSensor {
    debug: SweepDebug,
}

impl FoodSensor {
    /// Sweeps the agent's private food dots.
    ///
    /// Per sector the strongest signal is `clamp(1 - d/depth, -1, 1)` over
    /// the dots inside the triangle. The single best sector then reads 1 and
    /// every other sector 0 (earlier sectors win ties). When no dot falls
    /// inside any sector at all, every output is -1.
    pub fn read(
        &mut self,
        heading_degrees: f32,
        location: Point,
        food: &[Point],
        sector_degrees: f32,
        depth: f32,
    ) -> Vec<f32> {
        self.debug.reset();

        let sectors = (360.0 / sector_degrees) as usize;
        let mut signals = vec![f32::NEG_INFINITY; sectors];
        let mut angle = heading_degrees - sector_degrees / 2.0;
        let mut best: Option<(usize, f32)> = None;

        for (index, signal) in signals.iter_mut().enumerate() {
            let triangle = sector_triangle(location, angle, sector_degrees, depth);
            self.debug.triangles.push(triangle);

            for &dot in food {
                if !point_in_triangle(dot, triangle[0], triangle[1], triangle[2]) {
                    continue;
                }
                let strength = (1.0 - distance(location, dot) / depth).clamp(-1.0, 1.0);
                if strength > *signal {
                    *signal = strength;
                }
            }

            if signal.is_finite() {
                self.debug.hits.push(triangle);
                // earlier sectors keep the crown on an exact tie
                if best.map_or(true, |(_, s)| *signal > s) {
                    best = Some((index, *signal));
                }
            }

            angle += sector_degrees;
        }

        match best {
            None => vec![-1.0; sectors],
            Some((winner, _)) => {
                let mut outputs = vec![0.0; sectors];
                outputs[winner] = 1.0;
                outputs
            }
        }
    }

    #[must_use]
    pub fn debug(&self) -> &SweepDebug {
        &self.debug
    }
}

/// Detects other live agents over a full-circle sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeerSensor {
    debug: SweepDebug,
}

impl PeerSensor {
    /// Sweeps `peers`, skipping the reading agent itself.
    ///
    /// Each sector defaults to 1.0 (nothing sensed) and keeps the minimum
    /// `1 - d/depth` over the peers inside its triangle, so an adjacent peer
    /// drives the value toward 1 from below while a distant one barely moves
    /// it.
    pub fn read(
        &mut self,
        heading_degrees: f32,
        location: Point,
        self_id: usize,
        peers: &[PeerSnapshot],
        sample_points: usize,
        depth: f32,
    ) -> Vec<f32> {
        self.debug.reset();

        let span = 360.0 / sample_points as f32;
        let mut outputs = vec![1.0f32; sample_points];
        let mut angle = heading_degrees - span / 2.0;

        for output in &mut outputs {
            let triangle = sector_triangle(location, angle, span, depth);
            self.debug.triangles.push(triangle);

            for peer in peers {
                if peer.id == self_id {
                    continue;
                }
                if !point_in_triangle(peer.location, triangle[0], triangle[1], triangle[2]) {
                    continue;
                }
                let strength = 1.0 - distance(location, peer.location) / depth;
                if strength < *output {
                    *output = strength;
                }
            }

            if *output != 1.0 {
                self.debug.hits.push(triangle);
            }

            angle += span;
        }

        outputs
    }

    #[must_use]
    pub fn debug(&self) -> &SweepDebug {
        &self.debug
    }
}

/// Detects target rectangles (goals, hazards, baffle walls) by intersecting
/// their edges with each sector triangle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WallSensor {
    debug: SweepDebug,
}

impl WallSensor {
    /// Sweeps `targets` over a full circle.
    ///
    /// For each rectangle edge crossing a sector, the representative contact
    /// point is the far-edge intersection when the edge crosses the
    /// triangle's outer side, otherwise the midpoint of the two flank
    /// intersections (a single flank hit stands in for both). The sector
    /// keeps the closest contact; outputs are `1 - d/depth`, so 0 means
    /// nothing within reach and values near 1 mean contact is imminent.
    pub fn read(
        &mut self,
        heading_degrees: f32,
        location: Point,
        targets: &[Rect],
        sample_points: usize,
        depth: f32,
    ) -> Vec<f32> {
        self.debug.reset();

        let span = 360.0 / sample_points as f32;
        let mut outputs = vec![0.0f32; sample_points];
        let mut angle = heading_degrees - span / 2.0;

        for output in &mut outputs {
            let [apex, p1, p2] = sector_triangle(location, angle, span, depth);
            self.debug.triangles.push([apex, p1, p2]);

            let mut raw = 1.0f32;

            for target in targets {
                for (e0, e1) in target.edges() {
                    let left = segment_intersection(apex, p1, e0, e1);
                    let right = segment_intersection(apex, p2, e0, e1);
                    let far = segment_intersection(p1, p2, e0, e1);

                    let contact = if let Some(far_hit) = far {
                        far_hit
                    } else {
                        match (left, right) {
                            (Some(a), Some(b)) => a.midpoint(b),
                            (Some(a), None) => a,
                            (None, Some(b)) => b,
                            (None, None) => continue,
                        }
                    };

                    let d = distance(location, contact).clamp(0.0, depth);
                    raw = raw.min(d / depth);
                }
            }

            if raw < 1.0 {
                self.debug.hits.push([apex, p1, p2]);
            }

            *output = 1.0 - raw;
            angle += span;
        }

        outputs
    }

    #[must_use]
    pub fn debug(&self) -> &SweepDebug {
        &self.debug
    }
}
