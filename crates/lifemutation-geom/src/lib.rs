//! 2D geometry primitives shared across the lifemutation workspace.
//!
//! Angles are tracked in degrees throughout the simulation and converted to
//! radians only at trigonometry call sites.

use serde::{Deserialize, Serialize};

/// A point (or free vector) in play-area coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Midpoint of `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// An axis-aligned rectangle described by its top-left corner and extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether `point` lies inside the rectangle (edges included).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Returns a copy grown by `dx`/`dy` on every side.
    #[must_use]
    pub fn inflate(&self, dx: f32, dy: f32) -> Self {
        Self::new(
            self.x - dx,
            self.y - dy,
            self.width + 2.0 * dx,
            self.height + 2.0 * dy,
        )
    }

    /// The four edge segments: top, bottom, left, right.
    #[must_use]
    pub fn edges(&self) -> [(Point, Point); 4] {
        let top_left = Point::new(self.x, self.y);
        let top_right = Point::new(self.right(), self.y);
        let bottom_left = Point::new(self.x, self.bottom());
        let bottom_right = Point::new(self.right(), self.bottom());
        [
            (top_left, top_right),
            (bottom_left, bottom_right),
            (top_left, bottom_left),
            (top_right, bottom_right),
        ]
    }
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Converts degrees to radians.
#[must_use]
pub fn deg_to_rad(degrees: f32) -> f32 {
    std::f32::consts::PI * degrees / 180.0
}

/// Converts radians to degrees.
#[must_use]
pub fn rad_to_deg(radians: f32) -> f32 {
    radians * 180.0 / std::f32::consts::PI
}

/// Wraps an angle into [0, 360).
#[must_use]
pub fn clamp_360(mut angle: f32) -> f32 {
    if angle.is_nan() {
        return 0.0;
    }
    while angle < 0.0 {
        angle += 360.0;
    }
    while angle >= 360.0 {
        angle -= 360.0;
    }
    angle
}

/// Whether `point` lies inside (or on the boundary of) the triangle `a`/`b`/`c`.
///
/// Sign-of-determinant test, independent of the triangle's winding order.
#[must_use]
pub fn point_in_triangle(point: Point, a: Point, b: Point, c: Point) -> bool {
    let det = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);

    det * ((b.x - a.x) * (point.y - a.y) - (b.y - a.y) * (point.x - a.x)) >= 0.0
        && det * ((c.x - b.x) * (point.y - b.y) - (c.y - b.y) * (point.x - b.x)) >= 0.0
        && det * ((a.x - c.x) * (point.y - c.y) - (a.y - c.y) * (point.x - c.x)) >= 0.0
}

/// Intersection point of the segments `p0`-`p1` and `p2`-`p3`, if any.
///
/// Parallel, collinear, and non-overlapping segments all return `None`.
#[must_use]
pub fn segment_intersection(p0: Point, p1: Point, p2: Point, p3: Point) -> Option<Point> {
    let s1x = p1.x - p0.x;
    let s1y = p1.y - p0.y;
    let s2x = p3.x - p2.x;
    let s2y = p3.y - p2.y;

    let denominator = -s2x * s1y + s1x * s2y;
    if denominator == 0.0 {
        return None;
    }

    let s = (-s1y * (p0.x - p2.x) + s1x * (p0.y - p2.y)) / denominator;
    let t = (s2x * (p0.y - p2.y) - s2y * (p0.x - p2.x)) / denominator;

    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
        Some(Point::new(p0.x + t * s1x, p0.y + t * s1y))
    } else {
        None
    }
}
