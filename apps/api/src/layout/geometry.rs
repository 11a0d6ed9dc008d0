//! Planar primitives used by the shape provider and the occupancy index.
//!
//! Canvas coordinates are pixels with the origin at the top-left corner and
//! `y` growing downwards. Rotations follow the SVG convention: a positive
//! angle turns clockwise on screen.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Point
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Rotates the point about the origin by `(sin, cos)` of some angle.
    fn rotated(self, sin: f64, cos: f64) -> Self {
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Axis-aligned rectangle
// ────────────────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle stored as min/max corners.
///
/// Intersection is strict: rectangles that only share an edge do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(
            self.min_x + dx,
            self.min_y + dy,
            self.max_x + dx,
            self.max_y + dy,
        )
    }

    /// Grows the rectangle by `amount` on every side.
    pub fn inflate(&self, amount: f64) -> Self {
        Self::new(
            self.min_x - amount,
            self.min_y - amount,
            self.max_x + amount,
            self.max_y + amount,
        )
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }

    /// True when `other` lies entirely inside `self` (edges may touch).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.min_x >= self.min_x
            && other.min_y >= self.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn union(&self, other: &Rect) -> Self {
        Self::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rotated rectangle
// ────────────────────────────────────────────────────────────────────────────

/// A rectangle after rotation about the origin; always convex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub corners: [Point; 4],
}

impl Quad {
    /// Rotates `rect` about the origin by `rotation_deg` degrees.
    pub fn from_rotated_rect(rect: &Rect, rotation_deg: f64) -> Self {
        let (sin, cos) = rotation_deg.to_radians().sin_cos();
        let corners = rect.corners().map(|c| c.rotated(sin, cos));
        Self { corners }
    }

    pub fn bounds(&self) -> Rect {
        let mut r = Rect::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for c in &self.corners {
            r.min_x = r.min_x.min(c.x);
            r.min_y = r.min_y.min(c.y);
            r.max_x = r.max_x.max(c.x);
            r.max_y = r.max_y.max(c.y);
        }
        r
    }

    /// Separating-axis test against an axis-aligned rectangle.
    ///
    /// Projections that only touch count as separated, matching `Rect::intersects`.
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        if !self.bounds().intersects(rect) {
            return false;
        }
        let rect_corners = rect.corners();
        for i in 0..2 {
            let a = self.corners[i];
            let b = self.corners[i + 1];
            let axis = Point::new(-(b.y - a.y), b.x - a.x);
            let (q_min, q_max) = project(&self.corners, axis);
            let (r_min, r_max) = project(&rect_corners, axis);
            if q_max <= r_min || r_max <= q_min {
                return false;
            }
        }
        true
    }
}

fn project(points: &[Point; 4], axis: Point) -> (f64, f64) {
    points
        .iter()
        .map(|p| p.x * axis.x + p.y * axis.y)
        .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
