//! Spiral trajectories that generate candidate offsets from the search origin.
//!
//! Both spirals start with the zero offset, so a word that fits at the origin
//! is always placed exactly there. Iteration ends once the radius passes
//! `max_radius`, which bounds the search for every word.

use crate::layout::geometry::Point;
use crate::layout::options::SpiralKind;

/// Ring step of the rectangular spiral before scaling by `growth`.
const RECT_STEP_PX: f64 = 4.0;

#[derive(Debug, Clone)]
pub struct Spiral {
    kind: SpiralKind,
    angle_step: f64,
    growth: f64,
    /// Horizontal stretch so the spiral fills the canvas aspect ratio.
    aspect: f64,
    max_radius: f64,
    step: u64,
    rect_pos: Point,
    exhausted: bool,
}

impl Spiral {
    pub fn new(
        kind: SpiralKind,
        angle_step: f64,
        growth: f64,
        aspect: f64,
        max_radius: f64,
    ) -> Self {
        Self {
            kind,
            angle_step,
            growth,
            aspect,
            max_radius,
            step: 0,
            rect_pos: Point::new(0.0, 0.0),
            exhausted: false,
        }
    }

    fn archimedean(&self, k: u64) -> (Point, f64) {
        let theta = k as f64 * self.angle_step;
        let r = self.growth * theta;
        let (sin, cos) = theta.sin_cos();
        let radius = r * self.aspect.max(1.0);
        (Point::new(self.aspect * r * cos, r * sin), radius)
    }

    /// Square rings walked edge by edge; the edge length grows every two turns.
    fn rectangular(&mut self, k: u64) -> (Point, f64) {
        if k > 0 {
            let dy = RECT_STEP_PX * self.growth;
            let dx = dy * self.aspect;
            let turn = ((1.0 + 4.0 * k as f64).sqrt() - 1.0) as u64 & 3;
            match turn {
                0 => self.rect_pos.x += dx,
                1 => self.rect_pos.y += dy,
                2 => self.rect_pos.x -= dx,
                _ => self.rect_pos.y -= dy,
            }
        }
        let p = self.rect_pos;
        (p, p.x.hypot(p.y))
    }
}

impl Iterator for Spiral {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.exhausted {
            return None;
        }
        let k = self.step;
        let (offset, radius) = match self.kind {
            SpiralKind::Archimedean => self.archimedean(k),
            SpiralKind::Rectangular => self.rectangular(k),
        };
        if radius > self.max_radius {
            self.exhausted = true;
            return None;
        }
        self.step += 1;
        Some(offset)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
