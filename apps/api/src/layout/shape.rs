//! Shape Provider: turns (text, font, size, rotation) into a geometric footprint.
//!
//! The engine only talks to the [`ShapeProvider`] trait. The default
//! [`MetricShapeProvider`] builds footprints from the static tables in
//! `font_metrics`, so it is a pure function of its inputs and safe to share
//! across threads without locking.
//!
//! # Footprint model
//! Consecutive glyphs with the same vertical band are merged into one box.
//! Boxes are laid out around the word's anchor (the centre of its line box),
//! rotated about the anchor, and then:
//! - `bounds` is the union of the rotated ink boxes,
//! - `collider` is the union of the rotated boxes after dilating by padding,
//! - `mask` (mask mode) marks every cell touched by a dilated rotated box.

use thiserror::Error;

use crate::layout::font_metrics::{
    get_metrics, glyph_band, FontFamily, FontWeight, GlyphBand, LINE_ASCENT_EM,
};
use crate::layout::geometry::{Quad, Rect};
use crate::layout::options::PrecisionMode;

/// Upper bound on cells per mask; protects against absurd font sizes.
pub const MAX_MASK_CELLS: usize = 1 << 22;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("text has no drawable glyphs")]
    NoGlyphs,

    #[error("invalid font size {0}")]
    InvalidSize(f64),

    #[error("invalid rotation {0}")]
    InvalidRotation(f64),

    #[error("occupancy mask of {cells} cells exceeds the limit of {limit}")]
    MaskTooLarge { cells: usize, limit: usize },
}

// ────────────────────────────────────────────────────────────────────────────
// Measurement inputs / outputs
// ────────────────────────────────────────────────────────────────────────────

/// Everything about a measurement that is fixed for a whole layout run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureSpec {
    pub font: FontFamily,
    pub weight: FontWeight,
    pub precision: PrecisionMode,
    pub padding_px: f64,
    pub mask_cell_px: f64,
}

/// Discretized occupancy relative to the anchor cell.
///
/// Cell `(col, row)` covers `[col·c, (col+1)·c) × [row·c, (row+1)·c)` in
/// anchor-relative pixels, where `c` is the cell size.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    pub col0: i64,
    pub row0: i64,
    pub cols: usize,
    pub rows: usize,
    cells: Vec<bool>,
}

impl Mask {
    pub fn get(&self, col: usize, row: usize) -> bool {
        self.cells[row * self.cols + col]
    }
}

/// Immutable footprint of one word at one size and rotation, relative to its anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Union of the rotated ink boxes, without padding.
    pub bounds: Rect,
    /// Union of the rotated, padding-dilated boxes. Used for overlap tests.
    pub collider: Rect,
    /// Summed area of the ink boxes (rotation-invariant).
    pub ink_area: f64,
    pub mask: Option<Mask>,
}

/// The text/font rendering contract consumed by the placement engine.
///
/// Implementations must be deterministic: identical inputs always yield an
/// identical `Shape`.
pub trait ShapeProvider: Send + Sync {
    fn measure(
        &self,
        text: &str,
        spec: &MeasureSpec,
        size: f64,
        rotation_deg: f64,
    ) -> Result<Shape, ShapeError>;
}

// ────────────────────────────────────────────────────────────────────────────
// MetricShapeProvider: static-table implementation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricShapeProvider;

impl ShapeProvider for MetricShapeProvider {
    fn measure(
        &self,
        text: &str,
        spec: &MeasureSpec,
        size: f64,
        rotation_deg: f64,
    ) -> Result<Shape, ShapeError> {
        if !size.is_finite() || size <= 0.0 {
            return Err(ShapeError::InvalidSize(size));
        }
        if !rotation_deg.is_finite() {
            return Err(ShapeError::InvalidRotation(rotation_deg));
        }

        let boxes = ink_boxes(text, spec, size);
        if boxes.is_empty() {
            return Err(ShapeError::NoGlyphs);
        }

        let ink_area = boxes.iter().map(Rect::area).sum();
        let ink_quads: Vec<Quad> = boxes
            .iter()
            .map(|b| Quad::from_rotated_rect(b, rotation_deg))
            .collect();
        let padded_quads: Vec<Quad> = boxes
            .iter()
            .map(|b| Quad::from_rotated_rect(&b.inflate(spec.padding_px), rotation_deg))
            .collect();

        let bounds = union_bounds(&ink_quads);
        let collider = union_bounds(&padded_quads);
        let mask = match spec.precision {
            PrecisionMode::Bbox => None,
            PrecisionMode::Mask => Some(rasterize(&padded_quads, &collider, spec.mask_cell_px)?),
        };

        Ok(Shape {
            bounds,
            collider,
            ink_area,
            mask,
        })
    }
}

/// Lays out unrotated ink boxes centred on the anchor, merging runs of
/// glyphs that share a vertical band.
fn ink_boxes(text: &str, spec: &MeasureSpec, size: f64) -> Vec<Rect> {
    let metrics = get_metrics(&spec.font);
    let scale = size * spec.weight.width_factor();
    let total_width = metrics.measure_str(text) * scale;
    let baseline = (LINE_ASCENT_EM - 0.5) * size;

    let mut boxes: Vec<Rect> = Vec::new();
    let mut run: Option<(GlyphBand, f64, f64)> = None;
    let mut x = -total_width / 2.0;

    for c in text.chars() {
        let advance = metrics.char_width(c) * scale;
        let band = glyph_band(c);
        run = match (run, band) {
            (Some((current, start, _)), Some(b)) if current == b => Some((current, start, x + advance)),
            (prev, next) => {
                if let Some((b, start, end)) = prev {
                    boxes.push(band_box(b, start, end, baseline, size));
                }
                next.map(|b| (b, x, x + advance))
            }
        };
        x += advance;
    }
    if let Some((b, start, end)) = run {
        boxes.push(band_box(b, start, end, baseline, size));
    }
    boxes
}

fn band_box(band: GlyphBand, start: f64, end: f64, baseline: f64, size: f64) -> Rect {
    Rect::new(start, baseline - band.top * size, end, baseline - band.bottom * size)
}

fn union_bounds(quads: &[Quad]) -> Rect {
    quads
        .iter()
        .map(Quad::bounds)
        .reduce(|a, b| a.union(&b))
        .unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0))
}

fn rasterize(quads: &[Quad], extent: &Rect, cell: f64) -> Result<Mask, ShapeError> {
    let col0 = (extent.min_x / cell).floor() as i64;
    let row0 = (extent.min_y / cell).floor() as i64;
    let cols = ((extent.max_x / cell).ceil() as i64 - col0).max(1) as usize;
    let rows = ((extent.max_y / cell).ceil() as i64 - row0).max(1) as usize;
    let total = cols.saturating_mul(rows);
    if total > MAX_MASK_CELLS {
        return Err(ShapeError::MaskTooLarge {
            cells: total,
            limit: MAX_MASK_CELLS,
        });
    }

    let mut cells = vec![false; total];
    for quad in quads {
        let b = quad.bounds();
        let c_lo = ((b.min_x / cell).floor() as i64 - col0).max(0) as usize;
        let c_hi = (((b.max_x / cell).ceil() as i64 - col0).max(0) as usize).min(cols);
        let r_lo = ((b.min_y / cell).floor() as i64 - row0).max(0) as usize;
        let r_hi = (((b.max_y / cell).ceil() as i64 - row0).max(0) as usize).min(rows);
        for r in r_lo..r_hi {
            for c in c_lo..c_hi {
                let idx = r * cols + c;
                if cells[idx] {
                    continue;
                }
                let x = (col0 + c as i64) as f64 * cell;
                let y = (row0 + r as i64) as f64 * cell;
                if quad.intersects_rect(&Rect::new(x, y, x + cell, y + cell)) {
                    cells[idx] = true;
                }
            }
        }
    }

    Ok(Mask {
        col0,
        row0,
        cols,
        rows,
        cells,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
